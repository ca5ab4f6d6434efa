//! UI view-model: mediator between the facade and DOM-bound components.
//!
//! # Responsibility
//! - Mirror canonical state from change notifications for widget getters.
//! - Fire display callbacks (inspector, board settings, table view,
//!   messages, modals).
//! - Route widget actions to the facade and turn failures into messages.
//!
//! # Invariants
//! - Widgets never touch the store; every write goes through the facade.
//! - The inspector callback fires with `None` whenever the selected object
//!   goes away (delete, clear, or deselect).
//! - Callbacks run after the mirror borrow is released, so they may call
//!   back into this view-model or the facade.

use crate::event::change::ChangeEvent;
use crate::event::notifier::{DispatchError, SubscriptionId};
use crate::model::object::{ObjectId, ObjectPatch, ScriptsPatch, VttObject};
use crate::model::snapshot::SessionSnapshot;
use crate::model::table::{Background, BoardProperties, BoardSettingsForm, PanZoomState};
use crate::service::table_service::{ServiceError, TableService};
use crate::store::object_store::{MemoryObjectStore, ObjectStore};
use crate::viewmodel::mirror::{MirrorPhase, TableMirror};
use log::{debug, info};
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;

const COLLABORATOR_NAME: &str = "ui_view_model";

/// Severity of a toast-style message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiMessage {
    pub level: MessageLevel,
    pub text: String,
}

/// Modal dialogs the UI layer is asked to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalRequest {
    ConfirmClearAll,
    EditObjectData { object_id: ObjectId, json: String },
    EditOnClickScript { object_id: ObjectId, script: String },
}

type InspectorCallback = Rc<dyn Fn(Option<&VttObject>)>;
type BoardSettingsCallback = Rc<dyn Fn(&BoardProperties)>;
type TableViewCallback = Rc<dyn Fn(&Background, &PanZoomState)>;
type MessageCallback = Rc<dyn Fn(&UiMessage)>;
type ModalCallback = Rc<dyn Fn(&ModalRequest)>;

#[derive(Default)]
struct UiCallbacks {
    inspector: Vec<InspectorCallback>,
    board_settings: Vec<BoardSettingsCallback>,
    table_view: Vec<TableViewCallback>,
    message: Vec<MessageCallback>,
    modal: Vec<ModalCallback>,
}

#[derive(Default)]
struct UiInner {
    mirror: RefCell<Option<TableMirror>>,
    callbacks: RefCell<UiCallbacks>,
}

impl UiInner {
    fn apply(&self, event: &ChangeEvent) -> Result<(), DispatchError> {
        let (inspector, board, table_view) = {
            let mut guard = self.mirror.borrow_mut();
            let mirror = guard
                .as_mut()
                .ok_or(DispatchError::MissingCollaborator(COLLABORATOR_NAME))?;
            let selected_before = mirror.selected_object_id;
            mirror.apply(event);
            let selected_after = mirror.selected_object_id;

            let touches_selection = match event {
                ChangeEvent::ObjectAdded(object) => Some(object.id) == selected_after,
                ChangeEvent::ObjectUpdated { id, .. } => Some(*id) == selected_after,
                ChangeEvent::ObjectDeleted(id) => Some(*id) == selected_before,
                ChangeEvent::SelectionChanged(_) | ChangeEvent::AllObjectsCleared => true,
                _ => false,
            };
            let inspector = (touches_selection || selected_before != selected_after)
                .then(|| mirror.selected_object().cloned());
            let board = match event {
                ChangeEvent::BoardPropertiesChanged(properties) => Some(properties.clone()),
                _ => None,
            };
            let table_view = match event {
                ChangeEvent::BackgroundChanged(_) | ChangeEvent::PanZoomChanged(_) => {
                    Some((mirror.background.clone(), mirror.pan_zoom))
                }
                _ => None,
            };
            (inspector, board, table_view)
        };

        if let Some(selected) = inspector {
            self.fire_inspector(selected.as_ref());
        }
        if let Some(properties) = board {
            self.fire_board_settings(&properties);
        }
        if let Some((background, pan_zoom)) = table_view {
            self.fire_table_view(&background, &pan_zoom);
        }
        Ok(())
    }

    fn fire_inspector(&self, selected: Option<&VttObject>) {
        let callbacks = self.callbacks.borrow().inspector.clone();
        for callback in callbacks {
            callback(selected);
        }
    }

    fn fire_board_settings(&self, properties: &BoardProperties) {
        let callbacks = self.callbacks.borrow().board_settings.clone();
        for callback in callbacks {
            callback(properties);
        }
    }

    fn fire_table_view(&self, background: &Background, pan_zoom: &PanZoomState) {
        let callbacks = self.callbacks.borrow().table_view.clone();
        for callback in callbacks {
            callback(background, pan_zoom);
        }
    }

    fn fire_message(&self, message: &UiMessage) {
        let callbacks = self.callbacks.borrow().message.clone();
        for callback in callbacks {
            callback(message);
        }
    }

    fn fire_modal(&self, request: &ModalRequest) {
        let callbacks = self.callbacks.borrow().modal.clone();
        for callback in callbacks {
            callback(request);
        }
    }
}

/// View-model backing toolbars, the inspector, and board settings.
pub struct UiViewModel<S: ObjectStore = MemoryObjectStore> {
    facade: Rc<TableService<S>>,
    inner: Rc<UiInner>,
    subscription: SubscriptionId,
}

impl<S: ObjectStore> UiViewModel<S> {
    /// Subscribes to the facade's notifier; the mirror stays uninitialized
    /// until `load_state`.
    pub fn new(facade: Rc<TableService<S>>) -> Self {
        let inner = Rc::new(UiInner::default());
        let weak = Rc::downgrade(&inner);
        let subscription = facade.notifier().subscribe_all(move |event| {
            weak.upgrade()
                .ok_or(DispatchError::MissingCollaborator(COLLABORATOR_NAME))?
                .apply(event)
        });
        Self {
            facade,
            inner,
            subscription,
        }
    }

    /// Bulk-loads the mirror and refreshes every display.
    pub fn load_state(&self, snapshot: &SessionSnapshot) {
        let mirror = TableMirror::from_snapshot(snapshot);
        let selected = mirror.selected_object().cloned();
        let board = mirror.board_properties.clone();
        let background = mirror.background.clone();
        let pan_zoom = mirror.pan_zoom;
        *self.inner.mirror.borrow_mut() = Some(mirror);
        debug!(
            "event=mirror_load module=ui_vm status=ok objects={}",
            snapshot.objects.len()
        );
        self.inner.fire_inspector(selected.as_ref());
        self.inner.fire_board_settings(&board);
        self.inner.fire_table_view(&background, &pan_zoom);
    }

    pub fn phase(&self) -> MirrorPhase {
        if self.inner.mirror.borrow().is_some() {
            MirrorPhase::Populated
        } else {
            MirrorPhase::Uninitialized
        }
    }

    pub fn on_inspector_data_changed(&self, callback: impl Fn(Option<&VttObject>) + 'static) {
        self.inner
            .callbacks
            .borrow_mut()
            .inspector
            .push(Rc::new(callback));
    }

    pub fn on_board_settings_changed(&self, callback: impl Fn(&BoardProperties) + 'static) {
        self.inner
            .callbacks
            .borrow_mut()
            .board_settings
            .push(Rc::new(callback));
    }

    /// Background or pan/zoom display; fires on either change.
    pub fn on_table_view_changed(&self, callback: impl Fn(&Background, &PanZoomState) + 'static) {
        self.inner
            .callbacks
            .borrow_mut()
            .table_view
            .push(Rc::new(callback));
    }

    pub fn on_message(&self, callback: impl Fn(&UiMessage) + 'static) {
        self.inner
            .callbacks
            .borrow_mut()
            .message
            .push(Rc::new(callback));
    }

    pub fn on_modal_request(&self, callback: impl Fn(&ModalRequest) + 'static) {
        self.inner
            .callbacks
            .borrow_mut()
            .modal
            .push(Rc::new(callback));
    }

    pub fn show_message(&self, level: MessageLevel, text: impl Into<String>) {
        self.inner.fire_message(&UiMessage {
            level,
            text: text.into(),
        });
    }

    pub fn objects(&self) -> Vec<VttObject> {
        self.read(Vec::new(), TableMirror::objects_in_draw_order)
    }

    pub fn selected_object_id(&self) -> Option<ObjectId> {
        self.read(None, |mirror| mirror.selected_object_id)
    }

    /// Data currently shown by the inspector.
    pub fn selected_object(&self) -> Option<VttObject> {
        self.read(None, |mirror| mirror.selected_object().cloned())
    }

    pub fn background(&self) -> Background {
        self.read(Background::default(), |mirror| mirror.background.clone())
    }

    pub fn board_properties(&self) -> BoardProperties {
        self.read(BoardProperties::default(), |mirror| {
            mirror.board_properties.clone()
        })
    }

    pub fn pan_zoom(&self) -> PanZoomState {
        self.read(PanZoomState::default(), |mirror| mirror.pan_zoom)
    }

    pub fn mirror(&self) -> Option<TableMirror> {
        self.inner.mirror.borrow().clone()
    }

    /// Selects `id` (or clears with `None`); unknown ids become a warning.
    pub fn select_object(&self, id: Option<ObjectId>) -> bool {
        match self.facade.set_selected_object_id(id) {
            Ok(()) => true,
            Err(err) => {
                self.show_message(MessageLevel::Warning, err.to_string());
                false
            }
        }
    }

    /// Applies inspector field edits to the selected object.
    pub fn apply_inspector_edits(&self, patch: &ObjectPatch) -> Option<VttObject> {
        let id = self.require_selection()?;
        match self.facade.update_object(id, patch) {
            Ok(object) => Some(object),
            Err(err) => {
                self.show_message(MessageLevel::Error, err.to_string());
                None
            }
        }
    }

    /// Parses the inspector's JSON data editor text and merges it into the
    /// selected object's `data`. Invalid text changes nothing.
    pub fn apply_data_json(&self, text: &str) -> Option<VttObject> {
        let value: Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(err) => {
                self.show_message(MessageLevel::Error, format!("Invalid JSON data: {err}"));
                return None;
            }
        };
        self.apply_inspector_edits(&ObjectPatch::new().data(value))
    }

    pub fn apply_on_click_script(&self, script: &str) -> Option<VttObject> {
        let patch = ObjectPatch {
            scripts: Some(ScriptsPatch {
                on_click: Some(script.to_string()),
            }),
            ..ObjectPatch::default()
        };
        self.apply_inspector_edits(&patch)
    }

    /// Validates raw board-settings text and stores the result.
    pub fn apply_board_settings(&self, form: &BoardSettingsForm) -> Option<BoardProperties> {
        let stored = form
            .parse()
            .map_err(ServiceError::from)
            .and_then(|properties| self.facade.set_board_properties(properties));
        match stored {
            Ok(properties) => {
                self.show_message(MessageLevel::Success, "Board settings updated");
                Some(properties)
            }
            Err(err) => {
                self.show_message(MessageLevel::Error, err.to_string());
                None
            }
        }
    }

    pub fn set_background_color(&self, color: &str) -> bool {
        self.set_background(Background::Color(color.trim().to_string()))
    }

    pub fn set_background_image(&self, url: &str) -> bool {
        self.set_background(Background::Image(url.trim().to_string()))
    }

    pub fn delete_selected(&self) -> bool {
        match self.require_selection() {
            Some(id) => self.facade.delete_object(id),
            None => false,
        }
    }

    /// Asks the UI layer to confirm before clearing the table.
    pub fn request_clear_all(&self) {
        self.inner.fire_modal(&ModalRequest::ConfirmClearAll);
    }

    pub fn confirm_clear_all(&self) {
        self.facade.clear_all_objects();
        info!("event=table_clear module=ui_vm status=ok");
        self.show_message(MessageLevel::Info, "All objects cleared");
    }

    pub fn open_data_editor(&self) -> bool {
        let Some(object) = self.selected_object_or_warn() else {
            return false;
        };
        let json = serde_json::to_string_pretty(&Value::Object(object.data))
            .unwrap_or_else(|_| "{}".to_string());
        self.inner.fire_modal(&ModalRequest::EditObjectData {
            object_id: object.id,
            json,
        });
        true
    }

    pub fn open_script_editor(&self) -> bool {
        let Some(object) = self.selected_object_or_warn() else {
            return false;
        };
        self.inner.fire_modal(&ModalRequest::EditOnClickScript {
            object_id: object.id,
            script: object.scripts.on_click,
        });
        true
    }

    fn set_background(&self, background: Background) -> bool {
        match self.facade.set_table_background(background) {
            Ok(()) => true,
            Err(err) => {
                self.show_message(MessageLevel::Error, err.to_string());
                false
            }
        }
    }

    fn require_selection(&self) -> Option<ObjectId> {
        let selected = self.selected_object_id();
        if selected.is_none() {
            self.show_message(MessageLevel::Warning, "No object selected");
        }
        selected
    }

    fn selected_object_or_warn(&self) -> Option<VttObject> {
        let selected = self.selected_object();
        if selected.is_none() {
            self.show_message(MessageLevel::Warning, "No object selected");
        }
        selected
    }

    fn read<T>(&self, default: T, f: impl FnOnce(&TableMirror) -> T) -> T {
        self.inner.mirror.borrow().as_ref().map_or(default, f)
    }
}

impl<S: ObjectStore> Drop for UiViewModel<S> {
    fn drop(&mut self) {
        self.facade.notifier().unsubscribe(self.subscription);
    }
}
