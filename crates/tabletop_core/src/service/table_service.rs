//! Table facade: the single mutation entry point.
//!
//! # Responsibility
//! - Wrap every object-store and table-level write with exactly one change
//!   notification of the matching kind.
//! - Own table-level state (background, board, pan/zoom, selection).
//! - Provide full snapshot export and session import.
//!
//! # Invariants
//! - Mutate first, publish second; failed calls publish nothing.
//! - No store or table borrow is held while publishing, so subscribers may
//!   call back into the facade from their handlers.
//! - Removing the selected object (directly or via clear) also clears the
//!   selection slot, matching what mirrors do on the same notification.

use crate::event::change::ChangeEvent;
use crate::event::notifier::ChangeNotifier;
use crate::model::object::{ObjectId, ObjectPatch, Shape, VttObject};
use crate::model::snapshot::SessionSnapshot;
use crate::model::table::{Background, BoardProperties, PanZoomState, TableValidationError};
use crate::store::object_store::{MemoryObjectStore, ObjectStore, StoreError};
use log::{debug, info, warn};
use std::cell::RefCell;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors surfaced by facade operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    Store(StoreError),
    Table(TableValidationError),
    /// Selection target is not a live object.
    SelectionNotFound(ObjectId),
}

impl ServiceError {
    /// Whether this is the logical not-found case callers usually surface as
    /// a soft UI message.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Store(StoreError::NotFound(_)) | Self::SelectionNotFound(_)
        )
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Table(err) => write!(f, "{err}"),
            Self::SelectionNotFound(id) => write!(f, "cannot select missing object: {id}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Table(err) => Some(err),
            Self::SelectionNotFound(_) => None,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<TableValidationError> for ServiceError {
    fn from(value: TableValidationError) -> Self {
        Self::Table(value)
    }
}

/// Table-level slots not stored per object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableState {
    pub background: Background,
    pub board_properties: BoardProperties,
    pub pan_zoom: PanZoomState,
    pub selected_object_id: Option<ObjectId>,
}

/// Mutation facade over one object store and the table-level state.
pub struct TableService<S: ObjectStore = MemoryObjectStore> {
    store: RefCell<S>,
    table: RefCell<TableState>,
    notifier: Rc<ChangeNotifier>,
}

impl TableService<MemoryObjectStore> {
    pub fn in_memory(notifier: Rc<ChangeNotifier>) -> Self {
        Self::new(MemoryObjectStore::new(), notifier)
    }
}

impl<S: ObjectStore> TableService<S> {
    pub fn new(store: S, notifier: Rc<ChangeNotifier>) -> Self {
        Self::with_table_state(store, notifier, TableState::default())
    }

    /// Starts from explicit table-level defaults (see `RuntimeConfig`).
    pub fn with_table_state(store: S, notifier: Rc<ChangeNotifier>, table: TableState) -> Self {
        Self {
            store: RefCell::new(store),
            table: RefCell::new(table),
            notifier,
        }
    }

    pub fn notifier(&self) -> &Rc<ChangeNotifier> {
        &self.notifier
    }

    pub fn create_object(&self, shape: Shape, patch: &ObjectPatch) -> ServiceResult<VttObject> {
        let object = self.store.borrow_mut().create(shape, patch)?;
        self.notifier.publish(ChangeEvent::ObjectAdded(object.clone()));
        Ok(object)
    }

    pub fn update_object(&self, id: ObjectId, patch: &ObjectPatch) -> ServiceResult<VttObject> {
        let object = self.store.borrow_mut().update(id, patch)?;
        self.notifier.publish(ChangeEvent::ObjectUpdated {
            id,
            object: object.clone(),
        });
        Ok(object)
    }

    /// Returns `false` without publishing when `id` is unknown.
    pub fn delete_object(&self, id: ObjectId) -> bool {
        if !self.store.borrow_mut().remove(id) {
            debug!("event=object_delete module=facade status=not_found id={id}");
            return false;
        }
        self.evict_selection(Some(id));
        self.notifier.publish(ChangeEvent::ObjectDeleted(id));
        true
    }

    pub fn get_object(&self, id: ObjectId) -> Option<VttObject> {
        self.store.borrow().get(id)
    }

    pub fn get_all_objects(&self) -> Vec<VttObject> {
        self.store.borrow().list()
    }

    pub fn object_count(&self) -> usize {
        self.store.borrow().len()
    }

    /// Empties the store and publishes a single `AllObjectsCleared`.
    pub fn clear_all_objects(&self) {
        self.store.borrow_mut().clear();
        self.evict_selection(None);
        info!("event=objects_clear module=facade status=ok");
        self.notifier.publish(ChangeEvent::AllObjectsCleared);
    }

    pub fn set_table_background(&self, background: Background) -> ServiceResult<()> {
        background.validate()?;
        self.table.borrow_mut().background = background.clone();
        self.notifier.publish(ChangeEvent::BackgroundChanged(background));
        Ok(())
    }

    pub fn get_table_background(&self) -> Background {
        self.table.borrow().background.clone()
    }

    /// Stores `properties` with freshly derived pixel size and returns them.
    pub fn set_board_properties(
        &self,
        properties: BoardProperties,
    ) -> ServiceResult<BoardProperties> {
        let properties = properties.normalized()?;
        self.table.borrow_mut().board_properties = properties.clone();
        self.notifier
            .publish(ChangeEvent::BoardPropertiesChanged(properties.clone()));
        Ok(properties)
    }

    pub fn get_board_properties(&self) -> BoardProperties {
        self.table.borrow().board_properties.clone()
    }

    pub fn set_pan_zoom_state(&self, state: PanZoomState) -> ServiceResult<()> {
        state.validate()?;
        self.table.borrow_mut().pan_zoom = state;
        self.notifier.publish(ChangeEvent::PanZoomChanged(state));
        Ok(())
    }

    pub fn get_pan_zoom_state(&self) -> PanZoomState {
        self.table.borrow().pan_zoom
    }

    /// Selects one live object, or clears selection with `None`.
    pub fn set_selected_object_id(&self, id: Option<ObjectId>) -> ServiceResult<()> {
        if let Some(target) = id {
            if self.store.borrow().get(target).is_none() {
                return Err(ServiceError::SelectionNotFound(target));
            }
        }
        self.table.borrow_mut().selected_object_id = id;
        self.notifier.publish(ChangeEvent::SelectionChanged(id));
        Ok(())
    }

    pub fn get_selected_object_id(&self) -> Option<ObjectId> {
        self.table.borrow().selected_object_id
    }

    /// Full export: every object plus all table-level slots.
    pub fn snapshot(&self) -> SessionSnapshot {
        let table = self.table.borrow().clone();
        let mut snapshot = SessionSnapshot {
            objects: self.get_all_objects(),
            pan_zoom_state: table.pan_zoom,
            table_background: table.background,
            selected_object_id: table.selected_object_id,
            board_properties: table.board_properties,
        };
        snapshot.sort_objects();
        snapshot
    }

    /// Replaces the whole table with `snapshot`.
    ///
    /// Everything is validated up front; on error nothing changes and nothing
    /// is published. On success subscribers see one `AllObjectsCleared`, one
    /// `ObjectAdded` per object, then one notification per table slot.
    /// Returns the number of imported objects.
    pub fn load_session(&self, snapshot: SessionSnapshot) -> ServiceResult<usize> {
        let mut seen = HashSet::new();
        for object in &snapshot.objects {
            object.validate().map_err(StoreError::from)?;
            if !seen.insert(object.id) {
                return Err(StoreError::DuplicateId(object.id).into());
            }
        }
        snapshot.table_background.validate()?;
        let board_properties = snapshot.board_properties.normalized()?;
        snapshot.pan_zoom_state.validate()?;
        let selected = match snapshot.selected_object_id {
            Some(id) if !seen.contains(&id) => {
                warn!("event=session_load module=facade status=degraded reason=selection_missing");
                None
            }
            other => other,
        };

        self.clear_all_objects();
        let count = snapshot.objects.len();
        for object in snapshot.objects {
            let object = self.store.borrow_mut().import(object)?;
            self.notifier.publish(ChangeEvent::ObjectAdded(object));
        }
        self.set_table_background(snapshot.table_background)?;
        self.set_board_properties(board_properties)?;
        self.set_pan_zoom_state(snapshot.pan_zoom_state)?;
        self.set_selected_object_id(selected)?;

        info!("event=session_load module=facade status=ok objects={count}");
        Ok(count)
    }

    /// Clears selection when it points at `removed` (or at anything, for
    /// `None`).
    fn evict_selection(&self, removed: Option<ObjectId>) {
        let mut table = self.table.borrow_mut();
        let evict = match (removed, table.selected_object_id) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(removed), Some(selected)) => removed == selected,
        };
        if evict {
            table.selected_object_id = None;
        }
    }
}
