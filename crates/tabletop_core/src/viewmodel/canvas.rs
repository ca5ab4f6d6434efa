//! Canvas view-model: the renderer's only source of table state.
//!
//! # Responsibility
//! - Mirror canonical state purely from change notifications.
//! - Request one redraw per applied notification.
//!
//! # Invariants
//! - Never holds a facade or store handle; the renderer cannot query
//!   canonical state directly.
//! - Notifications arriving before `load_state` are reported as
//!   `MissingCollaborator` and missed.

use crate::event::change::ChangeEvent;
use crate::event::notifier::{ChangeNotifier, DispatchError, SubscriptionId};
use crate::model::object::{ObjectId, VttObject};
use crate::model::snapshot::SessionSnapshot;
use crate::model::table::{Background, BoardProperties, PanZoomState};
use crate::viewmodel::mirror::{MirrorPhase, TableMirror};
use log::debug;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

const COLLABORATOR_NAME: &str = "canvas_view_model";

type RedrawCallback = Rc<dyn Fn()>;

#[derive(Default)]
struct CanvasInner {
    mirror: RefCell<Option<TableMirror>>,
    redraw_requests: Cell<u64>,
    redraw_callback: RefCell<Option<RedrawCallback>>,
}

impl CanvasInner {
    fn apply(&self, event: &ChangeEvent) -> Result<(), DispatchError> {
        {
            let mut guard = self.mirror.borrow_mut();
            let mirror = guard
                .as_mut()
                .ok_or(DispatchError::MissingCollaborator(COLLABORATOR_NAME))?;
            mirror.apply(event);
        }
        self.request_redraw();
        Ok(())
    }

    fn request_redraw(&self) {
        self.redraw_requests.set(self.redraw_requests.get() + 1);
        let callback = self.redraw_callback.borrow().clone();
        if let Some(callback) = callback {
            callback();
        }
    }

    fn read<T>(&self, default: T, f: impl FnOnce(&TableMirror) -> T) -> T {
        self.mirror.borrow().as_ref().map_or(default, f)
    }
}

/// Notification-driven mirror consumed by the canvas renderer.
pub struct CanvasViewModel {
    inner: Rc<CanvasInner>,
    notifier: Rc<ChangeNotifier>,
    subscription: SubscriptionId,
}

impl CanvasViewModel {
    /// Subscribes to every notification kind; the mirror stays
    /// uninitialized until `load_state`.
    pub fn new(notifier: Rc<ChangeNotifier>) -> Self {
        let inner = Rc::new(CanvasInner::default());
        let weak = Rc::downgrade(&inner);
        let subscription = notifier.subscribe_all(move |event| {
            weak.upgrade()
                .ok_or(DispatchError::MissingCollaborator(COLLABORATOR_NAME))?
                .apply(event)
        });
        Self {
            inner,
            notifier,
            subscription,
        }
    }

    /// Bulk-loads the mirror from a full snapshot and requests a redraw.
    pub fn load_state(&self, snapshot: &SessionSnapshot) {
        *self.inner.mirror.borrow_mut() = Some(TableMirror::from_snapshot(snapshot));
        debug!(
            "event=mirror_load module=canvas_vm status=ok objects={}",
            snapshot.objects.len()
        );
        self.inner.request_redraw();
    }

    pub fn phase(&self) -> MirrorPhase {
        if self.inner.mirror.borrow().is_some() {
            MirrorPhase::Populated
        } else {
            MirrorPhase::Uninitialized
        }
    }

    /// Installs the renderer hook invoked on every redraw request.
    pub fn set_redraw_callback(&self, callback: impl Fn() + 'static) {
        *self.inner.redraw_callback.borrow_mut() = Some(Rc::new(callback));
    }

    /// Total redraw requests issued so far.
    pub fn redraw_requests(&self) -> u64 {
        self.inner.redraw_requests.get()
    }

    /// Objects in draw order.
    pub fn render_list(&self) -> Vec<VttObject> {
        self.inner.read(Vec::new(), TableMirror::objects_in_draw_order)
    }

    pub fn object(&self, id: ObjectId) -> Option<VttObject> {
        self.inner.read(None, |mirror| mirror.objects.get(&id).cloned())
    }

    pub fn selected_object_id(&self) -> Option<ObjectId> {
        self.inner.read(None, |mirror| mirror.selected_object_id)
    }

    pub fn background(&self) -> Background {
        self.inner.read(Background::default(), |mirror| mirror.background.clone())
    }

    pub fn board_properties(&self) -> BoardProperties {
        self.inner.read(BoardProperties::default(), |mirror| {
            mirror.board_properties.clone()
        })
    }

    pub fn pan_zoom(&self) -> PanZoomState {
        self.inner.read(PanZoomState::default(), |mirror| mirror.pan_zoom)
    }

    /// Copy of the whole mirror, `None` while uninitialized.
    pub fn mirror(&self) -> Option<TableMirror> {
        self.inner.mirror.borrow().clone()
    }
}

impl Drop for CanvasViewModel {
    fn drop(&mut self) {
        self.notifier.unsubscribe(self.subscription);
    }
}
