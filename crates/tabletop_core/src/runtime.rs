//! Explicit two-phase table runtime bootstrap.
//!
//! # Responsibility
//! - Phase 1 (`new`): construct notifier, facade, and both view-models.
//! - Phase 2 (`start`): bulk-load a facade snapshot into both mirrors.
//!
//! # Invariants
//! - Mirrors are never populated from an empty placeholder while the
//!   canonical store holds objects: `start` reads the facade itself.
//! - After `start`, every mirror change comes from a notification.

use crate::config::{ConfigError, RuntimeConfig};
use crate::event::notifier::ChangeNotifier;
use crate::model::snapshot::SessionSnapshot;
use crate::service::table_service::{ServiceResult, TableService};
use crate::store::object_store::MemoryObjectStore;
use crate::viewmodel::canvas::CanvasViewModel;
use crate::viewmodel::mirror::MirrorPhase;
use crate::viewmodel::ui::UiViewModel;
use log::info;
use std::rc::Rc;

/// Owned handles for one table session.
pub struct TableRuntime {
    notifier: Rc<ChangeNotifier>,
    service: Rc<TableService<MemoryObjectStore>>,
    ui: UiViewModel<MemoryObjectStore>,
    canvas: CanvasViewModel,
}

impl TableRuntime {
    /// Phase 1: wires components; mirrors stay uninitialized.
    pub fn new(config: &RuntimeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let notifier = Rc::new(ChangeNotifier::new());
        let service = Rc::new(TableService::with_table_state(
            MemoryObjectStore::new(),
            Rc::clone(&notifier),
            config.initial_table_state()?,
        ));
        let ui = UiViewModel::new(Rc::clone(&service));
        let canvas = CanvasViewModel::new(Rc::clone(&notifier));
        Ok(Self {
            notifier,
            service,
            ui,
            canvas,
        })
    }

    /// Phase 2: one-time bulk load of both mirrors from the facade.
    pub fn start(&self) {
        let snapshot = self.service.snapshot();
        self.ui.load_state(&snapshot);
        self.canvas.load_state(&snapshot);
        info!(
            "event=runtime_start module=runtime status=ok objects={}",
            snapshot.objects.len()
        );
    }

    pub fn is_started(&self) -> bool {
        self.ui.phase() == MirrorPhase::Populated
            && self.canvas.phase() == MirrorPhase::Populated
    }

    pub fn notifier(&self) -> &Rc<ChangeNotifier> {
        &self.notifier
    }

    pub fn service(&self) -> &Rc<TableService<MemoryObjectStore>> {
        &self.service
    }

    pub fn ui(&self) -> &UiViewModel<MemoryObjectStore> {
        &self.ui
    }

    pub fn canvas(&self) -> &CanvasViewModel {
        &self.canvas
    }

    /// Replaces the table with a saved session; mirrors follow through
    /// notifications.
    pub fn load_session(&self, snapshot: SessionSnapshot) -> ServiceResult<usize> {
        self.service.load_session(snapshot)
    }

    pub fn export_session(&self) -> SessionSnapshot {
        self.service.snapshot()
    }
}
