//! Core object model and view-model synchronization for the tabletop.
//! This crate is the single source of truth for table state invariants.

pub mod config;
pub mod event;
pub mod logging;
pub mod model;
pub mod runtime;
pub mod service;
pub mod store;
pub mod viewmodel;

pub use config::{ConfigError, RuntimeConfig};
pub use event::change::{ChangeEvent, ChangeKind};
pub use event::notifier::{ChangeNotifier, DispatchError, DispatchReport, SubscriptionId};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::object::{
    parse_shape, Appearance, AppearancePatch, ObjectId, ObjectPatch, ObjectValidationError,
    Scripts, ScriptsPatch, Shape, VttObject,
};
pub use model::snapshot::{SessionSnapshot, SnapshotError};
pub use model::table::{
    parse_length_unit, Background, BoardProperties, BoardSettingsForm, LengthUnit, PanZoomState,
    TableValidationError,
};
pub use runtime::TableRuntime;
pub use service::table_service::{ServiceError, ServiceResult, TableService, TableState};
pub use store::object_store::{MemoryObjectStore, ObjectStore, StoreError, StoreResult};
pub use viewmodel::canvas::CanvasViewModel;
pub use viewmodel::mirror::{MirrorPhase, TableMirror};
pub use viewmodel::ui::{MessageLevel, ModalRequest, UiMessage, UiViewModel};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
