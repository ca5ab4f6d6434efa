//! Change notification kinds and payloads.

use crate::model::object::{ObjectId, VttObject};
use crate::model::table::{Background, BoardProperties, PanZoomState};

/// Notification kind used as subscription key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChangeKind {
    ObjectAdded,
    ObjectUpdated,
    ObjectDeleted,
    AllObjectsCleared,
    SelectionChanged,
    BackgroundChanged,
    BoardPropertiesChanged,
    PanZoomChanged,
}

impl ChangeKind {
    pub const ALL: [ChangeKind; 8] = [
        Self::ObjectAdded,
        Self::ObjectUpdated,
        Self::ObjectDeleted,
        Self::AllObjectsCleared,
        Self::SelectionChanged,
        Self::BackgroundChanged,
        Self::BoardPropertiesChanged,
        Self::PanZoomChanged,
    ];

    /// Stable string id used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ObjectAdded => "object_added",
            Self::ObjectUpdated => "object_updated",
            Self::ObjectDeleted => "object_deleted",
            Self::AllObjectsCleared => "all_objects_cleared",
            Self::SelectionChanged => "selection_changed",
            Self::BackgroundChanged => "background_changed",
            Self::BoardPropertiesChanged => "board_properties_changed",
            Self::PanZoomChanged => "pan_zoom_changed",
        }
    }
}

/// One state change, carrying the post-mutation value.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
    ObjectAdded(VttObject),
    ObjectUpdated { id: ObjectId, object: VttObject },
    ObjectDeleted(ObjectId),
    AllObjectsCleared,
    SelectionChanged(Option<ObjectId>),
    BackgroundChanged(Background),
    BoardPropertiesChanged(BoardProperties),
    PanZoomChanged(PanZoomState),
}

impl ChangeEvent {
    pub fn kind(&self) -> ChangeKind {
        match self {
            Self::ObjectAdded(_) => ChangeKind::ObjectAdded,
            Self::ObjectUpdated { .. } => ChangeKind::ObjectUpdated,
            Self::ObjectDeleted(_) => ChangeKind::ObjectDeleted,
            Self::AllObjectsCleared => ChangeKind::AllObjectsCleared,
            Self::SelectionChanged(_) => ChangeKind::SelectionChanged,
            Self::BackgroundChanged(_) => ChangeKind::BackgroundChanged,
            Self::BoardPropertiesChanged(_) => ChangeKind::BoardPropertiesChanged,
            Self::PanZoomChanged(_) => ChangeKind::PanZoomChanged,
        }
    }
}
