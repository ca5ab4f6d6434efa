//! Session snapshot shape shared with the persistence collaborator.

use crate::model::object::{ObjectId, VttObject};
use crate::model::table::{Background, BoardProperties, PanZoomState};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Complete table state: every object plus all table-level slots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    #[serde(default)]
    pub objects: Vec<VttObject>,
    #[serde(default)]
    pub pan_zoom_state: PanZoomState,
    #[serde(default)]
    pub table_background: Background,
    #[serde(default)]
    pub selected_object_id: Option<ObjectId>,
    #[serde(default)]
    pub board_properties: BoardProperties,
}

impl SessionSnapshot {
    pub fn to_json_string(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self).map_err(SnapshotError::Json)
    }

    pub fn from_json_str(input: &str) -> Result<Self, SnapshotError> {
        serde_json::from_str(input).map_err(SnapshotError::Json)
    }

    /// Objects ordered by stacking order, ties broken by id.
    pub fn sort_objects(&mut self) {
        self.objects
            .sort_by(|a, b| a.z_index.cmp(&b.z_index).then_with(|| a.id.cmp(&b.id)));
    }
}

#[derive(Debug)]
pub enum SnapshotError {
    Json(serde_json::Error),
}

impl Display for SnapshotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "session snapshot json error: {err}"),
        }
    }
}

impl Error for SnapshotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
        }
    }
}
