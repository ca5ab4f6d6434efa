//! Local mirror of canonical table state.
//!
//! # Responsibility
//! - Hold one view-model's copy of objects, selection, background, board
//!   properties, and pan/zoom.
//! - Apply change notifications as local deltas.
//!
//! # Invariants
//! - A mirror is built only from a full snapshot (bulk load); afterwards it
//!   changes only through `apply`.
//! - Deleting or clearing the selected object clears the local selection.

use crate::event::change::ChangeEvent;
use crate::model::object::{ObjectId, VttObject};
use crate::model::snapshot::SessionSnapshot;
use crate::model::table::{Background, BoardProperties, PanZoomState};
use std::collections::HashMap;

/// Lifecycle of a view-model mirror. There is no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorPhase {
    Uninitialized,
    Populated,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableMirror {
    pub objects: HashMap<ObjectId, VttObject>,
    pub selected_object_id: Option<ObjectId>,
    pub background: Background,
    pub board_properties: BoardProperties,
    pub pan_zoom: PanZoomState,
}

impl TableMirror {
    pub fn from_snapshot(snapshot: &SessionSnapshot) -> Self {
        Self {
            objects: snapshot
                .objects
                .iter()
                .map(|object| (object.id, object.clone()))
                .collect(),
            selected_object_id: snapshot.selected_object_id,
            background: snapshot.table_background.clone(),
            board_properties: snapshot.board_properties.clone(),
            pan_zoom: snapshot.pan_zoom_state,
        }
    }

    pub fn apply(&mut self, event: &ChangeEvent) {
        match event {
            ChangeEvent::ObjectAdded(object) => {
                self.objects.insert(object.id, object.clone());
            }
            // An update for an id we never saw is treated as an add.
            ChangeEvent::ObjectUpdated { id, object } => {
                self.objects.insert(*id, object.clone());
            }
            ChangeEvent::ObjectDeleted(id) => {
                self.objects.remove(id);
                if self.selected_object_id == Some(*id) {
                    self.selected_object_id = None;
                }
            }
            ChangeEvent::AllObjectsCleared => {
                self.objects.clear();
                self.selected_object_id = None;
            }
            ChangeEvent::SelectionChanged(id) => self.selected_object_id = *id,
            ChangeEvent::BackgroundChanged(background) => self.background = background.clone(),
            ChangeEvent::BoardPropertiesChanged(properties) => {
                self.board_properties = properties.clone();
            }
            ChangeEvent::PanZoomChanged(state) => self.pan_zoom = *state,
        }
    }

    pub fn selected_object(&self) -> Option<&VttObject> {
        self.selected_object_id.and_then(|id| self.objects.get(&id))
    }

    /// Objects in draw order: ascending z-index, ties broken by id.
    pub fn objects_in_draw_order(&self) -> Vec<VttObject> {
        let mut objects: Vec<VttObject> = self.objects.values().cloned().collect();
        objects.sort_by(|a, b| a.z_index.cmp(&b.z_index).then_with(|| a.id.cmp(&b.id)));
        objects
    }

    /// Whether this mirror holds exactly the state described by `snapshot`.
    pub fn matches_snapshot(&self, snapshot: &SessionSnapshot) -> bool {
        *self == Self::from_snapshot(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::TableMirror;
    use crate::event::change::ChangeEvent;
    use crate::model::object::{Shape, VttObject};
    use uuid::Uuid;

    #[test]
    fn update_for_unknown_id_acts_as_add() {
        let mut mirror = TableMirror::default();
        let object = VttObject::with_defaults(Uuid::new_v4(), Shape::Circle, 0);

        mirror.apply(&ChangeEvent::ObjectUpdated {
            id: object.id,
            object: object.clone(),
        });

        assert_eq!(mirror.objects.get(&object.id), Some(&object));
    }

    #[test]
    fn deleting_unselected_object_keeps_selection() {
        let mut mirror = TableMirror::default();
        let kept = VttObject::with_defaults(Uuid::new_v4(), Shape::Rectangle, 0);
        let removed = VttObject::with_defaults(Uuid::new_v4(), Shape::Rectangle, 1);
        mirror.apply(&ChangeEvent::ObjectAdded(kept.clone()));
        mirror.apply(&ChangeEvent::ObjectAdded(removed.clone()));
        mirror.apply(&ChangeEvent::SelectionChanged(Some(kept.id)));

        mirror.apply(&ChangeEvent::ObjectDeleted(removed.id));

        assert_eq!(mirror.selected_object_id, Some(kept.id));
        assert_eq!(mirror.objects.len(), 1);
    }
}
