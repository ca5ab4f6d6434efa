//! Object store contract and in-memory implementation.
//!
//! # Responsibility
//! - Own the canonical `ObjectId -> VttObject` mapping.
//! - Apply defaults, validation, and field-level merge on every write.
//!
//! # Invariants
//! - Write paths validate the whole patch before touching a record, so a
//!   failed call leaves the store exactly as it was.
//! - Ids handed out by `create` are never handed out again, including after
//!   the object is removed or the store is cleared.
//! - Every read returns an owned copy.

use crate::model::object::{
    placeholder_name, ObjectId, ObjectPatch, ObjectValidationError, Shape, VttObject,
};
use log::debug;
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level failures. None of them leave partial state behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    NotFound(ObjectId),
    Validation(ObjectValidationError),
    DuplicateId(ObjectId),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "object not found: {id}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::DuplicateId(id) => write!(f, "object id already present: {id}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) | Self::DuplicateId(_) => None,
        }
    }
}

impl From<ObjectValidationError> for StoreError {
    fn from(value: ObjectValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Canonical object storage contract.
pub trait ObjectStore {
    /// Creates a complete record for `shape` with `patch` merged over the
    /// shape defaults. Generated id and `shape` win over the patch.
    fn create(&mut self, shape: Shape, patch: &ObjectPatch) -> StoreResult<VttObject>;
    /// Merges `patch` over an existing record; the id never changes.
    fn update(&mut self, id: ObjectId, patch: &ObjectPatch) -> StoreResult<VttObject>;
    /// Returns whether a record existed and was removed.
    fn remove(&mut self, id: ObjectId) -> bool;
    fn get(&self, id: ObjectId) -> Option<VttObject>;
    /// Order is not stable across calls.
    fn list(&self) -> Vec<VttObject>;
    fn clear(&mut self);
    /// Inserts a record that already carries its id (session load path).
    fn import(&mut self, object: VttObject) -> StoreResult<VttObject>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

type IdSource = Box<dyn FnMut() -> ObjectId>;

/// Heap-backed object store used by the table runtime.
pub struct MemoryObjectStore {
    objects: HashMap<ObjectId, VttObject>,
    issued_ids: HashSet<ObjectId>,
    next_id: IdSource,
}

impl Default for MemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::with_id_source(Box::new(Uuid::new_v4))
    }

    /// Uses `next_id` instead of random v4 ids. Repeats and nil ids are
    /// skipped, so a misbehaving source can never break uniqueness, only
    /// stall until it yields a fresh id.
    pub fn with_id_source(next_id: IdSource) -> Self {
        Self {
            objects: HashMap::new(),
            issued_ids: HashSet::new(),
            next_id,
        }
    }

    fn fresh_id(&mut self) -> ObjectId {
        loop {
            let candidate = (self.next_id)();
            if candidate.is_nil() || self.issued_ids.contains(&candidate) {
                debug!("event=object_id_retry module=store status=retry");
                continue;
            }
            self.issued_ids.insert(candidate);
            return candidate;
        }
    }
}

impl ObjectStore for MemoryObjectStore {
    fn create(&mut self, shape: Shape, patch: &ObjectPatch) -> StoreResult<VttObject> {
        patch.validate()?;

        let id = self.fresh_id();
        let mut object = VttObject::with_defaults(id, shape, self.objects.len());
        patch.merge_into(&mut object);
        object.shape = shape;

        self.objects.insert(id, object.clone());
        debug!(
            "event=object_created module=store status=ok id={} shape={}",
            id,
            shape.as_str()
        );
        Ok(object)
    }

    fn update(&mut self, id: ObjectId, patch: &ObjectPatch) -> StoreResult<VttObject> {
        let current = self.objects.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        patch.validate()?;

        patch.merge_into(current);
        debug!("event=object_updated module=store status=ok id={id}");
        Ok(current.clone())
    }

    fn remove(&mut self, id: ObjectId) -> bool {
        let removed = self.objects.remove(&id).is_some();
        debug!("event=object_removed module=store status=ok id={id} removed={removed}");
        removed
    }

    fn get(&self, id: ObjectId) -> Option<VttObject> {
        self.objects.get(&id).cloned()
    }

    fn list(&self) -> Vec<VttObject> {
        self.objects.values().cloned().collect()
    }

    fn clear(&mut self) {
        let count = self.objects.len();
        self.objects.clear();
        debug!("event=objects_cleared module=store status=ok count={count}");
    }

    fn import(&mut self, mut object: VttObject) -> StoreResult<VttObject> {
        object.validate()?;
        if self.objects.contains_key(&object.id) {
            return Err(StoreError::DuplicateId(object.id));
        }

        object.normalize_dimensions();
        if object.name.trim().is_empty() {
            object.name = placeholder_name(self.objects.len());
        }
        self.issued_ids.insert(object.id);
        self.objects.insert(object.id, object.clone());
        debug!(
            "event=object_imported module=store status=ok id={}",
            object.id
        );
        Ok(object)
    }

    fn len(&self) -> usize {
        self.objects.len()
    }
}
