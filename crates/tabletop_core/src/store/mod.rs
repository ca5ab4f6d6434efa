//! Canonical object storage.
//!
//! # Responsibility
//! - Define the object store contract used by the facade.
//! - Keep merge/validation enforcement inside one write boundary.
//!
//! # Invariants
//! - Store APIs return semantic errors (`NotFound`, `Validation`) as values.
//! - Only the facade writes to a store owned by the runtime.

pub mod object_store;
