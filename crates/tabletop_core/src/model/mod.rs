//! Tabletop domain model.
//!
//! # Responsibility
//! - Define canonical data structures shared by store, facade, and mirrors.
//! - Keep merge and validation rules next to the types they protect.
//!
//! # Invariants
//! - Every placeable object is identified by a stable `ObjectId`.
//! - Records are always complete; partial input travels as explicit patches.

pub mod object;
pub mod snapshot;
pub mod table;
