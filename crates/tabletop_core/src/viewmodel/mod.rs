//! View-model mirrors of canonical table state.
//!
//! # Responsibility
//! - Keep presentation-facing copies of table state current through change
//!   notifications only.
//! - Expose snapshot getters and callbacks to UI widgets and the renderer.
//!
//! # Invariants
//! - Each mirror starts `Uninitialized` and becomes `Populated` through one
//!   bulk load; every later change is a notification-driven delta.

pub mod canvas;
pub mod mirror;
pub mod ui;
