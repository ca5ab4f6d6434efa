//! Change propagation between the facade and view-model mirrors.
//!
//! # Responsibility
//! - Define typed change notifications.
//! - Deliver them synchronously to subscribers without coupling the store
//!   to any presentation code.

pub mod change;
pub mod notifier;
