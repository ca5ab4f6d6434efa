//! Core use-case services.
//!
//! # Responsibility
//! - Expose the table facade as the only write path into canonical state.
//! - Couple every canonical mutation to its change notification.

pub mod table_service;
