//! Kanban boards with a transactional card lifecycle.
//!
//! Cards move through a board's ordered columns (INITIAL → PENDING* → FINAL),
//! can be blocked and unblocked along the way, and can be cancelled from any
//! non-terminal column. Every transition commits atomically to SQLite.

pub mod api;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod services;
