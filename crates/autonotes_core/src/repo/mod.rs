//! Notebook persistence.
//!
//! # Responsibility
//! - Define the file-level access contract used by notebook services.
//! - Keep filesystem details (exclusive creation, locking) out of services.
//!
//! # Invariants
//! - Archives are created exclusively and never rewritten.
//! - Mutations happen while holding the notebook lock.

pub mod lock;
pub mod notebook_repo;
