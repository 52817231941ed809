//! Domain model for the project lifecycle core.
//!
//! # Responsibility
//! - Define canonical records for catalog services, order snapshots, tasks,
//!   and projects.
//! - Hold the pure state-machine and validation rules those records obey.
//!
//! # Invariants
//! - Every persisted record is identified by a stable UUID.
//! - Timestamps are Unix epoch milliseconds.
//! - Project progress and designer rosters are derived, never edited directly.

pub mod catalog;
pub mod due_date;
pub mod order;
pub mod process;
pub mod project;
pub mod task;
pub mod validation;

/// Milliseconds in one calendar day.
pub const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;
