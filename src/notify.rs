//! Observer interface for cross-cutting board events.
//!
//! Decoupled panels (a focus timer, an activity log) subscribe here instead
//! of listening on an ambient event bus. Broadcasts are fire-and-forget:
//! observers cannot fail or veto the operation that triggered them, and a
//! dropped event never affects data integrity.

use chrono::{DateTime, Utc};

/// Payload broadcast when a task is marked completed.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskCompleted {
    pub id: i64,
    pub title: String,
    pub completed_at: DateTime<Utc>,
    /// Title of the direct parent, for nested tasks.
    pub parent_task_title: Option<String>,
    /// Name of the nearest group up the parent chain, if any.
    pub group_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupChangeKind {
    Added,
    Deleted,
}

/// Payload broadcast when a group is created or deleted.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupChange {
    pub kind: GroupChangeKind,
    pub name: String,
}

/// Board event subscriber. Both hooks default to no-ops so observers only
/// implement the events they care about.
pub trait BoardObserver {
    fn task_completed(&mut self, _event: &TaskCompleted) {}
    fn group_changed(&mut self, _event: &GroupChange) {}
}
