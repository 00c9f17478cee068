use crate::model::task::Task;

use super::task_ops::{find_task, subtree_ids};

/// Maximum nesting depth. Root tasks are level 1, so the deepest allowed
/// subtask is a grandchild.
pub const MAX_LEVEL: u8 = 3;

/// Error type for mutation validation. Failures are reported before any
/// state change; a rejected operation leaves the board untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("task title cannot be empty")]
    EmptyTitle,
    #[error("group name cannot be empty")]
    EmptyName,
    #[error("cannot nest tasks deeper than {MAX_LEVEL} levels")]
    DepthExceeded,
    #[error("move would make task {0} its own ancestor")]
    Cycle(i64),
    #[error("parent task not found: {0}")]
    UnknownParent(i64),
    #[error("group not found: {0}")]
    UnknownGroup(i64),
}

/// Reject empty or whitespace-only titles.
pub fn check_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        Err(ValidationError::EmptyTitle)
    } else {
        Ok(())
    }
}

/// Reject empty or whitespace-only group names.
pub fn check_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        Err(ValidationError::EmptyName)
    } else {
        Ok(())
    }
}

/// Walk the parent chain upward from `new_parent`; if `task_id` is met
/// before a root, the move would make the task its own ancestor.
pub fn check_cycle(
    tasks: &[Task],
    task_id: i64,
    new_parent: Option<i64>,
) -> Result<(), ValidationError> {
    let mut cursor = new_parent;
    let mut hops = 0usize;
    while let Some(parent_id) = cursor {
        if parent_id == task_id {
            return Err(ValidationError::Cycle(task_id));
        }
        // A chain longer than the task list means the stored data already
        // loops; stop walking rather than spin.
        hops += 1;
        if hops > tasks.len() {
            break;
        }
        cursor = find_task(tasks, parent_id).and_then(|t| t.parent_id);
    }
    Ok(())
}

/// Reject a placement that would push any task of the moved subtree past
/// `MAX_LEVEL`. `subtree_height` is 1 for a leaf (or a task being created).
pub fn check_depth(
    tasks: &[Task],
    new_parent: Option<i64>,
    subtree_height: u8,
) -> Result<(), ValidationError> {
    let base = match new_parent {
        None => 0,
        Some(parent_id) => {
            find_task(tasks, parent_id)
                .ok_or(ValidationError::UnknownParent(parent_id))?
                .level
        }
    };
    if base + subtree_height > MAX_LEVEL {
        Err(ValidationError::DepthExceeded)
    } else {
        Ok(())
    }
}

/// Height of the subtree rooted at `id`: 1 for a leaf, 0 if `id` is unknown.
pub fn subtree_height(tasks: &[Task], id: i64) -> u8 {
    let ids = subtree_ids(tasks, id);
    if ids.is_empty() {
        return 0;
    }
    let root_level = find_task(tasks, id).map(|t| t.level).unwrap_or(1);
    let deepest = ids
        .iter()
        .filter_map(|sid| find_task(tasks, *sid))
        .map(|t| t.level)
        .max()
        .unwrap_or(root_level);
    deepest.saturating_sub(root_level) + 1
}
