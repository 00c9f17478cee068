use chrono::Utc;

use crate::model::task::Task;

// ---------------------------------------------------------------------------
// Lookup helpers
// ---------------------------------------------------------------------------

/// Find a task in the flat list by id.
pub fn find_task(tasks: &[Task], id: i64) -> Option<&Task> {
    tasks.iter().find(|t| t.id == id)
}

/// Find a task in the flat list by id, mutable.
pub fn find_task_mut(tasks: &mut [Task], id: i64) -> Option<&mut Task> {
    tasks.iter_mut().find(|t| t.id == id)
}

/// Collect the ids of the subtree rooted at `id` (the root included),
/// breadth-first. Returns an empty list for an unknown id. Safe against
/// looping parent references in corrupted data: every id is visited once.
pub fn subtree_ids(tasks: &[Task], id: i64) -> Vec<i64> {
    if find_task(tasks, id).is_none() {
        return Vec::new();
    }
    let mut collected = vec![id];
    let mut cursor = 0;
    while cursor < collected.len() {
        let parent = collected[cursor];
        for task in tasks {
            if task.parent_id == Some(parent) && !collected.contains(&task.id) {
                collected.push(task.id);
            }
        }
        cursor += 1;
    }
    collected
}

// ---------------------------------------------------------------------------
// Field mutations
// ---------------------------------------------------------------------------

/// Flip a task's completion flag, stamping or clearing `completed_at`.
/// Returns the new flag, or `None` if the id is unknown.
pub fn toggle_completed(tasks: &mut [Task], id: i64) -> Option<bool> {
    let task = find_task_mut(tasks, id)?;
    task.completed = !task.completed;
    task.completed_at = if task.completed {
        Some(Utc::now())
    } else {
        None
    };
    Some(task.completed)
}

/// Replace a task's title in place, preserving all other fields.
/// Returns false if the id is unknown.
pub fn rename(tasks: &mut [Task], id: i64, title: &str) -> bool {
    match find_task_mut(tasks, id) {
        Some(task) => {
            task.title = title.to_string();
            true
        }
        None => false,
    }
}

/// Remove the task and its entire subtree from the flat list.
/// Returns the removed tasks (empty for an unknown id). The caller is
/// responsible for renumbering the vacated bucket.
pub fn remove_subtree(tasks: &mut Vec<Task>, id: i64) -> Vec<Task> {
    let doomed = subtree_ids(tasks, id);
    if doomed.is_empty() {
        return Vec::new();
    }
    let mut removed = Vec::with_capacity(doomed.len());
    tasks.retain_mut(|t| {
        if doomed.contains(&t.id) {
            removed.push(t.clone());
            false
        } else {
            true
        }
    });
    removed
}

/// Rewrite a task id everywhere it appears: the task itself and the
/// `parent_id` of its children. Used when a temporary client-side id is
/// replaced by the persisted row id.
pub fn rename_task_id(tasks: &mut [Task], old_id: i64, new_id: i64) {
    for task in tasks.iter_mut() {
        if task.id == old_id {
            task.id = new_id;
        }
        if task.parent_id == Some(old_id) {
            task.parent_id = Some(new_id);
        }
    }
}

/// Recompute `level` for the subtree rooted at `id`, walking down from
/// `root_level`.
pub fn set_subtree_levels(tasks: &mut [Task], id: i64, root_level: u8) {
    let ids = subtree_ids(tasks, id);
    if let Some(task) = find_task_mut(tasks, id) {
        task.level = root_level;
    }
    // ids is in breadth-first order, so parents are leveled before children.
    for sid in ids.into_iter().skip(1) {
        let parent_level = find_task(tasks, sid)
            .and_then(|t| t.parent_id)
            .and_then(|pid| find_task(tasks, pid))
            .map(|p| p.level)
            .unwrap_or(0);
        if let Some(task) = find_task_mut(tasks, sid) {
            task.level = parent_level + 1;
        }
    }
}
