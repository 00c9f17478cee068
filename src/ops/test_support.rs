//! Shared fixtures for the ops test modules.

use crate::model::task::Task;

/// Build a flat task with the given placement fields and a generated title.
pub fn task_with(id: i64, parent_id: Option<i64>, group_id: Option<i64>, order: i64, level: u8) -> Task {
    let mut task = Task::new(id, format!("task {}", id));
    task.parent_id = parent_id;
    task.group_id = group_id;
    task.order = order;
    task.level = level;
    task
}

/// Orders of a bucket's members, sorted by order, as (id, order) pairs.
pub fn bucket_orders(tasks: &[Task], parent: Option<i64>, group: Option<i64>) -> Vec<(i64, i64)> {
    let mut members: Vec<(i64, i64)> = tasks
        .iter()
        .filter(|t| t.parent_id == parent && t.group_id == group)
        .map(|t| (t.id, t.order))
        .collect();
    members.sort_by_key(|(_, order)| *order);
    members
}
