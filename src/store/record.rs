use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::group::Group;
use crate::model::task::Task;

/// The persisted row shape for a task. Field names follow the backend's
/// column names, which differ from the in-memory model: `order` is stored as
/// `order_position`, `level` as `hierarchy_level`, `added_at` as
/// `created_at`. The derived `subtasks` field is never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: i64,
    pub title: String,
    pub completed: bool,
    pub group_id: Option<i64>,
    pub parent_id: Option<i64>,
    #[serde(rename = "order_position")]
    pub order: i64,
    #[serde(rename = "hierarchy_level")]
    pub level: u8,
    #[serde(rename = "created_at")]
    pub added_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// The persisted row shape for a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRecord {
    pub id: i64,
    pub name: String,
    #[serde(rename = "order_position")]
    pub order: i64,
    #[serde(rename = "created_at")]
    pub added_at: DateTime<Utc>,
}

impl From<&Task> for TaskRecord {
    fn from(task: &Task) -> Self {
        TaskRecord {
            id: task.id,
            title: task.title.clone(),
            completed: task.completed,
            group_id: task.group_id,
            parent_id: task.parent_id,
            order: task.order,
            level: task.level,
            added_at: task.added_at,
            completed_at: task.completed_at,
        }
    }
}

impl From<TaskRecord> for Task {
    fn from(record: TaskRecord) -> Self {
        Task {
            id: record.id,
            title: record.title,
            completed: record.completed,
            group_id: record.group_id,
            parent_id: record.parent_id,
            order: record.order,
            level: record.level,
            added_at: record.added_at,
            completed_at: record.completed_at,
            subtasks: Vec::new(),
        }
    }
}

impl From<&Group> for GroupRecord {
    fn from(group: &Group) -> Self {
        GroupRecord {
            id: group.id,
            name: group.name.clone(),
            order: group.order,
            added_at: group.added_at,
        }
    }
}

impl From<GroupRecord> for Group {
    fn from(record: GroupRecord) -> Self {
        Group {
            id: record.id,
            name: record.name,
            order: record.order,
            added_at: record.added_at,
        }
    }
}
