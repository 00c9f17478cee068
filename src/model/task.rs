use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single task in the board's flat list.
///
/// The flat list is the authoritative representation: `parent_id` and `order`
/// fully determine the hierarchy and sibling positions. `subtasks` is derived
/// by the tree builder and is never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique identity. Negative ids are temporary client-side ids assigned
    /// at creation; they are replaced once the store confirms a row id.
    pub id: i64,
    /// Task title; mutation operations reject empty/whitespace-only titles.
    pub title: String,
    /// Completion flag; independent of parent and children.
    pub completed: bool,
    /// Group membership. Children do not duplicate the parent's group.
    pub group_id: Option<i64>,
    /// Parent task; `None` marks a root task.
    pub parent_id: Option<i64>,
    /// Sibling position within the (`parent_id`, `group_id`) bucket.
    /// Contiguous and zero-based after every reconciliation pass.
    pub order: i64,
    /// Nesting depth; root = 1, strictly `parent.level + 1`.
    pub level: u8,
    /// Creation timestamp.
    pub added_at: DateTime<Utc>,
    /// Set when `completed` flips to true, cleared when it flips back.
    pub completed_at: Option<DateTime<Utc>>,
    /// Derived children, populated by the tree builder.
    #[serde(skip)]
    pub subtasks: Vec<Task>,
}

impl Task {
    /// Create a flat task with no children.
    pub fn new(id: i64, title: String) -> Self {
        Task {
            id,
            title,
            completed: false,
            group_id: None,
            parent_id: None,
            order: 0,
            level: 1,
            added_at: Utc::now(),
            completed_at: None,
            subtasks: Vec::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.title == other.title
            && self.completed == other.completed
            && self.group_id == other.group_id
            && self.parent_id == other.parent_id
            && self.order == other.order
            && self.level == other.level
            && self.subtasks == other.subtasks
    }
}

impl Eq for Task {}
