use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named container for top-level tasks, ordered among its siblings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    /// Unique identity. Negative ids are temporary client-side ids, same
    /// lifecycle as task ids.
    pub id: i64,
    /// Group name; mutation operations reject empty/whitespace-only names.
    pub name: String,
    /// Sibling position among groups, contiguous and zero-based.
    pub order: i64,
    /// Creation timestamp.
    pub added_at: DateTime<Utc>,
}

impl Group {
    pub fn new(id: i64, name: String) -> Self {
        Group {
            id,
            name,
            order: 0,
            added_at: Utc::now(),
        }
    }
}

impl PartialEq for Group {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.name == other.name && self.order == other.order
    }
}

impl Eq for Group {}
