pub mod record;

pub use record::{GroupRecord, TaskRecord};

use serde_json::Value;

/// Error type for persistence-bridge operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("row not found: {table}/{id}")]
    RowNotFound { table: &'static str, id: i64 },
    #[error("backend error: {0}")]
    Backend(String),
}

/// The narrow CRUD contract the board persists through. The real backend is
/// a remote table service; this trait is its local face. Insert assigns and
/// returns the row id; selects return rows ordered by `order_position`.
pub trait BoardStore {
    fn insert_task(&mut self, record: &TaskRecord) -> Result<i64, StoreError>;
    fn update_task(&mut self, id: i64, record: &TaskRecord) -> Result<(), StoreError>;
    fn delete_task(&mut self, id: i64) -> Result<(), StoreError>;
    fn select_tasks(&self) -> Result<Vec<TaskRecord>, StoreError>;

    fn insert_group(&mut self, record: &GroupRecord) -> Result<i64, StoreError>;
    fn update_group(&mut self, id: i64, record: &GroupRecord) -> Result<(), StoreError>;
    fn delete_group(&mut self, id: i64) -> Result<(), StoreError>;
    fn select_groups(&self) -> Result<Vec<GroupRecord>, StoreError>;
}

const TASKS_TABLE: &str = "tasks";
const GROUPS_TABLE: &str = "task_groups";

/// In-memory implementation of the CRUD contract, used in tests and as the
/// reference for the contract's semantics. Rows are kept as JSON objects so
/// every record passes through its persisted field names, exactly as it
/// would against the remote tables.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tasks: Vec<Value>,
    groups: Vec<Value>,
    next_id: i64,
    fail_next: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            tasks: Vec::new(),
            groups: Vec::new(),
            next_id: 0,
            fail_next: None,
        }
    }

    /// Make the next mutating call fail with a backend error. Lets tests
    /// drive the rollback path.
    pub fn fail_next(&mut self, message: impl Into<String>) {
        self.fail_next = Some(message.into());
    }

    pub fn task_row_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn group_row_count(&self) -> usize {
        self.groups.len()
    }

    fn take_failure(&mut self) -> Result<(), StoreError> {
        match self.fail_next.take() {
            Some(message) => Err(StoreError::Backend(message)),
            None => Ok(()),
        }
    }

    fn assign_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

fn row_id(row: &Value) -> Option<i64> {
    row.get("id").and_then(Value::as_i64)
}

fn encode<T: serde::Serialize>(record: &T, id: i64) -> Result<Value, StoreError> {
    let mut row = serde_json::to_value(record).map_err(|e| StoreError::Backend(e.to_string()))?;
    row["id"] = Value::from(id);
    Ok(row)
}

fn find_row<'a>(rows: &'a mut [Value], table: &'static str, id: i64) -> Result<&'a mut Value, StoreError> {
    rows.iter_mut()
        .find(|row| row_id(row) == Some(id))
        .ok_or(StoreError::RowNotFound { table, id })
}

fn decode_all<T: serde::de::DeserializeOwned>(rows: &[Value]) -> Result<Vec<T>, StoreError> {
    let mut sorted: Vec<&Value> = rows.iter().collect();
    sorted.sort_by_key(|row| row.get("order_position").and_then(Value::as_i64).unwrap_or(0));
    sorted
        .into_iter()
        .map(|row| serde_json::from_value(row.clone()).map_err(|e| StoreError::Backend(e.to_string())))
        .collect()
}

impl BoardStore for MemoryStore {
    fn insert_task(&mut self, record: &TaskRecord) -> Result<i64, StoreError> {
        self.take_failure()?;
        let id = self.assign_id();
        self.tasks.push(encode(record, id)?);
        Ok(id)
    }

    fn update_task(&mut self, id: i64, record: &TaskRecord) -> Result<(), StoreError> {
        self.take_failure()?;
        let row = find_row(&mut self.tasks, TASKS_TABLE, id)?;
        *row = encode(record, id)?;
        Ok(())
    }

    fn delete_task(&mut self, id: i64) -> Result<(), StoreError> {
        self.take_failure()?;
        find_row(&mut self.tasks, TASKS_TABLE, id)?;
        self.tasks.retain(|row| row_id(row) != Some(id));
        Ok(())
    }

    fn select_tasks(&self) -> Result<Vec<TaskRecord>, StoreError> {
        decode_all(&self.tasks)
    }

    fn insert_group(&mut self, record: &GroupRecord) -> Result<i64, StoreError> {
        self.take_failure()?;
        let id = self.assign_id();
        self.groups.push(encode(record, id)?);
        Ok(id)
    }

    fn update_group(&mut self, id: i64, record: &GroupRecord) -> Result<(), StoreError> {
        self.take_failure()?;
        let row = find_row(&mut self.groups, GROUPS_TABLE, id)?;
        *row = encode(record, id)?;
        Ok(())
    }

    fn delete_group(&mut self, id: i64) -> Result<(), StoreError> {
        self.take_failure()?;
        find_row(&mut self.groups, GROUPS_TABLE, id)?;
        self.groups.retain(|row| row_id(row) != Some(id));
        Ok(())
    }

    fn select_groups(&self) -> Result<Vec<GroupRecord>, StoreError> {
        decode_all(&self.groups)
    }
}
