use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::model::config::BoardConfig;
use crate::model::group::Group;
use crate::model::task::Task;
use crate::notify::{BoardObserver, GroupChange, GroupChangeKind, TaskCompleted};
use crate::ops::group_ops;
use crate::ops::guard::{self, ValidationError};
use crate::ops::reorder::{self, BucketKey};
use crate::ops::task_ops;
use crate::ops::tree;
use crate::store::{BoardStore, GroupRecord, StoreError, TaskRecord};

/// Error type for façade operations
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("persistence failed: {0}")]
    Store(#[from] StoreError),
}

/// The mutation façade: the single entry point for every change to the task
/// board.
///
/// `Board` owns the authoritative flat task and group lists. Every operation
/// is atomic: it validates, mutates an optimistic in-memory copy, persists
/// the difference through the store, and rolls back to the pre-mutation
/// snapshot if any store call fails. Operating on an id that no longer
/// exists is a silent no-op, not an error.
pub struct Board<S: BoardStore> {
    tasks: Vec<Task>,
    groups: Vec<Group>,
    store: S,
    config: BoardConfig,
    observers: Vec<Box<dyn BoardObserver>>,
    drag: Option<i64>,
    next_temp_id: i64,
}

struct Snapshot {
    tasks: Vec<Task>,
    groups: Vec<Group>,
}

impl<S: BoardStore> Board<S> {
    /// Create an empty board over the given store.
    pub fn new(store: S, config: BoardConfig) -> Self {
        Board {
            tasks: Vec::new(),
            groups: Vec::new(),
            store,
            config,
            observers: Vec::new(),
            drag: None,
            next_temp_id: 0,
        }
    }

    /// Hydrate a board from the store's current rows.
    pub fn load(store: S, config: BoardConfig) -> Result<Self, BoardError> {
        let tasks = store.select_tasks()?.into_iter().map(Task::from).collect();
        let groups = store
            .select_groups()?
            .into_iter()
            .map(Group::from)
            .collect();
        let mut board = Board::new(store, config);
        board.tasks = tasks;
        board.groups = groups;
        Ok(board)
    }

    /// Consume the board, returning the underlying store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Mutable access to the underlying store.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    // -----------------------------------------------------------------------
    // Read access
    // -----------------------------------------------------------------------

    /// The flat task list (authoritative representation).
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Groups in sibling order.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// The canonical nested tree derived from the flat list.
    pub fn tree(&self) -> Vec<Task> {
        tree::build_tree(&self.tasks)
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// Register an observer for cross-cutting board events.
    pub fn subscribe(&mut self, observer: Box<dyn BoardObserver>) {
        self.observers.push(observer);
    }

    // -----------------------------------------------------------------------
    // Task operations
    // -----------------------------------------------------------------------

    /// Add a task at the end of the (`parent_id`, `group_id`) bucket.
    ///
    /// The returned task carries the store's row id; while the operation is
    /// in flight it is known by a temporary negative id.
    pub fn add_task(
        &mut self,
        group_id: Option<i64>,
        parent_id: Option<i64>,
        title: &str,
    ) -> Result<Task, BoardError> {
        guard::check_title(title)?;
        if let Some(gid) = group_id
            && group_ops::find_group(&self.groups, gid).is_none()
        {
            return Err(ValidationError::UnknownGroup(gid).into());
        }
        guard::check_depth(&self.tasks, parent_id, 1)?;

        let level = match parent_id {
            Some(pid) => task_ops::find_task(&self.tasks, pid)
                .map(|p| p.level + 1)
                .unwrap_or(1),
            None => 1,
        };
        let key = BucketKey {
            parent: parent_id,
            group: group_id,
        };

        let temp_id = self.alloc_temp_id();
        let mut task = Task::new(temp_id, title.trim().to_string());
        task.group_id = group_id;
        task.parent_id = parent_id;
        task.level = level;
        task.order = reorder::bucket_len(&self.tasks, key) as i64;

        let before = self.snapshot();
        self.tasks.push(task);
        let renames = self.commit(before)?;
        let id = confirmed_id(&renames, temp_id);
        debug!(task_id = id, ?parent_id, ?group_id, "task added");

        match task_ops::find_task(&self.tasks, id) {
            Some(task) => Ok(task.clone()),
            None => Err(StoreError::RowNotFound {
                table: "tasks",
                id,
            }
            .into()),
        }
    }

    /// Flip a task's completion flag. Children and parents are unaffected.
    pub fn toggle_task(&mut self, id: i64) -> Result<(), BoardError> {
        let before = self.snapshot();
        let Some(now_completed) = task_ops::toggle_completed(&mut self.tasks, id) else {
            return Ok(());
        };
        self.commit(before)?;

        if now_completed && self.config.notifications.task_completed {
            if let Some(event) = self.completed_event(id) {
                self.emit_task_completed(event);
            }
        }
        Ok(())
    }

    /// Replace a task's title. A blank title or an unknown id is a no-op.
    pub fn update_task_title(&mut self, id: i64, title: &str) -> Result<(), BoardError> {
        if title.trim().is_empty() {
            return Ok(());
        }
        let before = self.snapshot();
        if !task_ops::rename(&mut self.tasks, id, title.trim()) {
            return Ok(());
        }
        self.commit(before)?;
        Ok(())
    }

    /// Delete a task and its entire subtree, then close the gap it left in
    /// its sibling bucket. Unknown ids are a no-op.
    pub fn delete_task(&mut self, id: i64) -> Result<(), BoardError> {
        let Some(task) = task_ops::find_task(&self.tasks, id) else {
            return Ok(());
        };
        let key = BucketKey::of(task);
        let before = self.snapshot();
        let removed = task_ops::remove_subtree(&mut self.tasks, id);
        reorder::renumber_bucket(&mut self.tasks, key);
        self.commit(before)?;
        debug!(task_id = id, removed = removed.len(), "task deleted");
        Ok(())
    }

    /// Move a task onto another task's slot within their shared sibling
    /// bucket. Missing ids, mismatched buckets, and self-moves are no-ops.
    /// Returns the canonical tree after the move.
    pub fn reorder_task(&mut self, source_id: i64, target_id: i64) -> Result<Vec<Task>, BoardError> {
        let before = self.snapshot();
        let changed = reorder::reorder(&mut self.tasks, source_id, target_id);
        if changed.is_empty() {
            return Ok(self.tree());
        }
        self.commit(before)?;
        debug!(source_id, target_id, touched = changed.len(), "siblings reordered");
        Ok(self.tree())
    }

    /// Index-based variant of [`Board::reorder_task`]: move the bucket
    /// member at `from` to position `to`.
    pub fn reorder_at(
        &mut self,
        key: BucketKey,
        from: usize,
        to: usize,
    ) -> Result<Vec<Task>, BoardError> {
        let ids = reorder::bucket_ids(&self.tasks, key);
        match (ids.get(from), ids.get(to)) {
            (Some(source), Some(target)) => self.reorder_task(*source, *target),
            _ => Ok(self.tree()),
        }
    }

    /// Move a task (with its subtree) into another bucket: under a different
    /// parent, into or out of a group, or back to the top level.
    ///
    /// The task lands at the end of the destination bucket unless `target_id`
    /// names a destination member to splice in front of. Rejected with a
    /// validation error when the destination would create a cycle or push
    /// the subtree past the depth limit; unknown sources are a no-op.
    pub fn move_task(
        &mut self,
        source_id: i64,
        dest_parent: Option<i64>,
        dest_group: Option<i64>,
        target_id: Option<i64>,
    ) -> Result<Vec<Task>, BoardError> {
        if task_ops::find_task(&self.tasks, source_id).is_none() {
            return Ok(self.tree());
        }
        if let Some(gid) = dest_group
            && group_ops::find_group(&self.groups, gid).is_none()
        {
            return Err(ValidationError::UnknownGroup(gid).into());
        }
        guard::check_cycle(&self.tasks, source_id, dest_parent)?;
        let height = guard::subtree_height(&self.tasks, source_id);
        guard::check_depth(&self.tasks, dest_parent, height)?;

        let dest = BucketKey {
            parent: dest_parent,
            group: dest_group,
        };
        let before = self.snapshot();
        let changed = reorder::relocate(&mut self.tasks, source_id, dest, target_id);
        if changed.is_empty() {
            return Ok(self.tree());
        }
        self.commit(before)?;
        debug!(source_id, ?dest_parent, ?dest_group, "task moved");
        Ok(self.tree())
    }

    // -----------------------------------------------------------------------
    // Group operations
    // -----------------------------------------------------------------------

    /// Add a group at the end of the group list.
    pub fn add_group(&mut self, name: &str) -> Result<Group, BoardError> {
        guard::check_name(name)?;

        let temp_id = self.alloc_temp_id();
        let mut group = Group::new(temp_id, name.trim().to_string());
        group.order = group_ops::next_group_order(&self.groups);

        let before = self.snapshot();
        self.groups.push(group);
        self.commit(before)?;

        // The temp id was confirmed during commit; the new group is the one
        // at the slot we appended to.
        let group = match self.groups.last() {
            Some(group) => group.clone(),
            None => {
                return Err(StoreError::Backend("group vanished during insert".into()).into());
            }
        };
        debug!(group_id = group.id, name = %group.name, "group added");
        self.emit_group_changed(GroupChangeKind::Added, group.name.clone());
        Ok(group)
    }

    /// Rename a group. A blank name or an unknown id is a no-op.
    pub fn rename_group(&mut self, id: i64, name: &str) -> Result<(), BoardError> {
        if name.trim().is_empty() {
            return Ok(());
        }
        let before = self.snapshot();
        if !group_ops::rename(&mut self.groups, id, name.trim()) {
            return Ok(());
        }
        self.commit(before)?;
        Ok(())
    }

    /// Delete a group, applying the configured policy (cascade or detach) to
    /// its member tasks. Unknown ids are a no-op.
    pub fn delete_group(&mut self, id: i64) -> Result<(), BoardError> {
        let policy = self.config.policy.group_delete;
        let before = self.snapshot();
        let Some(removed) = group_ops::delete_group(&mut self.groups, &mut self.tasks, id, policy)
        else {
            return Ok(());
        };
        self.commit(before)?;
        debug!(group_id = id, ?policy, "group deleted");
        self.emit_group_changed(GroupChangeKind::Deleted, removed.name);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Id confirmation
    // -----------------------------------------------------------------------

    /// Replace a temporary task id with the persisted row id, rewriting the
    /// parent references of its children. Local only; never touches the
    /// store. Unknown ids are a no-op.
    pub fn confirm_task_id(&mut self, temp_id: i64, persisted_id: i64) {
        task_ops::rename_task_id(&mut self.tasks, temp_id, persisted_id);
        if self.drag == Some(temp_id) {
            self.drag = Some(persisted_id);
        }
    }

    /// Group counterpart of [`Board::confirm_task_id`], rewriting member
    /// tasks' group references.
    pub fn confirm_group_id(&mut self, temp_id: i64, persisted_id: i64) {
        group_ops::rename_group_id(&mut self.groups, &mut self.tasks, temp_id, persisted_id);
    }

    // -----------------------------------------------------------------------
    // Drag protocol
    // -----------------------------------------------------------------------

    /// Capture the active item of a drag gesture. Beginning a new drag
    /// replaces any previous session; unknown ids are ignored.
    pub fn begin_drag(&mut self, id: i64) {
        if task_ops::find_task(&self.tasks, id).is_some() {
            self.drag = Some(id);
        }
    }

    /// Finish the drag over `target_id`, applying the sibling reorder.
    /// Without an active session this is a no-op.
    pub fn end_drag(&mut self, target_id: i64) -> Result<Vec<Task>, BoardError> {
        match self.drag.take() {
            Some(active_id) => self.reorder_task(active_id, target_id),
            None => Ok(self.tree()),
        }
    }

    /// Abandon the drag. Pure no-op on the data model.
    pub fn cancel_drag(&mut self) {
        self.drag = None;
    }

    /// The id captured by `begin_drag`, while a session is active.
    pub fn dragging(&self) -> Option<i64> {
        self.drag
    }

    // -----------------------------------------------------------------------
    // Stats
    // -----------------------------------------------------------------------

    /// Completion counts, total and per group (tasks count toward the
    /// nearest group up their parent chain).
    pub fn stats(&self) -> BoardStats {
        let mut stats = BoardStats::default();
        for group in &self.groups {
            stats.per_group.insert(group.name.clone(), GroupStats::default());
        }
        for task in &self.tasks {
            stats.total += 1;
            if task.completed {
                stats.completed += 1;
            }
            if let Some(group) = self.effective_group(task) {
                let entry = stats.per_group.entry(group.name.clone()).or_default();
                if task.completed {
                    entry.completed += 1;
                } else {
                    entry.open += 1;
                }
            }
        }
        stats
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn alloc_temp_id(&mut self) -> i64 {
        self.next_temp_id -= 1;
        self.next_temp_id
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            tasks: self.tasks.clone(),
            groups: self.groups.clone(),
        }
    }

    /// Persist the difference against `before`; restore the snapshot if the
    /// store rejects any call. Returns the (temp id → persisted id) task
    /// confirmations performed along the way.
    fn commit(&mut self, before: Snapshot) -> Result<Vec<(i64, i64)>, BoardError> {
        match self.persist_diff(&before) {
            Ok(renames) => Ok(renames),
            Err(err) => {
                warn!(error = %err, "store rejected mutation, rolling back");
                self.tasks = before.tasks;
                self.groups = before.groups;
                Err(err.into())
            }
        }
    }

    fn persist_diff(&mut self, before: &Snapshot) -> Result<Vec<(i64, i64)>, StoreError> {
        let before_tasks: HashMap<i64, TaskRecord> = before
            .tasks
            .iter()
            .map(|t| (t.id, TaskRecord::from(t)))
            .collect();
        let before_groups: HashMap<i64, GroupRecord> = before
            .groups
            .iter()
            .map(|g| (g.id, GroupRecord::from(g)))
            .collect();
        let task_ids: HashSet<i64> = self.tasks.iter().map(|t| t.id).collect();
        let group_ids: HashSet<i64> = self.groups.iter().map(|g| g.id).collect();

        // Deletes first: task rows before any group row they reference.
        for id in before_tasks.keys() {
            if !task_ids.contains(id) {
                self.store.delete_task(*id)?;
            }
        }
        for id in before_groups.keys() {
            if !group_ids.contains(id) {
                self.store.delete_group(*id)?;
            }
        }

        // Inserts: groups before tasks, so a new task row never carries a
        // temporary group id.
        let mut group_renames = Vec::new();
        for group in &self.groups {
            if !before_groups.contains_key(&group.id) {
                let persisted = self.store.insert_group(&GroupRecord::from(group))?;
                group_renames.push((group.id, persisted));
            }
        }
        for (temp, persisted) in &group_renames {
            group_ops::rename_group_id(&mut self.groups, &mut self.tasks, *temp, *persisted);
        }

        let mut task_renames = Vec::new();
        for task in &self.tasks {
            if !before_tasks.contains_key(&task.id) {
                let persisted = self.store.insert_task(&TaskRecord::from(task))?;
                task_renames.push((task.id, persisted));
            }
        }
        for (temp, persisted) in &task_renames {
            task_ops::rename_task_id(&mut self.tasks, *temp, *persisted);
        }

        // Updates last, computed after id confirmation.
        for group in &self.groups {
            if let Some(prev) = before_groups.get(&group.id) {
                let record = GroupRecord::from(group);
                if record != *prev {
                    self.store.update_group(group.id, &record)?;
                }
            }
        }
        for task in &self.tasks {
            if let Some(prev) = before_tasks.get(&task.id) {
                let record = TaskRecord::from(task);
                if record != *prev {
                    self.store.update_task(task.id, &record)?;
                }
            }
        }

        Ok(task_renames)
    }

    /// Nearest group up the parent chain, starting at the task itself.
    fn effective_group(&self, task: &Task) -> Option<&Group> {
        let mut cursor = Some(task);
        let mut hops = 0usize;
        while let Some(t) = cursor {
            if let Some(gid) = t.group_id {
                return group_ops::find_group(&self.groups, gid);
            }
            hops += 1;
            if hops > self.tasks.len() {
                break;
            }
            cursor = t
                .parent_id
                .and_then(|pid| task_ops::find_task(&self.tasks, pid));
        }
        None
    }

    fn completed_event(&self, id: i64) -> Option<TaskCompleted> {
        let task = task_ops::find_task(&self.tasks, id)?;
        let parent_task_title = task
            .parent_id
            .and_then(|pid| task_ops::find_task(&self.tasks, pid))
            .map(|p| p.title.clone());
        Some(TaskCompleted {
            id: task.id,
            title: task.title.clone(),
            completed_at: task.completed_at.unwrap_or_else(chrono::Utc::now),
            parent_task_title,
            group_name: self.effective_group(task).map(|g| g.name.clone()),
        })
    }

    fn emit_task_completed(&mut self, event: TaskCompleted) {
        for observer in &mut self.observers {
            observer.task_completed(&event);
        }
    }

    fn emit_group_changed(&mut self, kind: GroupChangeKind, name: String) {
        if !self.config.notifications.group_changes {
            return;
        }
        let event = GroupChange { kind, name };
        for observer in &mut self.observers {
            observer.group_changed(&event);
        }
    }
}

fn confirmed_id(renames: &[(i64, i64)], temp_id: i64) -> i64 {
    renames
        .iter()
        .find(|(temp, _)| *temp == temp_id)
        .map(|(_, persisted)| *persisted)
        .unwrap_or(temp_id)
}

/// Completion counts across the board.
#[derive(Debug, Default)]
pub struct BoardStats {
    pub total: usize,
    pub completed: usize,
    pub per_group: IndexMap<String, GroupStats>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GroupStats {
    pub open: usize,
    pub completed: usize,
}
