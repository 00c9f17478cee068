use crate::model::task::Task;

use super::task_ops::{find_task, find_task_mut, set_subtree_levels, subtree_ids};

/// Identity of a sibling bucket: the set of tasks sharing a parent reference
/// and a group reference. Top-level ungrouped tasks live in the bucket where
/// both are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BucketKey {
    pub parent: Option<i64>,
    pub group: Option<i64>,
}

impl BucketKey {
    pub const TOP_LEVEL: BucketKey = BucketKey {
        parent: None,
        group: None,
    };

    pub fn of(task: &Task) -> Self {
        BucketKey {
            parent: task.parent_id,
            group: task.group_id,
        }
    }

    /// The bucket holding top-level tasks of a group.
    pub fn in_group(group_id: i64) -> Self {
        BucketKey {
            parent: None,
            group: Some(group_id),
        }
    }

    /// The bucket holding a parent's subtasks.
    pub fn under_parent(parent_id: i64) -> Self {
        BucketKey {
            parent: Some(parent_id),
            group: None,
        }
    }
}

/// Member ids of a bucket, sorted by current `order` (list position breaks
/// ties, so a renumber pass is deterministic even on tied data).
pub fn bucket_ids(tasks: &[Task], key: BucketKey) -> Vec<i64> {
    let mut members: Vec<(i64, usize, i64)> = tasks
        .iter()
        .enumerate()
        .filter(|(_, t)| BucketKey::of(t) == key)
        .map(|(pos, t)| (t.order, pos, t.id))
        .collect();
    members.sort_by_key(|(order, pos, _)| (*order, *pos));
    members.into_iter().map(|(_, _, id)| id).collect()
}

/// Number of tasks in a bucket.
pub fn bucket_len(tasks: &[Task], key: BucketKey) -> usize {
    tasks.iter().filter(|t| BucketKey::of(t) == key).count()
}

/// Assign `order = index` over `ids`, in sequence. Returns the ids whose
/// order actually changed.
fn apply_sequence(tasks: &mut [Task], ids: &[i64]) -> Vec<i64> {
    let mut changed = Vec::new();
    for (index, id) in ids.iter().enumerate() {
        if let Some(task) = find_task_mut(tasks, *id)
            && task.order != index as i64
        {
            task.order = index as i64;
            changed.push(*id);
        }
    }
    changed
}

/// Re-assign contiguous zero-based orders over a bucket, preserving the
/// current relative order. Returns the ids whose order changed.
pub fn renumber_bucket(tasks: &mut [Task], key: BucketKey) -> Vec<i64> {
    let ids = bucket_ids(tasks, key);
    apply_sequence(tasks, &ids)
}

/// Move `source_id` to `target_id`'s slot within their shared bucket,
/// shifting the tasks in between by one, then renumber the bucket.
///
/// No-op (empty return) when the two ids are equal, when either is missing,
/// or when the target lives in a different bucket; cross-bucket moves go
/// through [`relocate`].
pub fn reorder(tasks: &mut [Task], source_id: i64, target_id: i64) -> Vec<i64> {
    if source_id == target_id {
        return Vec::new();
    }
    let Some(source) = find_task(tasks, source_id) else {
        return Vec::new();
    };
    let key = BucketKey::of(source);
    match find_task(tasks, target_id) {
        Some(target) if BucketKey::of(target) == key => {}
        _ => return Vec::new(),
    }

    // Compute the new sequence on a fresh id list; the task vector itself is
    // only touched in the final assignment pass.
    let mut ids = bucket_ids(tasks, key);
    let src_idx = ids.iter().position(|id| *id == source_id);
    let tgt_idx = ids.iter().position(|id| *id == target_id);
    let (Some(src_idx), Some(tgt_idx)) = (src_idx, tgt_idx) else {
        return Vec::new();
    };

    let id = ids.remove(src_idx);
    ids.insert(tgt_idx.min(ids.len()), id);
    apply_sequence(tasks, &ids)
}

/// Cross-bucket move: re-home `source_id` (with its subtree) into `dest`,
/// then renumber both buckets.
///
/// The task lands at the end of the destination bucket unless `target_id`
/// names a destination member, in which case insert-at-target semantics
/// apply. Levels of the moved subtree are recomputed from the destination
/// parent. Returns all ids whose placement fields changed; empty when the
/// source is unknown or the move is a no-op.
///
/// Callers are responsible for cycle/depth validation before calling.
pub fn relocate(
    tasks: &mut [Task],
    source_id: i64,
    dest: BucketKey,
    target_id: Option<i64>,
) -> Vec<i64> {
    let Some(source) = find_task(tasks, source_id) else {
        return Vec::new();
    };
    let old_key = BucketKey::of(source);
    if old_key == dest {
        return match target_id {
            Some(target) => reorder(tasks, source_id, target),
            None => move_to_end(tasks, source_id),
        };
    }

    let old_level = source.level;
    let mut changed = vec![source_id];

    // Re-home the task first, so the destination bucket includes it when the
    // new sequence is computed.
    if let Some(source) = find_task_mut(tasks, source_id) {
        source.parent_id = dest.parent;
        source.group_id = dest.group;
    }

    let new_level = match dest.parent {
        Some(parent_id) => find_task(tasks, parent_id).map(|p| p.level + 1).unwrap_or(1),
        None => 1,
    };
    if new_level != old_level {
        set_subtree_levels(tasks, source_id, new_level);
        for id in subtree_ids(tasks, source_id) {
            if !changed.contains(&id) {
                changed.push(id);
            }
        }
    }

    // Destination sequence: existing members in their current order, with the
    // moved task appended or spliced in at the target's slot.
    let mut dest_ids: Vec<i64> = bucket_ids(tasks, dest)
        .into_iter()
        .filter(|id| *id != source_id)
        .collect();
    let insert_at = target_id
        .and_then(|tid| dest_ids.iter().position(|id| *id == tid))
        .unwrap_or(dest_ids.len());
    dest_ids.insert(insert_at, source_id);

    for id in apply_sequence(tasks, &dest_ids) {
        if !changed.contains(&id) {
            changed.push(id);
        }
    }
    for id in renumber_bucket(tasks, old_key) {
        if !changed.contains(&id) {
            changed.push(id);
        }
    }
    changed
}

/// Move a task to the last slot of its own bucket.
fn move_to_end(tasks: &mut [Task], source_id: i64) -> Vec<i64> {
    let Some(source) = find_task(tasks, source_id) else {
        return Vec::new();
    };
    let key = BucketKey::of(source);
    let mut ids: Vec<i64> = bucket_ids(tasks, key)
        .into_iter()
        .filter(|id| *id != source_id)
        .collect();
    ids.push(source_id);
    apply_sequence(tasks, &ids)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ops::test_support::{bucket_orders, task_with};

    fn three_roots() -> Vec<Task> {
        vec![
            task_with(1, None, None, 0, 1),
            task_with(2, None, None, 1, 1),
            task_with(3, None, None, 2, 1),
        ]
    }

    #[test]
    fn test_reorder_moves_source_to_target_slot() {
        // Moving 1 onto 3 puts 1 at the end.
        let mut tasks = three_roots();
        let changed = reorder(&mut tasks, 1, 3);
        assert_eq!(bucket_orders(&tasks, None, None), vec![(2, 0), (3, 1), (1, 2)]);
        assert_eq!(changed.len(), 3);
    }

    #[test]
    fn test_reorder_backwards() {
        let mut tasks = three_roots();
        reorder(&mut tasks, 3, 1);
        assert_eq!(bucket_orders(&tasks, None, None), vec![(3, 0), (1, 1), (2, 2)]);
    }

    #[test]
    fn test_reorder_self_is_noop() {
        let mut tasks = three_roots();
        let before = tasks.clone();
        assert!(reorder(&mut tasks, 2, 2).is_empty());
        assert_eq!(tasks, before);
    }

    #[test]
    fn test_reorder_unknown_ids_is_noop() {
        let mut tasks = three_roots();
        let before = tasks.clone();
        assert!(reorder(&mut tasks, 99, 1).is_empty());
        assert!(reorder(&mut tasks, 1, 99).is_empty());
        assert_eq!(tasks, before);
    }

    #[test]
    fn test_reorder_across_buckets_is_noop() {
        let mut tasks = three_roots();
        tasks.push(task_with(10, None, Some(7), 0, 1));
        let before = tasks.clone();
        assert!(reorder(&mut tasks, 1, 10).is_empty());
        assert_eq!(tasks, before);
    }

    #[test]
    fn test_reorder_leaves_other_buckets_untouched() {
        let mut tasks = three_roots();
        tasks.push(task_with(10, None, Some(7), 0, 1));
        tasks.push(task_with(11, None, Some(7), 1, 1));
        reorder(&mut tasks, 1, 3);
        assert_eq!(bucket_orders(&tasks, None, Some(7)), vec![(10, 0), (11, 1)]);
    }

    #[test]
    fn test_renumber_closes_gaps() {
        let mut tasks = vec![
            task_with(1, None, None, 3, 1),
            task_with(2, None, None, 7, 1),
            task_with(3, None, None, 9, 1),
        ];
        let changed = renumber_bucket(&mut tasks, BucketKey::TOP_LEVEL);
        assert_eq!(bucket_orders(&tasks, None, None), vec![(1, 0), (2, 1), (3, 2)]);
        assert_eq!(changed, vec![1, 2, 3]);
    }

    #[test]
    fn test_renumber_breaks_ties_by_position() {
        let mut tasks = vec![
            task_with(1, None, None, 0, 1),
            task_with(2, None, None, 0, 1),
        ];
        renumber_bucket(&mut tasks, BucketKey::TOP_LEVEL);
        assert_eq!(bucket_orders(&tasks, None, None), vec![(1, 0), (2, 1)]);
    }

    #[test]
    fn test_relocate_appends_to_group() {
        // C (top-level) moves into group G behind A and B.
        let mut tasks = vec![
            task_with(1, None, Some(7), 0, 1), // A
            task_with(2, None, Some(7), 1, 1), // B
            task_with(3, None, None, 0, 1),    // C
        ];
        relocate(&mut tasks, 3, BucketKey::in_group(7), None);
        assert_eq!(
            bucket_orders(&tasks, None, Some(7)),
            vec![(1, 0), (2, 1), (3, 2)]
        );
        assert_eq!(find_task(&tasks, 3).unwrap().group_id, Some(7));
    }

    #[test]
    fn test_relocate_into_empty_bucket() {
        let mut tasks = vec![task_with(3, None, None, 4, 1)];
        relocate(&mut tasks, 3, BucketKey::in_group(7), None);
        assert_eq!(find_task(&tasks, 3).unwrap().order, 0);
    }

    #[test]
    fn test_relocate_at_target_position() {
        let mut tasks = vec![
            task_with(1, None, Some(7), 0, 1),
            task_with(2, None, Some(7), 1, 1),
            task_with(3, None, None, 0, 1),
        ];
        relocate(&mut tasks, 3, BucketKey::in_group(7), Some(2));
        assert_eq!(
            bucket_orders(&tasks, None, Some(7)),
            vec![(1, 0), (3, 1), (2, 2)]
        );
    }

    #[test]
    fn test_relocate_under_parent_recomputes_levels() {
        let mut tasks = vec![
            task_with(1, None, None, 0, 1),
            task_with(2, None, None, 1, 1),
            task_with(3, Some(2), None, 0, 2),
        ];
        // Move 2 (with child 3) under 1.
        let changed = relocate(&mut tasks, 2, BucketKey::under_parent(1), None);
        assert_eq!(find_task(&tasks, 2).unwrap().parent_id, Some(1));
        assert_eq!(find_task(&tasks, 2).unwrap().level, 2);
        assert_eq!(find_task(&tasks, 3).unwrap().level, 3);
        assert!(changed.contains(&2) && changed.contains(&3));
    }

    #[test]
    fn test_relocate_renumbers_vacated_bucket() {
        let mut tasks = vec![
            task_with(1, None, None, 0, 1),
            task_with(2, None, None, 1, 1),
            task_with(3, None, None, 2, 1),
        ];
        relocate(&mut tasks, 1, BucketKey::in_group(7), None);
        assert_eq!(bucket_orders(&tasks, None, None), vec![(2, 0), (3, 1)]);
    }

    #[test]
    fn test_relocate_out_of_group_to_top_level() {
        let mut tasks = vec![
            task_with(1, None, Some(7), 0, 1),
            task_with(2, None, None, 0, 1),
        ];
        relocate(&mut tasks, 1, BucketKey::TOP_LEVEL, None);
        assert_eq!(bucket_orders(&tasks, None, None), vec![(2, 0), (1, 1)]);
        assert_eq!(find_task(&tasks, 1).unwrap().group_id, None);
    }

    #[test]
    fn test_relocate_same_bucket_with_target_reorders() {
        let mut tasks = three_roots();
        relocate(&mut tasks, 1, BucketKey::TOP_LEVEL, Some(3));
        assert_eq!(bucket_orders(&tasks, None, None), vec![(2, 0), (3, 1), (1, 2)]);
    }

    #[test]
    fn test_relocate_same_bucket_without_target_moves_to_end() {
        let mut tasks = three_roots();
        relocate(&mut tasks, 2, BucketKey::TOP_LEVEL, None);
        assert_eq!(bucket_orders(&tasks, None, None), vec![(1, 0), (3, 1), (2, 2)]);
    }

    #[test]
    fn test_relocate_unknown_source_is_noop() {
        let mut tasks = three_roots();
        let before = tasks.clone();
        assert!(relocate(&mut tasks, 99, BucketKey::in_group(7), None).is_empty());
        assert_eq!(tasks, before);
    }
}
