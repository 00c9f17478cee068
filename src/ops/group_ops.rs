use crate::model::config::GroupDeletePolicy;
use crate::model::group::Group;
use crate::model::task::Task;

use super::reorder::{bucket_len, BucketKey};
use super::task_ops::remove_subtree;

/// Find a group by id.
pub fn find_group(groups: &[Group], id: i64) -> Option<&Group> {
    groups.iter().find(|g| g.id == id)
}

/// Find a group by id, mutable.
pub fn find_group_mut(groups: &mut [Group], id: i64) -> Option<&mut Group> {
    groups.iter_mut().find(|g| g.id == id)
}

/// The order for a newly appended group.
pub fn next_group_order(groups: &[Group]) -> i64 {
    groups.iter().map(|g| g.order + 1).max().unwrap_or(0)
}

/// Replace a group's name in place. Returns false if the id is unknown.
pub fn rename(groups: &mut [Group], id: i64, name: &str) -> bool {
    match find_group_mut(groups, id) {
        Some(group) => {
            group.name = name.to_string();
            true
        }
        None => false,
    }
}

/// Rewrite a group id everywhere it appears: the group itself and the
/// `group_id` of its member tasks.
pub fn rename_group_id(groups: &mut [Group], tasks: &mut [Task], old_id: i64, new_id: i64) {
    if let Some(group) = find_group_mut(groups, old_id) {
        group.id = new_id;
    }
    for task in tasks.iter_mut() {
        if task.group_id == Some(old_id) {
            task.group_id = Some(new_id);
        }
    }
}

/// Re-assign contiguous zero-based orders over the group list, preserving
/// relative order, and sort the list to match.
pub fn renumber_groups(groups: &mut Vec<Group>) {
    groups.sort_by_key(|g| g.order);
    for (index, group) in groups.iter_mut().enumerate() {
        group.order = index as i64;
    }
}

/// Remove a group, applying the configured policy to its member tasks.
///
/// `Cascade` removes every member task together with its full subtree.
/// `Detach` keeps the tasks, clears their group reference, and appends them
/// (in their previous relative order) behind the existing top-level tasks.
/// Returns the removed group, or `None` if the id is unknown.
pub fn delete_group(
    groups: &mut Vec<Group>,
    tasks: &mut Vec<Task>,
    id: i64,
    policy: GroupDeletePolicy,
) -> Option<Group> {
    let index = groups.iter().position(|g| g.id == id)?;

    let member_ids: Vec<i64> = {
        let mut members: Vec<(i64, i64)> = tasks
            .iter()
            .filter(|t| t.group_id == Some(id))
            .map(|t| (t.order, t.id))
            .collect();
        members.sort_by_key(|(order, _)| *order);
        members.into_iter().map(|(_, tid)| tid).collect()
    };

    match policy {
        GroupDeletePolicy::Cascade => {
            for member in member_ids {
                remove_subtree(tasks, member);
            }
        }
        GroupDeletePolicy::Detach => {
            let base = bucket_len(tasks, BucketKey::TOP_LEVEL) as i64;
            for (offset, member) in member_ids.into_iter().enumerate() {
                if let Some(task) = tasks.iter_mut().find(|t| t.id == member) {
                    task.group_id = None;
                    task.order = base + offset as i64;
                }
            }
        }
    }

    let removed = groups.remove(index);
    renumber_groups(groups);
    Some(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::test_support::{bucket_orders, task_with};

    fn sample() -> (Vec<Group>, Vec<Task>) {
        let groups = vec![Group::new(7, "Home".into()), {
            let mut g = Group::new(8, "Work".into());
            g.order = 1;
            g
        }];
        let tasks = vec![
            task_with(1, None, Some(7), 0, 1),
            task_with(2, Some(1), None, 0, 2),
            task_with(3, None, Some(7), 1, 1),
            task_with(4, None, Some(8), 0, 1),
            task_with(5, None, None, 0, 1),
        ];
        (groups, tasks)
    }

    #[test]
    fn test_next_group_order() {
        let (groups, _) = sample();
        assert_eq!(next_group_order(&groups), 2);
        assert_eq!(next_group_order(&[]), 0);
    }

    #[test]
    fn test_rename_group() {
        let (mut groups, _) = sample();
        assert!(rename(&mut groups, 7, "House"));
        assert_eq!(find_group(&groups, 7).unwrap().name, "House");
        assert!(!rename(&mut groups, 99, "Ghost"));
    }

    #[test]
    fn test_delete_group_cascade_removes_subtrees() {
        let (mut groups, mut tasks) = sample();
        let removed = delete_group(&mut groups, &mut tasks, 7, GroupDeletePolicy::Cascade);
        assert_eq!(removed.map(|g| g.name), Some("Home".into()));
        // 1 and 3 were members; 2 was 1's subtask and goes with it.
        let ids: Vec<i64> = tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![4, 5]);
        // The surviving group is renumbered down.
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].order, 0);
    }

    #[test]
    fn test_delete_group_detach_keeps_tasks() {
        let (mut groups, mut tasks) = sample();
        delete_group(&mut groups, &mut tasks, 7, GroupDeletePolicy::Detach);
        assert_eq!(tasks.len(), 5);
        // 1 and 3 joined the top-level bucket behind 5, keeping their order.
        assert_eq!(
            bucket_orders(&tasks, None, None),
            vec![(5, 0), (1, 1), (3, 2)]
        );
        // The subtask of 1 is untouched.
        let sub = tasks.iter().find(|t| t.id == 2).unwrap();
        assert_eq!(sub.parent_id, Some(1));
        assert_eq!(sub.group_id, None);
    }

    #[test]
    fn test_delete_unknown_group() {
        let (mut groups, mut tasks) = sample();
        assert!(delete_group(&mut groups, &mut tasks, 99, GroupDeletePolicy::Cascade).is_none());
        assert_eq!(groups.len(), 2);
        assert_eq!(tasks.len(), 5);
    }

    #[test]
    fn test_rename_group_id_rewrites_members() {
        let (mut groups, mut tasks) = sample();
        rename_group_id(&mut groups, &mut tasks, 7, 700);
        assert!(find_group(&groups, 700).is_some());
        assert_eq!(tasks[0].group_id, Some(700));
        assert_eq!(tasks[2].group_id, Some(700));
        assert_eq!(tasks[3].group_id, Some(8));
    }
}
