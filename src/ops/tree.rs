use std::collections::HashSet;

use indexmap::IndexMap;

use crate::model::task::Task;

// ---------------------------------------------------------------------------
// Flat list ⇄ nested tree
// ---------------------------------------------------------------------------

/// Build the nested tree from the flat list: only root tasks are returned,
/// each with `subtasks` populated recursively, every level sorted ascending
/// by `order`.
///
/// Tasks whose `parent_id` points at a missing task (partially-loaded data)
/// or at themselves are treated as roots rather than dropped or rejected.
pub fn build_tree(flat: &[Task]) -> Vec<Task> {
    let known: HashSet<i64> = flat.iter().map(|t| t.id).collect();

    // Group children under their parent id; `None` holds the roots.
    let mut children: IndexMap<Option<i64>, Vec<Task>> = IndexMap::new();
    for task in flat {
        let mut node = task.clone();
        node.subtasks.clear();
        let slot = match node.parent_id {
            Some(p) if p != node.id && known.contains(&p) => Some(p),
            _ => None,
        };
        children.entry(slot).or_default().push(node);
    }

    let mut roots = children.shift_remove(&None).unwrap_or_default();
    roots.sort_by_key(|t| t.order);
    for root in &mut roots {
        attach_children(root, &mut children);
    }

    // Anything left belongs to a parent chain that never reaches a root
    // (looping data). Surface those subtrees as roots instead of losing them.
    while let Some((_, mut orphans)) = children.shift_remove_index(0) {
        orphans.sort_by_key(|t| t.order);
        for orphan in &mut orphans {
            attach_children(orphan, &mut children);
            roots.push(orphan.clone());
        }
    }

    roots
}

fn attach_children(node: &mut Task, children: &mut IndexMap<Option<i64>, Vec<Task>>) {
    if let Some(mut kids) = children.shift_remove(&Some(node.id)) {
        kids.sort_by_key(|t| t.order);
        for kid in &mut kids {
            attach_children(kid, children);
        }
        node.subtasks = kids;
    }
}

/// Flatten a nested tree depth-first: one flat entry per task, with
/// `subtasks` emptied. Inverse of [`build_tree`].
pub fn flatten_tree(tree: Vec<Task>) -> Vec<Task> {
    let mut flat = Vec::new();
    for mut node in tree {
        let subtasks = std::mem::take(&mut node.subtasks);
        flat.push(node);
        flat.extend(flatten_tree(subtasks));
    }
    flat
}
