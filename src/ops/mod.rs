pub mod group_ops;
pub mod guard;
pub mod reorder;
pub mod task_ops;
pub mod tree;

#[cfg(test)]
pub mod test_support;
