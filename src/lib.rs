pub mod board;
pub mod model;
pub mod notify;
pub mod ops;
pub mod store;

pub use board::{Board, BoardError, BoardStats, GroupStats};
pub use model::{BoardConfig, Group, GroupDeletePolicy, Task};
pub use notify::{BoardObserver, GroupChange, GroupChangeKind, TaskCompleted};
pub use ops::guard::{ValidationError, MAX_LEVEL};
pub use ops::reorder::BucketKey;
pub use store::{BoardStore, GroupRecord, MemoryStore, StoreError, TaskRecord};
