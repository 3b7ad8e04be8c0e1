pub mod lock;
pub mod store;
pub mod validate;

pub use lock::{LockGuard, LockManager, LockOptions, ensure_initialized};
pub use store::{BatchReport, Snapshot, SnapshotStore, TAG};
pub use validate::{DeleteTarget, Target};
