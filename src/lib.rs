pub mod error;
pub mod config;
pub mod core;
pub mod cli;

// Re-exports for convenience
pub use error::{SwitchError, Result};
pub use config::SwitchConfig;
pub use crate::core::{LockManager, LockOptions, SnapshotStore};
