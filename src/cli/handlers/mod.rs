pub mod snapshot;
pub mod config;

pub use snapshot::*;
pub use config::*;
