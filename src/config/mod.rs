pub mod settings;

pub use settings::{LockSettings, PathSettings, SwitchConfig, UiSettings};
