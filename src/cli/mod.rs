pub mod commands;
pub mod handlers;
pub mod ui;

pub use commands::{Cli, Commands, ConfigCmd};
pub use ui::{print_error, print_info, print_success, print_warning};
