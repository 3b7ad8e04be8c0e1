use std::path::Path;

use crate::config::SwitchConfig;
use crate::error::Result;
use crate::cli::ui::{print_info, print_success, print_warning};
use crate::cli::commands::ConfigCmd;

/// Handle settings operations
pub fn handle_config(config: &SwitchConfig, config_path: &Path, cmd: Option<ConfigCmd>) -> Result<()> {
    match cmd {
        Some(ConfigCmd::Show) | None => {
            let mut resolved = config.clone();
            resolved.paths.npmrc = Some(config.npmrc_path()?);
            resolved.paths.directory = Some(config.directory_path()?);

            let state = if config_path.exists() { "" } else { " (not present, using defaults)" };
            print_info(&format!("Settings file: {}{}", config_path.display(), state));
            println!("{}", resolved.to_toml()?);
        }
        Some(ConfigCmd::Init { force }) => {
            if config_path.exists() && !force {
                print_warning(&format!(
                    "{} already exists, use --force to overwrite it",
                    config_path.display()
                ));
                return Ok(());
            }
            SwitchConfig::default().save(config_path)?;
            print_success(&format!("Wrote default settings to {}", config_path.display()));
        }
    }
    Ok(())
}
