use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "npmrc-switch",
    version,
    about = "An utility to make it easier switching between different npm configs",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// The path to your .npmrc file (defaults to ~/.npmrc)
    #[arg(short, long, global = true)]
    pub npmrc: Option<PathBuf>,

    /// The directory where configurations are saved (defaults to ~/.npmrc-switch)
    #[arg(short, long, global = true)]
    pub directory: Option<PathBuf>,

    /// Settings file (defaults to ~/.npmrc-switch.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Save the current configuration to a reference NAME
    Save { name: String },

    /// Load a saved configuration by its reference NAME
    Load { name: String },

    /// Delete a saved configuration by its reference NAME, or every one with `all`
    Delete { name: String },

    /// View a saved configuration, all of them (`all`) or the live one (`current`)
    View { name: String },

    /// Clear the contents of your npm configuration (NOT REVERSIBLE)
    Clear,

    /// Show or initialize the tool settings
    Config {
        #[command(subcommand)]
        cmd: Option<ConfigCmd>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCmd {
    /// Show the resolved settings
    Show,
    /// Write default settings to the settings file
    Init {
        /// Overwrite an existing settings file
        #[arg(short, long)]
        force: bool,
    },
}
