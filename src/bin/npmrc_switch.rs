use std::path::PathBuf;
use std::process;

use clap::error::ErrorKind;
use clap::{CommandFactory, FromArgMatches};
use env_logger::{Builder, Env};
use npmrc_switch::cli::{Cli, Commands};
use npmrc_switch::cli::handlers;
use npmrc_switch::cli::ui::{ascii_banner, print_error};
use npmrc_switch::config::SwitchConfig;
use npmrc_switch::core::SnapshotStore;
use npmrc_switch::error::Result;

fn main() {
    let cli = parse_cli();

    init_logging(cli.verbose);

    if cli.no_color {
        std::env::set_var("NO_COLOR", "1");
    }

    if let Err(error) = run_app(cli) {
        print_error(&error);
        process::exit(error.exit_code());
    }
}

fn parse_cli() -> Cli {
    let command = Cli::command().before_help(ascii_banner());
    let parsed = command
        .try_get_matches()
        .and_then(|matches| Cli::from_arg_matches(&matches));

    match parsed {
        Ok(cli) => cli,
        Err(e) => {
            let code = clap_exit_code(e.kind());
            if code == 0 {
                print!("{}", e.render());
            } else {
                let _ = e.print();
            }
            process::exit(code);
        }
    }
}

/// Help and version exit 0, every usage error exits 1
fn clap_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => 0,
        _ => 1,
    }
}

fn run_app(cli: Cli) -> Result<()> {
    let config_path = settings_path(&cli)?;
    let config = SwitchConfig::load(&config_path)?
        .with_overrides(cli.npmrc.clone(), cli.directory.clone());

    if !config.ui.colored {
        std::env::set_var("NO_COLOR", "1");
    }

    let store = || SnapshotStore::from_config(&config);

    match cli.command {
        Commands::Save { name } => handlers::handle_save(&store()?, &name),
        Commands::Load { name } => handlers::handle_load(&store()?, &name),
        Commands::Delete { name } => handlers::handle_delete(&store()?, &name),
        Commands::View { name } => handlers::handle_view(&store()?, &name),
        Commands::Clear => handlers::handle_clear(&store()?),
        Commands::Config { cmd } => handlers::handle_config(&config, &config_path, cmd),
    }
}

fn settings_path(cli: &Cli) -> Result<PathBuf> {
    match &cli.config {
        Some(path) => Ok(path.clone()),
        None => SwitchConfig::default_path(),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    Builder::from_env(Env::default().default_filter_or(default))
        .format_timestamp(None)
        .format_target(false)
        .init();
}
