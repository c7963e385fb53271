mod aggregate;
mod browser;
mod cli;
mod error;
mod fmt;
mod loader;
mod logging;
mod models;
mod selection;
mod session;
mod settings;
mod tui;

use std::io::IsTerminal;

use clap::Parser;

use cli::{Cli, Commands, ConfigCommands};
use logging::LogTarget;

fn main() {
    let cli = Cli::parse();

    let configured = settings::load_settings().log_level;
    let log_path = settings::log_file_path();
    let target = if matches!(cli.command, Commands::View { .. }) && std::io::stdout().is_terminal() {
        LogTarget::File(&log_path)
    } else {
        LogTarget::Stderr
    };
    if let Err(e) = logging::init(cli.log_level.as_deref(), &configured, target) {
        eprintln!("Warning: logging disabled: {e}");
    }

    let result = match cli.command {
        Commands::View { file, category } => cli::view::run(file, category),
        Commands::Summary {
            file,
            category,
            format,
        } => cli::summary::run(file, category, format),
        Commands::Config { command } => match command {
            ConfigCommands::Show => cli::config::show(),
            ConfigCommands::Set { key, value } => cli::config::set(&key, &value),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
