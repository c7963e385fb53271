pub mod config;
pub mod summary;
pub mod view;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};

use crate::error::{Result, SpendError};
use crate::models::Selection;
use crate::session::Session;
use crate::settings::{load_settings, remember_file, shellexpand_path};

#[derive(Parser)]
#[command(name = "spendview", about = "See where the money went: spending by category from a transaction CSV.")]
pub struct Cli {
    /// Log level: error, warn, info, debug, trace (overrides RUST_LOG and settings)
    #[arg(long = "log-level", global = true, value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open the interactive category chart and transaction table.
    View {
        /// CSV file with Date, Description, Amount and Category columns
        /// (default: the last file opened)
        file: Option<String>,
        /// Start with this category selected
        #[arg(long)]
        category: Option<String>,
    },
    /// Print category totals and the transaction table.
    Summary {
        /// CSV file (default: the last file opened)
        file: Option<String>,
        /// Only list transactions for this category
        #[arg(long)]
        category: Option<String>,
        /// Output format. `csv` keeps every source column but re-prints
        /// amounts with two decimals (4.5 becomes 4.50)
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Show or change settings.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the current settings.
    Show,
    /// Change a setting: log_level, label_threshold_pct, last_file.
    Set { key: String, value: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Csv,
}

/// The file argument, or the remembered last file.
pub(crate) fn resolve_file(file: Option<String>) -> Result<PathBuf> {
    match file {
        Some(f) => Ok(PathBuf::from(shellexpand_path(&f))),
        None => load_settings()
            .last_file
            .map(PathBuf::from)
            .ok_or(SpendError::NoFile),
    }
}

/// Load the file, apply the starting selection and remember the file.
pub(crate) fn open_session(file: Option<String>, category: Option<&str>) -> Result<Session> {
    let path = resolve_file(file)?;
    info!(path = %path.display(), "opening transactions");
    let mut session = Session::open(&path)?;
    session.select(Selection::from_option(category))?;
    if let Err(e) = remember_file(&path) {
        warn!(error = %e, "could not remember last file");
    }
    Ok(session)
}
