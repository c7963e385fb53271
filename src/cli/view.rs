use std::io::IsTerminal;

use crate::browser::CategoryBrowser;
use crate::error::Result;
use crate::settings::load_settings;
use crate::tui::run_screen;

use super::{open_session, summary, OutputFormat};

/// Interactive when stdout is a terminal, plain text otherwise.
pub fn run(file: Option<String>, category: Option<String>) -> Result<()> {
    let mut session = open_session(file, category.as_deref())?;
    if !std::io::stdout().is_terminal() {
        println!("{}", summary::render(&session, OutputFormat::Table)?);
        return Ok(());
    }
    let threshold = load_settings().label_threshold_pct;
    let mut browser = CategoryBrowser::new(&mut session, threshold)?;
    run_screen(&mut browser)
}
