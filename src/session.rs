use std::path::{Path, PathBuf};

use tracing::info;

use crate::aggregate::{aggregate, AggregateResult};
use crate::error::{Result, SpendError};
use crate::loader::{load, read_file, SkipStats};
use crate::models::Selection;
use crate::selection::{select_view, SelectionView};

/// The loaded dataset plus the current selection.
///
/// The raw file text is kept so `reset` can rebuild the aggregate without
/// reading the file again.
#[derive(Debug, Clone)]
pub struct Session {
    raw: String,
    source: Option<PathBuf>,
    headers: Vec<String>,
    result: AggregateResult,
    skipped: SkipStats,
    selection: Selection,
}

impl Session {
    pub fn open(path: &Path) -> Result<Self> {
        let raw = read_file(path)?;
        Self::from_text(raw, Some(path.to_path_buf()))
    }

    pub fn from_text(raw: String, source: Option<PathBuf>) -> Result<Self> {
        let (headers, result, skipped) = analyze(&raw)?;
        Ok(Self {
            raw,
            source,
            headers,
            result,
            skipped,
            selection: Selection::All,
        })
    }

    pub fn result(&self) -> &AggregateResult {
        &self.result
    }

    /// Header row of the loaded file, in file order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn skipped(&self) -> SkipStats {
        self.skipped
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Change the selection. An unknown category leaves the current one in place.
    pub fn select(&mut self, selection: Selection) -> Result<()> {
        if let Selection::Category(name) = &selection {
            if !self.result.contains(name) {
                return Err(SpendError::UnknownCategory(name.clone()));
            }
        }
        self.selection = selection;
        Ok(())
    }

    pub fn view(&self) -> Result<SelectionView> {
        select_view(&self.result, &self.selection)
    }

    /// Rebuild the aggregate from the retained text and go back to all categories.
    pub fn reset(&mut self) -> Result<()> {
        let (headers, result, skipped) = analyze(&self.raw)?;
        self.headers = headers;
        self.result = result;
        self.skipped = skipped;
        self.selection = Selection::All;
        info!("session reset");
        Ok(())
    }
}

fn analyze(raw: &str) -> Result<(Vec<String>, AggregateResult, SkipStats)> {
    let loaded = load(raw)?;
    let result = aggregate(&loaded.records);
    if result.is_empty() {
        return Err(SpendError::EmptyInput);
    }
    Ok((loaded.headers, result, loaded.skipped))
}
