use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{Result, SpendError};
use crate::models::{Record, COL_AMOUNT, COL_CATEGORY, COL_DATE, COL_DESCRIPTION};

// ---------------------------------------------------------------------------
// Loaded dataset
// ---------------------------------------------------------------------------

/// Rows dropped during a load. Neither kind aborts the load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipStats {
    /// Every field blank.
    pub blank: usize,
    /// Field count differs from the header's.
    pub malformed: usize,
}

impl SkipStats {
    pub fn total(&self) -> usize {
        self.blank + self.malformed
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedCsv {
    pub headers: Vec<String>,
    pub records: Vec<Record>,
    pub skipped: SkipStats,
}

// ---------------------------------------------------------------------------
// Header resolution
// ---------------------------------------------------------------------------

struct ColumnIndex {
    date: usize,
    description: Option<usize>,
    amount: usize,
    category: usize,
}

impl ColumnIndex {
    fn resolve(headers: &[String]) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h == name);
        let require =
            |name: &str| find(name).ok_or_else(|| SpendError::MissingColumn(name.to_string()));
        Ok(Self {
            date: require(COL_DATE)?,
            description: find(COL_DESCRIPTION),
            amount: require(COL_AMOUNT)?,
            category: require(COL_CATEGORY)?,
        })
    }

    fn is_known(&self, idx: usize) -> bool {
        idx == self.date
            || idx == self.amount
            || idx == self.category
            || Some(idx) == self.description
    }

    /// `fields` must already be known to have the header's length.
    fn build(&self, headers: &[String], fields: &[&str]) -> Record {
        let value = |idx: usize| fields[idx].trim().to_string();
        let description = self
            .description
            .map(value)
            .filter(|d| !d.is_empty());
        let extra: BTreeMap<String, String> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| !self.is_known(*i))
            .map(|(i, h)| (h.clone(), value(i)))
            .collect();
        Record {
            date: value(self.date),
            description,
            amount: value(self.amount),
            category: value(self.category),
            extra,
        }
    }
}

// ---------------------------------------------------------------------------
// load
// ---------------------------------------------------------------------------

/// Parse raw CSV text into records.
///
/// Fields are split on plain commas: quoting and escaping are not supported,
/// so a quoted field containing a comma produces a ragged row that gets
/// skipped. Blank and ragged rows are counted in [`SkipStats`] and logged;
/// only a missing header/data section or a missing required column fails.
pub fn load(raw: &str) -> Result<LoadedCsv> {
    let lines: Vec<&str> = raw.trim().lines().collect();
    if lines.len() < 2 {
        return Err(SpendError::EmptyInput);
    }

    let headers: Vec<String> = lines[0].split(',').map(|h| h.trim().to_string()).collect();
    let columns = ColumnIndex::resolve(&headers)?;

    let mut records = Vec::with_capacity(lines.len() - 1);
    let mut skipped = SkipStats::default();

    for (i, line) in lines.iter().enumerate().skip(1) {
        let line_no = i + 1;
        let fields: Vec<&str> = line.split(',').collect();

        if fields.iter().all(|f| f.trim().is_empty()) {
            debug!(line = line_no, "skipping empty row");
            skipped.blank += 1;
            continue;
        }

        if fields.len() != headers.len() {
            warn!(
                line = line_no,
                found = fields.len(),
                expected = headers.len(),
                row = %line,
                "skipping row with wrong field count"
            );
            skipped.malformed += 1;
            continue;
        }

        records.push(columns.build(&headers, &fields));
    }

    info!(
        accepted = records.len(),
        data_rows = lines.len() - 1,
        skipped = skipped.total(),
        "parsed CSV"
    );

    Ok(LoadedCsv {
        headers,
        records,
        skipped,
    })
}

/// Read a file fully into memory. Any failure is surfaced as-is.
pub fn read_file(path: &Path) -> Result<String> {
    if !path
        .extension()
        .map_or(false, |e| e.eq_ignore_ascii_case("csv"))
    {
        warn!(path = %path.display(), "file does not have a .csv extension");
    }
    Ok(std::fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Date,Description,Amount,Category";

    fn csv(rows: &[&str]) -> String {
        let mut s = format!("{HEADER}\n");
        for r in rows {
            s.push_str(r);
            s.push('\n');
        }
        s
    }

    #[test]
    fn test_load_basic_rows_in_order() {
        let data = load(&csv(&[
            "2024-01-01,Coffee,4.50,Food",
            "2024-01-02,Bus,2.00,Transit",
        ]))
        .unwrap();
        assert_eq!(data.headers, vec!["Date", "Description", "Amount", "Category"]);
        assert_eq!(data.records.len(), 2);
        assert_eq!(data.records[0].description.as_deref(), Some("Coffee"));
        assert_eq!(data.records[1].category, "Transit");
        assert_eq!(data.skipped, SkipStats::default());
    }

    #[test]
    fn test_load_trims_fields_and_handles_crlf() {
        let data = load("Date , Description,Amount ,Category\r\n 2024-01-01 , Tea ,  3.00 ,Food \r\n").unwrap();
        let r = &data.records[0];
        assert_eq!(r.date, "2024-01-01");
        assert_eq!(r.description.as_deref(), Some("Tea"));
        assert_eq!(r.amount, "3.00");
        assert_eq!(r.category, "Food");
    }

    #[test]
    fn test_load_requires_header_and_data() {
        assert!(matches!(load(""), Err(SpendError::EmptyInput)));
        assert!(matches!(load("\n\n"), Err(SpendError::EmptyInput)));
        assert!(matches!(load(&format!("{HEADER}\n")), Err(SpendError::EmptyInput)));
    }

    #[test]
    fn test_load_missing_required_column() {
        let err = load("Date,Description,Amount\n2024-01-01,x,1.00\n").unwrap_err();
        assert!(matches!(err, SpendError::MissingColumn(c) if c == "Category"));
    }

    #[test]
    fn test_load_without_description_column() {
        let data = load("Date,Amount,Category\n2024-01-01,1.00,Food\n").unwrap();
        assert_eq!(data.records[0].description, None);
    }

    #[test]
    fn test_blank_description_becomes_none() {
        let data = load(&csv(&["2024-01-01,,1.00,Food"])).unwrap();
        assert_eq!(data.records[0].description, None);
    }

    #[test]
    fn test_extra_columns_are_kept() {
        let data = load("Date,Account,Description,Amount,Category\n2024-01-01,Visa,Tea,3.00,Food\n")
            .unwrap();
        let r = &data.records[0];
        assert_eq!(r.extra.get("Account").map(String::as_str), Some("Visa"));
        assert_eq!(r.extra.len(), 1);
    }

    #[test]
    fn test_ragged_row_same_as_removed() {
        let with = load(&csv(&[
            "2024-01-01,Coffee,4.50,Food",
            "2024-01-02,Bus,2.00",
            "2024-01-03,Lunch,9.00,Food,extra",
            "2024-01-04,Train,3.00,Transit",
        ]))
        .unwrap();
        let without = load(&csv(&[
            "2024-01-01,Coffee,4.50,Food",
            "2024-01-04,Train,3.00,Transit",
        ]))
        .unwrap();
        assert_eq!(with.records, without.records);
        assert_eq!(with.skipped.malformed, 2);
    }

    #[test]
    fn test_blank_row_same_as_removed() {
        let with = load(&csv(&[
            "2024-01-01,Coffee,4.50,Food",
            " , , , ",
            "",
            "2024-01-04,Train,3.00,Transit",
        ]))
        .unwrap();
        let without = load(&csv(&[
            "2024-01-01,Coffee,4.50,Food",
            "2024-01-04,Train,3.00,Transit",
        ]))
        .unwrap();
        assert_eq!(with.records, without.records);
        assert_eq!(with.skipped.blank, 2);
        assert_eq!(with.skipped.malformed, 0);
    }

    #[test]
    fn test_quoted_comma_is_a_ragged_row() {
        let data = load(&csv(&[
            "2024-01-01,\"Coffee, large\",4.50,Food",
            "2024-01-02,Bus,2.00,Transit",
        ]))
        .unwrap();
        assert_eq!(data.records.len(), 1);
        assert_eq!(data.skipped.malformed, 1);
    }

    #[test]
    fn test_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tx.csv");
        std::fs::write(&path, csv(&["2024-01-01,Coffee,4.50,Food"])).unwrap();
        let raw = read_file(&path).unwrap();
        assert!(raw.starts_with(HEADER));
        assert!(matches!(
            read_file(&dir.path().join("missing.csv")),
            Err(SpendError::Io(_))
        ));
    }
}
