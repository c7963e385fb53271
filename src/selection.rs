use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::aggregate::AggregateResult;
use crate::error::{Result, SpendError};
use crate::fmt::money;
use crate::models::{Selection, Transaction};

/// Everything the detail table needs for one selection.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionView {
    pub label: String,
    pub total: f64,
    pub percentage: f64,
    pub rows: Vec<Transaction>,
}

impl SelectionView {
    pub fn header_label(&self) -> String {
        format!(
            "Transactions for {} - {} ({:.1}%)",
            self.label,
            money(self.total),
            self.percentage
        )
    }
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%m-%d-%Y", "%d %b %Y", "%b %d, %Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m/%d/%Y %H:%M"];

/// Parse a Date cell for ordering. `None` sorts before every real date.
pub fn parse_sort_date(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Newest first. Unparseable dates count as the earliest possible date;
/// the sort is stable so equal dates keep their incoming order.
pub fn sort_by_date_desc(rows: &mut [Transaction]) {
    rows.sort_by_cached_key(|t| std::cmp::Reverse(parse_sort_date(&t.date)));
}

/// Build the detail view for a selection. Pure: `result` is only read.
pub fn select_view(result: &AggregateResult, selection: &Selection) -> Result<SelectionView> {
    let (total, percentage, mut rows) = match selection {
        Selection::All => {
            let rows: Vec<Transaction> = result
                .categories()
                .iter()
                .flat_map(|c| c.transactions.iter().cloned())
                .collect();
            (result.grand_total(), 100.0, rows)
        }
        Selection::Category(name) => {
            let cat = result
                .get(name)
                .ok_or_else(|| SpendError::UnknownCategory(name.clone()))?;
            (
                cat.total,
                result.percentage_of(cat.total),
                cat.transactions.clone(),
            )
        }
    };

    sort_by_date_desc(&mut rows);

    Ok(SelectionView {
        label: selection.label().to_string(),
        total,
        percentage,
        rows,
    })
}
