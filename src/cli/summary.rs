use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::aggregate::AggregateResult;
use crate::error::{Result, SpendError};
use crate::fmt::{money, or_placeholder, pct};
use crate::selection::SelectionView;
use crate::session::Session;

use super::{open_session, OutputFormat};

pub fn run(file: Option<String>, category: Option<String>, format: OutputFormat) -> Result<()> {
    let session = open_session(file, category.as_deref())?;
    println!("{}", render(&session, format)?.trim_end());
    Ok(())
}

pub fn render(session: &Session, format: OutputFormat) -> Result<String> {
    let view = session.view()?;
    match format {
        OutputFormat::Table => Ok(format!(
            "{}\n\n{}",
            format_chart(session.result()),
            format_transactions(&view)
        )),
        OutputFormat::Csv => format_csv(&view, session.headers()),
    }
}

// ---------------------------------------------------------------------------
// Pure formatting functions
// ---------------------------------------------------------------------------

/// Category totals, largest first, with a grand-total footer.
pub fn format_chart(result: &AggregateResult) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Category", "Total", "Share", "Count"]);
    for slice in result.chart() {
        let count = result
            .get(&slice.label)
            .map(|c| c.transactions.len())
            .unwrap_or(0);
        table.add_row(vec![
            Cell::new(&slice.label),
            Cell::new(money(slice.total)).set_alignment(CellAlignment::Right),
            Cell::new(pct(slice.percentage)).set_alignment(CellAlignment::Right),
            Cell::new(count).set_alignment(CellAlignment::Right),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total".bold()),
        Cell::new(money(result.grand_total()).bold()).set_alignment(CellAlignment::Right),
        Cell::new(""),
        Cell::new(result.transaction_count()).set_alignment(CellAlignment::Right),
    ]);
    format!("{}\n{table}", "Spending by Category".bold())
}

pub fn format_transactions(view: &SelectionView) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Date", "Description", "Amount", "Category"]);
    for txn in &view.rows {
        table.add_row(vec![
            Cell::new(or_placeholder(Some(txn.date.as_str()))),
            Cell::new(or_placeholder(txn.description.as_deref())),
            Cell::new(money(txn.amount)).set_alignment(CellAlignment::Right),
            Cell::new(or_placeholder(Some(txn.category.as_str()))),
        ]);
    }
    format!("{}\n{table}", view.header_label().bold())
}

/// Selection rows as CSV, keeping every column of the source file.
pub fn format_csv(view: &SelectionView, headers: &[String]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(headers)?;
    for txn in &view.rows {
        wtr.write_record(headers.iter().map(|h| txn.get(h).unwrap_or_default()))?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| SpendError::Other(format!("CSV write failed: {e}")))?;
    String::from_utf8(bytes).map_err(|e| SpendError::Other(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Selection;

    fn session() -> Session {
        let raw = "Date,Description,Amount,Category\n\
            2024-01-01,Coffee,4.50,Food\n\
            2024-01-02,Bus,2.00,Transit\n\
            2024-01-03,Refund,-4.50,Food\n\
            2024-01-04,,3.25,Food"
            .to_string();
        Session::from_text(raw, None).unwrap()
    }

    #[test]
    fn test_format_chart_lists_categories_largest_first() {
        colored::control::set_override(false);
        let s = session();
        let out = format_chart(s.result());
        let food = out.find("Food").unwrap();
        let transit = out.find("Transit").unwrap();
        assert!(food < transit);
        assert!(out.contains("$7.75"));
        assert!(out.contains("$9.75"));
    }

    #[test]
    fn test_format_transactions_uses_placeholder_and_header() {
        colored::control::set_override(false);
        let mut s = session();
        s.select(Selection::Category("Food".into())).unwrap();
        let out = format_transactions(&s.view().unwrap());
        assert!(out.starts_with("Transactions for Food - $7.75 (79.5%)"));
        assert!(out.contains("N/A"));
        assert!(out.contains("$3.25"));
    }

    #[test]
    fn test_format_csv_newest_first() {
        let s = session();
        let out = format_csv(&s.view().unwrap(), s.headers()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Date,Description,Amount,Category");
        assert_eq!(lines[1], "2024-01-04,,3.25,Food");
        assert_eq!(lines[2], "2024-01-02,Bus,2.00,Transit");
        assert_eq!(lines[3], "2024-01-01,Coffee,4.50,Food");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_format_csv_keeps_extra_columns() {
        let raw = "Date,Account,Description,Amount,Category\n\
            2024-01-01,Visa,Coffee,4.5,Food"
            .to_string();
        let s = Session::from_text(raw, None).unwrap();
        let out = format_csv(&s.view().unwrap(), s.headers()).unwrap();
        assert_eq!(out, "Date,Account,Description,Amount,Category\n2024-01-01,Visa,Coffee,4.50,Food\n");
    }
}
