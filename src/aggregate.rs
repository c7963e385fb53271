use std::collections::HashMap;

use tracing::{info, warn};

use crate::models::{Record, Transaction};

// ---------------------------------------------------------------------------
// Amount parsing
// ---------------------------------------------------------------------------

/// Parse an Amount cell as a plain decimal. Returns `None` for anything that
/// is not a positive, finite number (currency symbols included); those rows
/// are left out of the analysis.
pub fn parse_positive_amount(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|a| a.is_finite() && *a > 0.0)
}

/// Round half away from zero to one decimal place.
pub fn round_pct(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// ---------------------------------------------------------------------------
// Aggregate result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryAggregate {
    pub name: String,
    pub total: f64,
    pub transactions: Vec<Transaction>,
}

/// Per-category totals, kept in first-seen order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AggregateResult {
    categories: Vec<CategoryAggregate>,
    index: HashMap<String, usize>,
    /// Records left out because of their amount.
    pub excluded: usize,
}

/// One chart slice: label and value for the rendering side, sorted by value.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSlice {
    pub label: String,
    pub total: f64,
    pub percentage: f64,
}

impl AggregateResult {
    pub fn categories(&self) -> &[CategoryAggregate] {
        &self.categories
    }

    pub fn get(&self, name: &str) -> Option<&CategoryAggregate> {
        self.index.get(name).map(|&i| &self.categories[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn transaction_count(&self) -> usize {
        self.categories.iter().map(|c| c.transactions.len()).sum()
    }

    pub fn grand_total(&self) -> f64 {
        self.categories.iter().map(|c| c.total).sum()
    }

    /// Category share of the grand total, in percent, rounded to one decimal.
    pub fn percentage_of(&self, total: f64) -> f64 {
        let grand = self.grand_total();
        if grand == 0.0 {
            return 0.0;
        }
        round_pct(total / grand * 100.0)
    }

    /// Labels and totals for the chart, largest first.
    pub fn chart(&self) -> Vec<ChartSlice> {
        let mut slices: Vec<ChartSlice> = self
            .categories
            .iter()
            .map(|c| ChartSlice {
                label: c.name.clone(),
                total: c.total,
                percentage: self.percentage_of(c.total),
            })
            .collect();
        slices.sort_by(|a, b| b.total.total_cmp(&a.total));
        slices
    }

    fn push(&mut self, txn: Transaction) {
        let idx = match self.index.get(&txn.category) {
            Some(&i) => i,
            None => {
                self.categories.push(CategoryAggregate {
                    name: txn.category.clone(),
                    total: 0.0,
                    transactions: Vec::new(),
                });
                let i = self.categories.len() - 1;
                self.index.insert(txn.category.clone(), i);
                i
            }
        };
        let cat = &mut self.categories[idx];
        cat.total += txn.amount;
        cat.transactions.push(txn);
    }
}

// ---------------------------------------------------------------------------
// aggregate
// ---------------------------------------------------------------------------

/// Group records by category and sum their amounts. Records whose amount is
/// unparseable or not positive are excluded, not treated as errors.
pub fn aggregate(records: &[Record]) -> AggregateResult {
    let mut result = AggregateResult::default();

    for record in records {
        let Some(amount) = parse_positive_amount(&record.amount) else {
            warn!(
                date = %record.date,
                amount = %record.amount,
                category = %record.category,
                "excluding transaction with invalid or non-positive amount"
            );
            result.excluded += 1;
            continue;
        };
        result.push(Transaction::from_record(record, amount));
    }

    info!(
        categories = result.categories.len(),
        transactions = result.transaction_count(),
        excluded = result.excluded,
        "aggregated transactions"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load;

    fn agg(csv: &str) -> AggregateResult {
        aggregate(&load(csv).unwrap().records)
    }

    const EXAMPLE: &str = "Date,Description,Amount,Category\n\
        2024-01-01,Coffee,4.50,Food\n\
        2024-01-02,Bus,2.00,Transit\n\
        2024-01-03,Refund,-4.50,Food";

    #[test]
    fn test_parse_positive_amount() {
        assert_eq!(parse_positive_amount("4.50"), Some(4.5));
        assert_eq!(parse_positive_amount(" 12.00 "), Some(12.0));
        assert_eq!(parse_positive_amount("$12.00"), None);
        assert_eq!(parse_positive_amount("4.50abc"), None);
        assert_eq!(parse_positive_amount("-4.50"), None);
        assert_eq!(parse_positive_amount("0"), None);
        assert_eq!(parse_positive_amount("abc"), None);
        assert_eq!(parse_positive_amount(""), None);
        assert_eq!(parse_positive_amount("NaN"), None);
        assert_eq!(parse_positive_amount("inf"), None);
    }

    #[test]
    fn test_round_pct_half_away_from_zero() {
        assert_eq!(round_pct(69.2307), 69.2);
        assert_eq!(round_pct(12.25), 12.3);
        assert_eq!(round_pct(-12.25), -12.3);
        assert_eq!(round_pct(100.0), 100.0);
    }

    #[test]
    fn test_example_excludes_refund() {
        let result = agg(EXAMPLE);
        assert_eq!(result.categories().len(), 2);
        let food = result.get("Food").unwrap();
        assert_eq!(food.total, 4.5);
        assert_eq!(food.transactions.len(), 1);
        assert_eq!(food.transactions[0].description.as_deref(), Some("Coffee"));
        let transit = result.get("Transit").unwrap();
        assert_eq!(transit.total, 2.0);
        assert_eq!(result.grand_total(), 6.5);
        assert_eq!(result.excluded, 1);
    }

    #[test]
    fn test_grand_total_matches_positive_amount_sum() {
        let csv = "Date,Description,Amount,Category\n\
            2024-01-01,A,10.25,Food\n\
            2024-01-02,B,0,Food\n\
            2024-01-03,C,3.10,Rent\n\
            2024-01-04,D,n/a,Rent\n\
            2024-01-05,E,7.65,Fun\n\
            2024-01-06,F,-1.00,Fun\n\
            2024-01-07,G,1.00,Food";
        let records = load(csv).unwrap().records;
        let result = aggregate(&records);
        let expected: f64 = records
            .iter()
            .filter_map(|r| parse_positive_amount(&r.amount))
            .sum();
        let by_category: f64 = result.categories().iter().map(|c| c.total).sum();
        assert!((result.grand_total() - expected).abs() < 1e-9);
        assert!((by_category - result.grand_total()).abs() < 1e-9);
        assert_eq!(result.transaction_count(), 4);
        assert_eq!(result.excluded, 3);
    }

    #[test]
    fn test_currency_symbol_and_trailing_junk_are_excluded() {
        let result = agg(
            "Date,Description,Amount,Category\n\
             2024-01-01,A,$5.00,Food\n\
             2024-01-02,B,4.50abc,Food\n\
             2024-01-03,C,5,Food",
        );
        assert_eq!(result.grand_total(), 5.0);
        assert_eq!(result.excluded, 2);
        assert_eq!(result.get("Food").unwrap().transactions.len(), 1);
    }

    #[test]
    fn test_transactions_keep_input_order_and_category_first_seen_order() {
        let result = agg(
            "Date,Description,Amount,Category\n\
             2024-01-03,Third,1,Food\n\
             2024-01-01,Bus,1,Transit\n\
             2024-01-02,First,1,Food",
        );
        let names: Vec<&str> = result.categories().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Food", "Transit"]);
        let food: Vec<_> = result
            .get("Food")
            .unwrap()
            .transactions
            .iter()
            .map(|t| t.description.clone().unwrap())
            .collect();
        assert_eq!(food, vec!["Third", "First"]);
    }

    #[test]
    fn test_chart_sorted_descending_with_percentages() {
        let result = agg(EXAMPLE);
        let chart = result.chart();
        assert_eq!(chart.len(), 2);
        assert_eq!(chart[0].label, "Food");
        assert_eq!(chart[0].percentage, 69.2);
        assert_eq!(chart[1].label, "Transit");
        assert_eq!(chart[1].percentage, 30.8);
    }

    #[test]
    fn test_empty_records() {
        let result = aggregate(&[]);
        assert!(result.is_empty());
        assert_eq!(result.grand_total(), 0.0);
        assert!(result.chart().is_empty());
    }
}
