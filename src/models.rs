use std::collections::BTreeMap;

pub const COL_DATE: &str = "Date";
pub const COL_DESCRIPTION: &str = "Description";
pub const COL_AMOUNT: &str = "Amount";
pub const COL_CATEGORY: &str = "Category";

/// One accepted CSV row. The four known columns are lifted into fields;
/// anything else the file carries lands in `extra`.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub date: String,
    pub description: Option<String>,
    pub amount: String,
    pub category: String,
    pub extra: BTreeMap<String, String>,
}

/// A record whose amount parsed to a positive, finite number.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub date: String,
    pub description: Option<String>,
    pub amount: f64,
    pub category: String,
    pub extra: BTreeMap<String, String>,
}

impl Transaction {
    pub fn from_record(record: &Record, amount: f64) -> Self {
        Self {
            date: record.date.clone(),
            description: record.description.clone(),
            amount,
            category: record.category.clone(),
            extra: record.extra.clone(),
        }
    }

    /// Cell text for any column by header name. Amounts come back with two
    /// decimals; a missing description is an empty string.
    pub fn get(&self, column: &str) -> Option<String> {
        match column {
            COL_DATE => Some(self.date.clone()),
            COL_DESCRIPTION => Some(self.description.clone().unwrap_or_default()),
            COL_AMOUNT => Some(format!("{:.2}", self.amount)),
            COL_CATEGORY => Some(self.category.clone()),
            other => self.extra.get(other).cloned(),
        }
    }
}

/// Which slice of the aggregate the detail table shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    Category(String),
}

impl Selection {
    pub fn from_option(category: Option<&str>) -> Self {
        match category {
            Some(name) => Self::Category(name.to_string()),
            None => Self::All,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::All => "All Categories",
            Self::Category(name) => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Transaction {
        let mut extra = BTreeMap::new();
        extra.insert("Account".to_string(), "Visa".to_string());
        let record = Record {
            date: "2024-01-01".into(),
            description: None,
            amount: "4.5".into(),
            category: "Food".into(),
            extra,
        };
        Transaction::from_record(&record, 4.5)
    }

    #[test]
    fn test_transaction_get_known_and_extra_columns() {
        let t = sample();
        assert_eq!(t.get("Date").as_deref(), Some("2024-01-01"));
        assert_eq!(t.get("Amount").as_deref(), Some("4.50"));
        assert_eq!(t.get("Category").as_deref(), Some("Food"));
        assert_eq!(t.get("Description").as_deref(), Some(""));
        assert_eq!(t.get("Account").as_deref(), Some("Visa"));
        assert_eq!(t.get("Memo"), None);
    }

    #[test]
    fn test_selection_label() {
        assert_eq!(Selection::All.label(), "All Categories");
        assert_eq!(Selection::from_option(Some("Food")).label(), "Food");
        assert_eq!(Selection::from_option(None), Selection::All);
    }
}
