//! View filtering: date range, kind, category, and free-text search.

use chrono::NaiveDate;

use crate::errors::{LedgerError, Result};
use crate::ledger::{parse_iso_date, Transaction, TransactionKind};

/// Sentinel accepted from UI pickers meaning "no restriction".
pub const ALL: &str = "All";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum KindFilter {
    #[default]
    All,
    Only(TransactionKind),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

/// All predicates are ANDed. Date bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransactionFilter {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub kind: KindFilter,
    pub category: CategoryFilter,
    pub search: Option<String>,
}

impl TransactionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a filter from raw picker values. Blank or `All` means unset.
    pub fn parse(start: &str, end: &str, kind: &str, category: &str, search: &str) -> Result<Self> {
        let date = |raw: &str| -> Result<Option<NaiveDate>> {
            if raw.trim().is_empty() {
                Ok(None)
            } else {
                parse_iso_date(raw).map(Some)
            }
        };
        let filter = Self {
            start: date(start)?,
            end: date(end)?,
            kind: if is_all(kind) {
                KindFilter::All
            } else {
                KindFilter::Only(kind.parse()?)
            },
            category: if is_all(category) {
                CategoryFilter::All
            } else {
                CategoryFilter::Only(category.trim().to_string())
            },
            search: Some(search.trim())
                .filter(|text| !text.is_empty())
                .map(str::to_string),
        };
        if let (Some(start), Some(end)) = (filter.start, filter.end) {
            if start > end {
                return Err(LedgerError::InvalidInput(format!(
                    "start date {} is after end date {}",
                    start, end
                )));
            }
        }
        Ok(filter)
    }

    pub fn from(mut self, start: NaiveDate) -> Self {
        self.start = Some(start);
        self
    }

    pub fn until(mut self, end: NaiveDate) -> Self {
        self.end = Some(end);
        self
    }

    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = KindFilter::Only(kind);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = CategoryFilter::Only(category.into());
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.search = if text.trim().is_empty() {
            None
        } else {
            Some(text)
        };
        self
    }

    pub fn is_unrestricted(&self) -> bool {
        self == &Self::default()
    }

    pub fn matches(&self, txn: &Transaction) -> bool {
        let date = txn.date();
        if self.start.is_some_and(|start| date < start) {
            return false;
        }
        if self.end.is_some_and(|end| date > end) {
            return false;
        }
        if let KindFilter::Only(kind) = self.kind {
            if txn.kind() != kind {
                return false;
            }
        }
        if let CategoryFilter::Only(category) = &self.category {
            if txn.category() != category {
                return false;
            }
        }
        if let Some(needle) = &self.search {
            let needle = needle.to_lowercase();
            let hit = txn.description().to_lowercase().contains(&needle)
                || txn.category().to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }
        true
    }
}

fn is_all(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL)
}

pub struct FilterService;

impl FilterService {
    /// Returns the matching transactions in their original order.
    pub fn apply<'a>(transactions: &'a [Transaction], filter: &TransactionFilter) -> Vec<&'a Transaction> {
        transactions.iter().filter(|txn| filter.matches(txn)).collect()
    }
}
