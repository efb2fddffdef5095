use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::currency::{Currency, CurrencyConverter};
use crate::errors::{LedgerError, Result};

/// Label used whenever a category is left blank.
pub const DEFAULT_CATEGORY: &str = "Uncategorized";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(LedgerError::InvalidInput(format!(
                "unknown transaction type `{}` (expected income or expense)",
                other
            ))),
        }
    }
}

/// A recorded income or expense. Amounts are normalized to the base currency
/// at entry time; later rate changes never touch `amount_base`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    id: u64,
    date: NaiveDate,
    #[serde(alias = "ttype")]
    kind: TransactionKind,
    category: String,
    #[serde(default)]
    description: String,
    amount_base: f64,
    #[serde(alias = "currency", default)]
    entry_currency: Currency,
    #[serde(alias = "amount_orig")]
    amount_entered: f64,
}

impl Transaction {
    pub(crate) fn create(
        id: u64,
        date: NaiveDate,
        draft: NewTransaction,
        converter: &CurrencyConverter,
    ) -> Result<Self> {
        draft.validate()?;
        Ok(Self {
            id,
            date,
            kind: draft.kind,
            category: normalize_category(&draft.category),
            description: draft.description.trim().to_string(),
            amount_base: converter.to_base_rounded(draft.amount, draft.currency),
            entry_currency: draft.currency,
            amount_entered: draft.amount,
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount_base(&self) -> f64 {
        self.amount_base
    }

    pub fn entry_currency(&self) -> Currency {
        self.entry_currency
    }

    pub fn amount_entered(&self) -> f64 {
        self.amount_entered
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    /// Applies `patch` in place. Every field is validated before anything
    /// changes; an unparsable date is the one value skipped rather than
    /// rejected. Returns `false` when the date was skipped.
    pub(crate) fn apply(
        &mut self,
        patch: &TransactionPatch,
        converter: &CurrencyConverter,
    ) -> Result<bool> {
        if let Some(amount) = patch.amount {
            validate_amount(amount)?;
        }
        let parsed_date = patch.date.as_deref().map(parse_iso_date);

        let mut date_applied = true;
        match parsed_date {
            Some(Ok(date)) => self.date = date,
            Some(Err(_)) => date_applied = false,
            None => {}
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(category) = patch.category.as_deref() {
            self.category = normalize_category(category);
        }
        if let Some(description) = patch.description.as_deref() {
            self.description = description.trim().to_string();
        }
        if patch.touches_amount() {
            if let Some(amount) = patch.amount {
                self.amount_entered = amount;
            }
            if let Some(currency) = patch.currency {
                self.entry_currency = currency;
            }
            self.amount_base = converter.to_base_rounded(self.amount_entered, self.entry_currency);
        }
        Ok(date_applied)
    }
}

/// Fields for a transaction about to be added.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub kind: TransactionKind,
    pub category: String,
    pub description: String,
    pub amount: f64,
    pub currency: Currency,
}

impl NewTransaction {
    pub fn new(
        kind: TransactionKind,
        category: impl Into<String>,
        description: impl Into<String>,
        amount: f64,
        currency: Currency,
    ) -> Self {
        Self {
            kind,
            category: category.into(),
            description: description.into(),
            amount,
            currency,
        }
    }

    pub fn income(category: impl Into<String>, amount: f64, currency: Currency) -> Self {
        Self::new(TransactionKind::Income, category, "", amount, currency)
    }

    pub fn expense(category: impl Into<String>, amount: f64, currency: Currency) -> Self {
        Self::new(TransactionKind::Expense, category, "", amount, currency)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_amount(self.amount)
    }
}

/// Partial update for [`Transaction`]. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionPatch {
    pub date: Option<String>,
    pub kind: Option<TransactionKind>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub currency: Option<Currency>,
}

impl TransactionPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn touches_amount(&self) -> bool {
        self.amount.is_some() || self.currency.is_some()
    }
}

pub fn normalize_category(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        DEFAULT_CATEGORY.to_string()
    } else {
        trimmed.to_string()
    }
}

pub fn parse_iso_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| {
        LedgerError::InvalidInput(format!("invalid date `{}` (use YYYY-MM-DD)", input))
    })
}

fn validate_amount(amount: f64) -> Result<()> {
    if amount.is_finite() {
        Ok(())
    } else {
        Err(LedgerError::InvalidAmount(amount.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn converter(rate: f64) -> CurrencyConverter {
        CurrencyConverter::new(Currency::Usd, Currency::Usd, rate).unwrap()
    }

    fn sample(rate: f64) -> Transaction {
        let draft = NewTransaction::expense("Food", 580.0, Currency::Php).with_description("Lunch");
        Transaction::create(
            7,
            NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            draft,
            &converter(rate),
        )
        .unwrap()
    }

    #[test]
    fn create_normalizes_amount_and_category() {
        let txn = Transaction::create(
            1,
            NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            NewTransaction::income("   ", 100.0, Currency::Php),
            &converter(3.0),
        )
        .unwrap();
        assert_eq!(txn.category(), DEFAULT_CATEGORY);
        assert_eq!(txn.amount_base(), 33.33);
        assert_eq!(txn.amount_entered(), 100.0);
    }

    #[test]
    fn create_rejects_non_finite_amount() {
        let err = Transaction::create(
            1,
            NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            NewTransaction::income("Pay", f64::NAN, Currency::Usd),
            &converter(58.0),
        )
        .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount(_)));
    }

    #[test]
    fn patch_recomputes_base_on_currency_change() {
        let mut txn = sample(58.0);
        assert_eq!(txn.amount_base(), 10.0);
        let patch = TransactionPatch {
            currency: Some(Currency::Usd),
            ..TransactionPatch::default()
        };
        txn.apply(&patch, &converter(58.0)).unwrap();
        assert_eq!(txn.amount_base(), 580.0);
        assert_eq!(txn.entry_currency(), Currency::Usd);
    }

    #[test]
    fn patch_without_amount_keeps_historical_base() {
        let mut txn = sample(58.0);
        let patch = TransactionPatch {
            description: Some("Dinner".into()),
            ..TransactionPatch::default()
        };
        txn.apply(&patch, &converter(40.0)).unwrap();
        assert_eq!(txn.amount_base(), 10.0);
        assert_eq!(txn.description(), "Dinner");
    }

    #[test]
    fn bad_date_is_skipped_but_other_fields_apply() {
        let mut txn = sample(58.0);
        let patch = TransactionPatch {
            date: Some("31/12/2026".into()),
            category: Some("Dining".into()),
            ..TransactionPatch::default()
        };
        let applied = txn.apply(&patch, &converter(58.0)).unwrap();
        assert!(!applied);
        assert_eq!(txn.date(), NaiveDate::from_ymd_opt(2026, 10, 1).unwrap());
        assert_eq!(txn.category(), "Dining");
    }

    #[test]
    fn invalid_amount_leaves_transaction_untouched() {
        let mut txn = sample(58.0);
        let before = txn.clone();
        let patch = TransactionPatch {
            category: Some("Other".into()),
            amount: Some(f64::INFINITY),
            ..TransactionPatch::default()
        };
        assert!(txn.apply(&patch, &converter(58.0)).is_err());
        assert_eq!(txn, before);
    }

    #[test]
    fn deserializes_legacy_field_names() {
        let raw = r#"{
            "id": 3, "date": "2025-02-01", "ttype": "expense", "category": "Food",
            "description": "Snacks", "amount_base": 1.5, "currency": "PHP", "amount_orig": 87.0
        }"#;
        let txn: Transaction = serde_json::from_str(raw).unwrap();
        assert_eq!(txn.kind(), TransactionKind::Expense);
        assert_eq!(txn.entry_currency(), Currency::Php);
        assert_eq!(txn.amount_entered(), 87.0);
    }

    #[test]
    fn kind_parses_case_insensitively() {
        assert_eq!("Income".parse::<TransactionKind>().unwrap(), TransactionKind::Income);
        assert!("transfer".parse::<TransactionKind>().is_err());
    }
}
