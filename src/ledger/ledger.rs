use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::currency::CurrencyConverter;

use super::{template::Template, transaction::Transaction};

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

/// The persisted ledger document: transactions, the id counter, category
/// budgets (base currency), settings, and templates.
///
/// Callers read through accessors; every mutation goes through
/// [`crate::core::ledger_store::LedgerStore`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ledger {
    #[serde(default)]
    transactions: Vec<Transaction>,
    #[serde(default = "Ledger::first_id")]
    next_id: u64,
    #[serde(default)]
    budgets: BTreeMap<String, f64>,
    #[serde(default)]
    settings: Settings,
    #[serde(default)]
    templates: Vec<Template>,
    #[serde(default = "Ledger::schema_version_default")]
    schema_version: u8,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            transactions: Vec::new(),
            next_id: Self::first_id(),
            budgets: BTreeMap::new(),
            settings: Settings::default(),
            templates: Vec::new(),
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn transaction(&self, id: u64) -> Option<&Transaction> {
        self.transactions.iter().find(|txn| txn.id() == id)
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub fn budgets(&self) -> &BTreeMap<String, f64> {
        &self.budgets
    }

    pub fn budget(&self, category: &str) -> Option<f64> {
        self.budgets.get(category).copied()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn converter(&self) -> CurrencyConverter {
        self.settings.converter()
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn schema_version(&self) -> u8 {
        self.schema_version
    }

    pub(crate) fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub(crate) fn push_transaction(&mut self, transaction: Transaction) {
        self.transactions.push(transaction);
    }

    pub(crate) fn transaction_mut(&mut self, id: u64) -> Option<&mut Transaction> {
        self.transactions.iter_mut().find(|txn| txn.id() == id)
    }

    pub(crate) fn remove_transaction(&mut self, id: u64) -> Option<Transaction> {
        let idx = self.transactions.iter().position(|txn| txn.id() == id)?;
        Some(self.transactions.remove(idx))
    }

    pub(crate) fn set_budget(&mut self, category: String, amount_base: f64) {
        self.budgets.insert(category, amount_base);
    }

    pub(crate) fn remove_budget(&mut self, category: &str) -> Option<f64> {
        self.budgets.remove(category)
    }

    pub(crate) fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub(crate) fn push_template(&mut self, template: Template) {
        self.templates.push(template);
    }

    pub(crate) fn remove_template(&mut self, index: usize) -> Option<Template> {
        if index < self.templates.len() {
            Some(self.templates.remove(index))
        } else {
            None
        }
    }

    /// Repairs a freshly loaded document so its invariants hold: the id
    /// counter stays ahead of every stored id and settings are usable.
    /// Returns one warning per repair.
    pub(crate) fn normalize(&mut self) -> Vec<String> {
        let mut warnings = self.settings.sanitize();
        let max_id = self.transactions.iter().map(Transaction::id).max().unwrap_or(0);
        if self.next_id <= max_id {
            warnings.push(format!(
                "next_id {} is not above stored id {}; advancing counter",
                self.next_id, max_id
            ));
            self.next_id = max_id + 1;
        }
        if self.next_id == 0 {
            self.next_id = Self::first_id();
        }
        let mut seen = HashSet::new();
        for txn in &self.transactions {
            if !seen.insert(txn.id()) {
                warnings.push(format!("duplicate transaction id {}", txn.id()));
            }
        }
        warnings
    }

    fn first_id() -> u64 {
        1
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_loads_with_defaults() {
        let ledger: Ledger = serde_json::from_str("{}").unwrap();
        assert_eq!(ledger, Ledger::new());
        assert_eq!(ledger.next_id(), 1);
        assert_eq!(ledger.settings().rate, 58.0);
    }

    #[test]
    fn normalize_advances_stale_counter() {
        let raw = r#"{
            "transactions": [
                {"id": 4, "date": "2026-01-02", "kind": "income", "category": "Pay",
                 "description": "", "amount_base": 10.0, "entry_currency": "USD", "amount_entered": 10.0}
            ],
            "next_id": 2
        }"#;
        let mut ledger: Ledger = serde_json::from_str(raw).unwrap();
        let warnings = ledger.normalize();
        assert_eq!(ledger.next_id(), 5);
        assert_eq!(warnings.len(), 1);
        assert_eq!(ledger.allocate_id(), 5);
        assert_eq!(ledger.next_id(), 6);
    }

    #[test]
    fn remove_template_out_of_range_is_none() {
        let mut ledger = Ledger::new();
        assert!(ledger.remove_template(0).is_none());
    }
}
