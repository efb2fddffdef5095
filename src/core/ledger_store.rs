use std::{fs::File, io, path::Path};

use chrono::NaiveDate;
use tracing::{error, info, warn};

use crate::{
    config::{Settings, Theme},
    core::utils::today,
    currency::{validate_rate, Currency, CurrencyConverter},
    errors::{LedgerError, Result},
    ledger::{normalize_category, Ledger, NewTransaction, Template, Transaction, TransactionPatch},
    reminder::ReminderSchedule,
    storage::{
        csv_backend::{self, ExportCapabilities, ExportFormat, ImportAmount, ImportReport, RowError},
        JsonStorage, StorageBackend,
    },
};

/// Owns the in-memory ledger and writes the full document to storage after
/// every mutation.
///
/// A mutation is applied to memory first and persisted second. When the write
/// fails the error is returned but the change stays visible: callers should
/// treat it as "not yet durable" and retry or alert.
pub struct LedgerStore {
    ledger: Ledger,
    storage: Box<dyn StorageBackend>,
    capabilities: ExportCapabilities,
}

impl LedgerStore {
    /// Loads the stored ledger, or starts an empty one with default settings.
    pub fn open(storage: Box<dyn StorageBackend>) -> Result<Self> {
        let ledger = match storage.load() {
            Ok(Some(mut ledger)) => {
                for warning in ledger.normalize() {
                    warn!(target: "budget_ledger::store", "{}", warning);
                }
                info!(
                    location = %storage.describe(),
                    transactions = ledger.transaction_count(),
                    "ledger loaded"
                );
                ledger
            }
            Ok(None) => {
                info!(location = %storage.describe(), "no ledger stored yet; starting empty");
                Ledger::new()
            }
            Err(err) => return Err(persistence_failure(err)),
        };
        Ok(Self {
            ledger,
            storage,
            capabilities: ExportCapabilities::detect(),
        })
    }

    /// Opens the ledger at the default data file.
    pub fn open_default() -> Result<Self> {
        Self::open(Box::new(JsonStorage::new_default()))
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Transactions in insertion order, oldest first.
    pub fn list(&self) -> &[Transaction] {
        self.ledger.transactions()
    }

    /// The newest `limit` transactions, newest first.
    pub fn recent(&self, limit: usize) -> Vec<&Transaction> {
        self.list().iter().rev().take(limit).collect()
    }

    pub fn get(&self, id: u64) -> Option<&Transaction> {
        self.ledger.transaction(id)
    }

    pub fn settings(&self) -> &Settings {
        self.ledger.settings()
    }

    pub fn converter(&self) -> CurrencyConverter {
        self.ledger.converter()
    }

    /// Where the ledger is persisted, for display.
    pub fn location(&self) -> String {
        self.storage.describe()
    }

    pub fn add(&mut self, draft: NewTransaction) -> Result<Transaction> {
        self.add_on(draft, today())
    }

    /// Adds a transaction stamped with `date` instead of today.
    pub fn add_on(&mut self, draft: NewTransaction, date: NaiveDate) -> Result<Transaction> {
        draft.validate()?;
        let converter = self.converter();
        let id = self.ledger.allocate_id();
        let txn = Transaction::create(id, date, draft, &converter)?;
        self.ledger.push_transaction(txn.clone());
        info!(
            id,
            kind = %txn.kind(),
            category = txn.category(),
            amount_base = txn.amount_base(),
            "transaction added"
        );
        self.persist()?;
        Ok(txn)
    }

    pub fn edit(&mut self, id: u64, patch: TransactionPatch) -> Result<Transaction> {
        let converter = self.converter();
        let txn = self
            .ledger
            .transaction_mut(id)
            .ok_or(LedgerError::NotFound(id))?;
        let date_applied = txn.apply(&patch, &converter)?;
        let updated = txn.clone();
        if !date_applied {
            warn!(
                id,
                date = patch.date.as_deref().unwrap_or_default(),
                "ignoring invalid date; keeping {}",
                updated.date()
            );
        }
        info!(id, "transaction updated");
        self.persist()?;
        Ok(updated)
    }

    /// Removes the transaction with `id`. Unknown ids are a no-op.
    pub fn delete(&mut self, id: u64) -> Result<Option<Transaction>> {
        match self.ledger.remove_transaction(id) {
            Some(removed) => {
                info!(id, "transaction deleted");
                self.persist()?;
                Ok(Some(removed))
            }
            None => Ok(None),
        }
    }

    pub fn budgets(&self) -> &std::collections::BTreeMap<String, f64> {
        self.ledger.budgets()
    }

    /// Stores the monthly limit for `category` in base currency, replacing any prior value.
    pub fn set_budget(&mut self, category: &str, amount: f64, currency: Currency) -> Result<f64> {
        if !amount.is_finite() {
            return Err(LedgerError::InvalidAmount(amount.to_string()));
        }
        let category = normalize_category(category);
        let limit = self.converter().to_base_rounded(amount, currency);
        info!(category = %category, limit, "budget set");
        self.ledger.set_budget(category, limit);
        self.persist()?;
        Ok(limit)
    }

    pub fn remove_budget(&mut self, category: &str) -> Result<Option<f64>> {
        let removed = self.ledger.remove_budget(category.trim());
        if removed.is_some() {
            info!(category = category.trim(), "budget removed");
            self.persist()?;
        }
        Ok(removed)
    }

    pub fn templates(&self) -> &[Template] {
        self.ledger.templates()
    }

    pub fn save_template(&mut self, template: Template) -> Result<()> {
        if !template.amount.is_finite() {
            return Err(LedgerError::InvalidAmount(template.amount.to_string()));
        }
        info!(name = %template.name, "template saved");
        self.ledger.push_template(template);
        self.persist()
    }

    pub fn remove_template(&mut self, index: usize) -> Result<Template> {
        let removed = self
            .ledger
            .remove_template(index)
            .ok_or(LedgerError::TemplateNotFound(index))?;
        info!(name = %removed.name, "template removed");
        self.persist()?;
        Ok(removed)
    }

    /// Creates a new transaction from the template at `index`, dated today.
    pub fn apply_template(&mut self, index: usize) -> Result<Transaction> {
        let draft = self
            .templates()
            .get(index)
            .map(Template::to_draft)
            .ok_or(LedgerError::TemplateNotFound(index))?;
        self.add(draft)
    }

    /// Changes the exchange rate for future conversions. Stored base amounts keep their values.
    pub fn set_rate(&mut self, rate: f64) -> Result<()> {
        validate_rate(rate)?;
        self.ledger.settings_mut().rate = rate;
        info!(rate, "exchange rate updated");
        self.persist()
    }

    pub fn set_display_currency(&mut self, currency: Currency) -> Result<()> {
        self.ledger.settings_mut().display_currency = currency;
        info!(currency = %currency, "display currency updated");
        self.persist()
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<()> {
        self.ledger.settings_mut().theme = theme;
        self.persist()
    }

    pub fn toggle_theme(&mut self) -> Result<Theme> {
        let theme = self.settings().theme.toggled();
        self.set_theme(theme)?;
        Ok(theme)
    }

    pub fn set_reminders(&mut self, schedule: ReminderSchedule) -> Result<()> {
        schedule.validate()?;
        self.ledger.settings_mut().reminders = schedule;
        info!("reminder schedule updated");
        self.persist()
    }

    /// Imports CSV rows with fresh ids. Malformed rows are skipped and
    /// reported; all good rows are committed together.
    pub fn import_csv<R: io::Read>(&mut self, reader: R) -> Result<ImportReport> {
        let parsed = csv_backend::parse_import(reader)?;
        let converter = self.converter();
        let mut report = ImportReport {
            imported: 0,
            skipped: parsed.skipped,
        };

        for row in parsed.rows {
            let draft = match row.amount {
                ImportAmount::Entered(amount) => NewTransaction::new(
                    row.kind,
                    row.category,
                    row.description,
                    amount,
                    row.currency,
                ),
                ImportAmount::Base(amount) => NewTransaction::new(
                    row.kind,
                    row.category,
                    row.description,
                    amount,
                    converter.base,
                ),
            };
            if let Err(err) = draft.validate() {
                warn!(line = row.line, reason = %err, "skipping import row");
                report.skipped.push(RowError {
                    line: row.line,
                    reason: err.to_string(),
                });
                continue;
            }
            let id = self.ledger.allocate_id();
            let txn = Transaction::create(id, row.date, draft, &converter)?;
            self.ledger.push_transaction(txn);
            report.imported += 1;
        }
        report.skipped.sort_by_key(|row| row.line);

        info!(
            imported = report.imported,
            skipped = report.skipped_count(),
            "csv import finished"
        );
        if report.imported > 0 {
            self.persist()?;
        }
        Ok(report)
    }

    pub fn import_csv_path(&mut self, path: &Path) -> Result<ImportReport> {
        let file = File::open(path)?;
        self.import_csv(file)
    }

    /// Exports every transaction to `path`; the extension picks the format.
    pub fn export(&self, path: &Path) -> Result<ExportFormat> {
        csv_backend::export_to_path(self.list(), path, self.capabilities)
    }

    pub fn export_csv<W: io::Write>(&self, writer: W) -> Result<()> {
        csv_backend::export_csv(self.list(), writer)
    }

    fn persist(&self) -> Result<()> {
        self.storage.save(&self.ledger).map_err(|err| {
            error!(location = %self.storage.describe(), "failed to persist ledger: {}", err);
            persistence_failure(err)
        })
    }
}

fn persistence_failure(err: LedgerError) -> LedgerError {
    match err {
        LedgerError::Persistence(_) => err,
        other if other.is_persistence() => LedgerError::Persistence(other.to_string()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    };

    fn store() -> LedgerStore {
        LedgerStore::open(Box::new(MemoryStorage::new())).expect("open store")
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    struct FlakyStorage {
        fail: Arc<AtomicBool>,
    }

    impl StorageBackend for FlakyStorage {
        fn load(&self) -> Result<Option<Ledger>> {
            Ok(None)
        }

        fn save(&self, _ledger: &Ledger) -> Result<()> {
            if self.fail.load(Ordering::SeqCst) {
                Err(LedgerError::Io(io::Error::new(io::ErrorKind::Other, "disk full")))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn ids_are_monotonic_and_never_reused() {
        let mut store = store();
        let first = store
            .add(NewTransaction::income("Salary", 10.0, Currency::Usd))
            .unwrap();
        let second = store
            .add(NewTransaction::expense("Food", 5.0, Currency::Usd))
            .unwrap();
        store.delete(second.id()).unwrap();
        let third = store
            .add(NewTransaction::expense("Food", 6.0, Currency::Usd))
            .unwrap();
        assert_eq!((first.id(), second.id(), third.id()), (1, 2, 3));
    }

    #[test]
    fn add_rejects_invalid_amount_without_consuming_id() {
        let mut store = store();
        let err = store
            .add(NewTransaction::income("Salary", f64::NAN, Currency::Usd))
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount(_)));
        assert!(store.list().is_empty());
        assert_eq!(store.ledger().next_id(), 1);
    }

    #[test]
    fn edit_unknown_id_is_not_found() {
        let mut store = store();
        let err = store.edit(42, TransactionPatch::default()).unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(42)));
    }

    #[test]
    fn delete_twice_is_noop() {
        let mut store = store();
        let txn = store
            .add_on(NewTransaction::expense("Food", 5.0, Currency::Usd), date(2026, 10, 1))
            .unwrap();
        assert!(store.delete(txn.id()).unwrap().is_some());
        assert!(store.delete(txn.id()).unwrap().is_none());
    }

    #[test]
    fn set_rate_rejects_non_positive_and_keeps_prior() {
        let mut store = store();
        store.set_rate(50.0).unwrap();
        assert!(matches!(store.set_rate(0.0), Err(LedgerError::InvalidRate(_))));
        assert_eq!(store.settings().rate, 50.0);
    }

    #[test]
    fn rate_change_does_not_touch_history() {
        let mut store = store();
        store.set_rate(50.0).unwrap();
        let txn = store
            .add(NewTransaction::expense("Food", 500.0, Currency::Php))
            .unwrap();
        assert_eq!(txn.amount_base(), 10.0);
        store.set_rate(25.0).unwrap();
        assert_eq!(store.get(txn.id()).unwrap().amount_base(), 10.0);
    }

    #[test]
    fn budgets_are_last_write_wins() {
        let mut store = store();
        store.set_budget("Food", 5800.0, Currency::Php).unwrap();
        assert_eq!(store.budgets().get("Food"), Some(&100.0));
        store.set_budget("Food", 200.0, Currency::Usd).unwrap();
        store.set_budget("Food", 200.0, Currency::Usd).unwrap();
        assert_eq!(store.budgets().len(), 1);
        assert_eq!(store.budgets().get("Food"), Some(&200.0));
    }

    #[test]
    fn applying_template_creates_fresh_transaction() {
        let mut store = store();
        let draft = NewTransaction::expense("Bills", 45.0, Currency::Usd).with_description("Internet");
        store.save_template(Template::from_draft(&draft)).unwrap();
        let first = store.apply_template(0).unwrap();
        let second = store.apply_template(0).unwrap();
        assert_ne!(first.id(), second.id());
        assert_eq!(first.date(), today());
        assert!(matches!(
            store.apply_template(3),
            Err(LedgerError::TemplateNotFound(3))
        ));
    }

    #[test]
    fn failed_persist_keeps_change_in_memory() {
        let fail = Arc::new(AtomicBool::new(false));
        let mut store = LedgerStore::open(Box::new(FlakyStorage { fail: fail.clone() })).unwrap();
        fail.store(true, Ordering::SeqCst);
        let err = store
            .add(NewTransaction::income("Salary", 10.0, Currency::Usd))
            .unwrap_err();
        assert!(matches!(err, LedgerError::Persistence(ref msg) if msg.contains("disk full")));
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn reopen_restores_state_from_storage() {
        let storage = Arc::new(MemoryStorage::new());
        struct Shared(Arc<MemoryStorage>);
        impl StorageBackend for Shared {
            fn load(&self) -> Result<Option<Ledger>> {
                self.0.load()
            }
            fn save(&self, ledger: &Ledger) -> Result<()> {
                self.0.save(ledger)
            }
        }

        let mut store = LedgerStore::open(Box::new(Shared(storage.clone()))).unwrap();
        store
            .add(NewTransaction::income("Salary", 10.0, Currency::Usd))
            .unwrap();
        store.set_display_currency(Currency::Php).unwrap();
        drop(store);

        let reopened = LedgerStore::open(Box::new(Shared(storage))).unwrap();
        assert_eq!(reopened.list().len(), 1);
        assert_eq!(reopened.ledger().next_id(), 2);
        assert_eq!(reopened.settings().display_currency, Currency::Php);
    }
}
