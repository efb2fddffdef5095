mod filter_service_tests;

use chrono::NaiveDate;

use crate::core::LedgerStore;
use crate::ledger::NewTransaction;
use crate::storage::MemoryStorage;

pub(super) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub(super) fn store() -> LedgerStore {
    LedgerStore::open(Box::new(MemoryStorage::new())).expect("open memory store")
}

pub(super) fn seed(store: &mut LedgerStore, entries: Vec<(NewTransaction, NaiveDate)>) {
    for (draft, on) in entries {
        store.add_on(draft, on).expect("seed transaction");
    }
}
