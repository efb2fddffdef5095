pub mod ledger_store;
pub mod services;
pub mod utils;

pub use ledger_store::LedgerStore;
