//! Ledger domain models and the persisted document type.

#[allow(clippy::module_inception)]
pub mod ledger;
pub mod template;
pub mod transaction;

pub use ledger::{Ledger, CURRENT_SCHEMA_VERSION};
pub use template::Template;
pub use transaction::{
    normalize_category, parse_iso_date, NewTransaction, Transaction, TransactionKind,
    TransactionPatch, DEFAULT_CATEGORY,
};
