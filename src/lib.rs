#![doc(test(attr(deny(warnings))))]

//! Budget Ledger records income and expenses in a USD base currency, converts
//! to and from PHP for entry and display, tracks monthly category budgets,
//! and produces summaries, filtered views, and CSV import/export.

pub mod cli;
pub mod config;
pub mod core;
pub mod currency;
pub mod errors;
pub mod ledger;
pub mod reminder;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::debug!(version = utils::build_info::CLI_VERSION, "budget ledger tracing initialized");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}
