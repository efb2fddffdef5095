use super::{date, seed, store};
use crate::core::services::{CategoryFilter, FilterService, KindFilter, TransactionFilter};
use crate::currency::Currency;
use crate::errors::LedgerError;
use crate::ledger::{NewTransaction, TransactionKind};

fn sample() -> crate::core::LedgerStore {
    let mut store = store();
    seed(
        &mut store,
        vec![
            (
                NewTransaction::expense("Housing", 900.0, Currency::Usd).with_description("Rent"),
                date(2026, 10, 1),
            ),
            (
                NewTransaction::income("Refunds", 50.0, Currency::Usd).with_description("Rent refund"),
                date(2026, 10, 5),
            ),
            (
                NewTransaction::expense("Food", 12.0, Currency::Usd).with_description("Groceries"),
                date(2026, 10, 10),
            ),
            (
                NewTransaction::expense("Food", 300.0, Currency::Php).with_description("Jollibee"),
                date(2026, 10, 20),
            ),
        ],
    );
    store
}

#[test]
fn kind_and_search_combine() {
    let store = sample();
    let filter = TransactionFilter::new()
        .kind(TransactionKind::Income)
        .search("rent");
    let hits = FilterService::apply(store.list(), &filter);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].description(), "Rent refund");
}

#[test]
fn date_bounds_are_inclusive() {
    let store = sample();
    let filter = TransactionFilter::new()
        .from(date(2026, 10, 5))
        .until(date(2026, 10, 10));
    let ids: Vec<u64> = FilterService::apply(store.list(), &filter)
        .iter()
        .map(|txn| txn.id())
        .collect();
    assert_eq!(ids, vec![2, 3]);
}

#[test]
fn search_matches_category_case_insensitively() {
    let store = sample();
    let hits = FilterService::apply(store.list(), &TransactionFilter::new().search("FOO"));
    assert_eq!(hits.len(), 2);
}

#[test]
fn category_is_exact_match() {
    let store = sample();
    let hits = FilterService::apply(store.list(), &TransactionFilter::new().category("Foo"));
    assert!(hits.is_empty());
    let hits = FilterService::apply(store.list(), &TransactionFilter::new().category("Food"));
    assert_eq!(hits.len(), 2);
}

#[test]
fn unrestricted_filter_preserves_order() {
    let store = sample();
    let filter = TransactionFilter::new();
    assert!(filter.is_unrestricted());
    let ids: Vec<u64> = FilterService::apply(store.list(), &filter)
        .iter()
        .map(|txn| txn.id())
        .collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
}

#[test]
fn parse_treats_all_and_blank_as_unset() {
    let filter = TransactionFilter::parse("", " ", "All", "all", "  ").unwrap();
    assert_eq!(filter.kind, KindFilter::All);
    assert_eq!(filter.category, CategoryFilter::All);
    assert!(filter.is_unrestricted());
}

#[test]
fn parse_reads_every_field() {
    let filter =
        TransactionFilter::parse("2026-10-01", "2026-10-31", "expense", "Food", "jolli").unwrap();
    assert_eq!(filter.start, Some(date(2026, 10, 1)));
    assert_eq!(filter.kind, KindFilter::Only(TransactionKind::Expense));
    let store = sample();
    let hits = FilterService::apply(store.list(), &filter);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].entry_currency(), Currency::Php);
}

#[test]
fn parse_rejects_bad_bounds() {
    assert!(TransactionFilter::parse("10/01/2026", "", "All", "All", "").is_err());
    let err = TransactionFilter::parse("2026-10-31", "2026-10-01", "All", "All", "").unwrap_err();
    assert!(matches!(err, LedgerError::InvalidInput(_)));
}
