mod common;

use std::fs;

use budget_ledger::{
    currency::Currency,
    errors::LedgerError,
    ledger::{NewTransaction, TransactionKind},
    storage::{ExportCapabilities, ExportFormat, EXPORT_HEADERS},
};
use chrono::NaiveDate;
use common::{setup_store, temp_dir};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn export_then_import_into_empty_ledger_is_lossless() {
    let (mut source, _) = setup_store();
    source
        .add_on(
            NewTransaction::income("Salary", 1500.0, Currency::Usd).with_description("October, part 1"),
            date(2026, 10, 1),
        )
        .unwrap();
    source
        .add_on(
            NewTransaction::expense("Food", 333.0, Currency::Php).with_description("Palengke \"wet\" market"),
            date(2026, 10, 3),
        )
        .unwrap();
    let csv_path = temp_dir().join("export.csv");
    assert_eq!(source.export(&csv_path).unwrap(), ExportFormat::Csv);

    let (mut target, _) = setup_store();
    let report = target.import_csv_path(&csv_path).unwrap();
    assert_eq!(report.imported, 2);
    assert_eq!(report.skipped_count(), 0);

    for (before, after) in source.list().iter().zip(target.list()) {
        assert_eq!(before.id(), after.id());
        assert_eq!(before.date(), after.date());
        assert_eq!(before.kind(), after.kind());
        assert_eq!(before.description(), after.description());
        assert_eq!(before.entry_currency(), after.entry_currency());
        assert_eq!(before.amount_entered(), after.amount_entered());
        assert_eq!(before.amount_base(), after.amount_base());
    }
}

#[test]
fn imported_entries_convert_at_the_importing_ledgers_rate() {
    let (mut target, _) = setup_store();
    target.set_rate(50.0).unwrap();
    let input = "date,type,category,description,amount,currency\n2026-10-03,expense,Food,,500,PHP\n";
    target.import_csv(input.as_bytes()).unwrap();
    assert_eq!(target.list()[0].amount_base(), 10.0);
}

#[test]
fn export_header_and_order_are_fixed() {
    let (mut store, _) = setup_store();
    store.add_on(NewTransaction::expense("B", 2.0, Currency::Usd), date(2026, 10, 2)).unwrap();
    store.add_on(NewTransaction::expense("A", 1.0, Currency::Usd), date(2026, 10, 1)).unwrap();
    let mut buffer = Vec::new();
    store.export_csv(&mut buffer).unwrap();
    let text = String::from_utf8(buffer).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], EXPORT_HEADERS.join(","));
    assert!(lines[1].starts_with("1,2026-10-02,expense,B,"));
    assert!(lines[2].starts_with("2,2026-10-01,expense,A,"));
}

#[test]
fn import_skips_bad_rows_without_aborting() {
    let (mut store, _) = setup_store();
    let input = "\
date,type,category,description,amount,currency
2026-10-01,expense,Food,ok,10,USD
10/02/2026,expense,Food,bad date,10,USD
2026-10-03,transfer,Food,bad type,10,USD
2026-10-04,income,,no category,5,
2026-10-05,expense,Food,bad amount,ten,USD
";
    let report = store.import_csv(input.as_bytes()).unwrap();
    assert_eq!(report.imported, 2);
    let lines: Vec<u64> = report.skipped.iter().map(|row| row.line).collect();
    assert_eq!(lines, vec![3, 4, 6]);

    let list = store.list();
    assert_eq!(list.len(), 2);
    assert_eq!(list[1].category(), "Uncategorized");
    assert_eq!(list[1].entry_currency(), Currency::Usd);
    assert_eq!(list[1].kind(), TransactionKind::Income);
}

#[test]
fn import_with_only_base_amounts_uses_base_currency() {
    let (mut store, _) = setup_store();
    let input = "date,type,category,description,amount_base(USD)\n2026-10-01,expense,Rent,,900\n";
    store.import_csv(input.as_bytes()).unwrap();
    let txn = &store.list()[0];
    assert_eq!(txn.amount_base(), 900.0);
    assert_eq!(txn.amount_entered(), 900.0);
    assert_eq!(txn.entry_currency(), Currency::Usd);
}

#[test]
fn import_ids_come_from_the_shared_counter() {
    let (mut store, _) = setup_store();
    store.add(NewTransaction::expense("Food", 1.0, Currency::Usd)).unwrap();
    let input = "id,date,type,category,description,amount,currency\n1,2026-10-01,expense,Food,,2,USD\n";
    store.import_csv(input.as_bytes()).unwrap();
    let ids: Vec<u64> = store.list().iter().map(|txn| txn.id()).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn spreadsheet_export_needs_the_capability() {
    let (mut store, _) = setup_store();
    store.add(NewTransaction::expense("Food", 1.0, Currency::Usd)).unwrap();
    let dir = temp_dir();

    let xlsx = dir.join("export.xlsx");
    let err = store.export(&xlsx).unwrap_err();
    assert!(matches!(err, LedgerError::ExportUnavailable(_)));
    assert!(!xlsx.exists());

    let err = store.export(&dir.join("export.txt")).unwrap_err();
    assert!(matches!(err, LedgerError::InvalidInput(_)));

    assert!(!ExportCapabilities::detect().supports(ExportFormat::Spreadsheet));
    assert!(fs::read_dir(&dir).unwrap().next().is_none());
}
