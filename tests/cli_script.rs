mod common;

use std::fs;

use assert_cmd::Command;
use predicates::str::contains;

fn script(home: &std::path::Path, input: &str) -> assert_cmd::assert::Assert {
    Command::cargo_bin("budget_ledger_cli")
        .unwrap()
        .env("BUDGET_LEDGER_CLI_SCRIPT", "1")
        .env("BUDGET_LEDGER_HOME", home)
        .env("RUST_LOG", "off")
        .write_stdin(input.to_string())
        .assert()
}

#[test]
fn script_mode_runs_basic_flow() {
    let home = common::temp_dir();
    script(
        &home,
        "add income 1000 Salary\nbudget set Food 200\nquick 120 Food\nquick 130 Food lunch\nremaining Food\nsummary\nexit\n",
    )
    .success()
    .stdout(contains("Added #1 income $1,000.00"))
    .stdout(contains("Remaining for Food: -$50.00"))
    .stdout(contains("OVER"));

    let json = fs::read_to_string(home.join("data.json")).unwrap();
    assert!(json.contains("\"next_id\": 4"));
}

#[test]
fn state_carries_over_between_runs() {
    let home = common::temp_dir();
    script(&home, "display PHP\nrate 50\nadd expense 500 Food --currency PHP\n").success();
    script(&home, "list\nfilter --type expense --search foo\n")
        .success()
        .stdout(contains("₱500.00"))
        .stdout(contains("1 of 1 transactions shown."));
}

#[test]
fn typos_get_suggestions_and_errors_do_not_stop_the_script() {
    let home = common::temp_dir();
    script(&home, "sumary\nrate zero\nadd expense 3 Food\nexport out.xlsx\nlist\n")
        .success()
        .stdout(contains("Suggestion: `summary`?"))
        .stdout(contains("`zero` is not a number"))
        .stdout(contains("not available in this build"))
        .stdout(contains("Added #1 expense $3.00"));
}

#[test]
fn export_and_import_through_the_shell() {
    let home = common::temp_dir();
    let csv = home.join("out.csv");
    script(
        &home,
        &format!(
            "add income 10 Gift\nadd expense 4 Food\nexport \"{}\"\nimport \"{}\"\n",
            csv.display(),
            csv.display()
        ),
    )
    .success()
    .stdout(contains("Exported 2 transactions"))
    .stdout(contains("Imported 2 transactions."));

    let exported = fs::read_to_string(&csv).unwrap();
    assert!(exported.starts_with("id,date,type,category,description,amount_base(USD),orig_amount,orig_currency"));
    script(&home, "list\n")
        .success()
        .stdout(contains("Gift").count(2));
}
