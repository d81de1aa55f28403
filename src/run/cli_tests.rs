#![allow(clippy::unwrap_used)]

use rust_decimal_macros::dec;

use super::*;

fn argv(parts: &[&str]) -> Vec<String> {
    std::iter::once("fintrack")
        .chain(parts.iter().copied())
        .map(String::from)
        .collect()
}

fn run(store: &Store, parts: &[&str]) -> Result<()> {
    as_cli(&argv(parts), store)
}

fn store_logged_in() -> Store {
    let store = Store::open_in_memory().unwrap();
    run(&store, &["register", "alice", "secret"]).unwrap();
    run(&store, &["login", "alice", "secret"]).unwrap();
    store
}

// ── Argument helpers ──────────────────────────────────────────

#[test]
fn test_positional_skips_flags() {
    let args = argv(&["Rent", "--month", "2024-03", "1500", "--yes"]);
    assert_eq!(positional(&args[1..]), vec!["Rent", "1500"]);
    assert_eq!(flag_value(&args, "--month"), Some("2024-03"));
    assert!(has_flag(&args, "--yes"));
    assert!(!has_flag(&args, "--no"));
}

#[test]
fn test_month_flag_defaults_and_validates() {
    assert_eq!(month_flag(&[]).unwrap(), MonthKey::current());
    let args = argv(&["--month", "2024-3"]);
    assert_eq!(month_flag(&args).unwrap().as_str(), "2024-03");
    let bad = argv(&["--month", "March"]);
    assert!(month_flag(&bad).is_err());
}

#[test]
fn test_shellexpand() {
    assert_eq!(shellexpand("/tmp/x.csv"), "/tmp/x.csv");
    assert!(!shellexpand("~/x.csv").starts_with('~'));
}

// ── Commands ──────────────────────────────────────────────────

#[test]
fn test_unknown_command_is_error() {
    let store = Store::open_in_memory().unwrap();
    assert!(run(&store, &["frobnicate"]).is_err());
}

#[test]
fn test_ledger_commands_need_login() {
    let store = Store::open_in_memory().unwrap();
    let err = run(&store, &["add", "income", "Salary", "100"]).unwrap_err();
    assert!(err.to_string().starts_with("Not logged in"));
}

#[test]
fn test_login_with_bad_password_fails() {
    let store = Store::open_in_memory().unwrap();
    run(&store, &["register", "alice", "secret"]).unwrap();
    assert!(run(&store, &["login", "alice", "nope"]).is_err());
    assert_eq!(store.current_user().unwrap(), None);
}

#[test]
fn test_add_edit_toggle_delete() {
    let store = store_logged_in();
    run(&store, &["add", "income", "Salary", "5000", "--month", "2024-01"]).unwrap();
    run(&store, &["add", "expense", "Rent", "1500", "--month", "2024-01"]).unwrap();
    run(&store, &["add", "installment", "New", "laptop", "1200", "3", "--month", "2024-01"]).unwrap();

    let ledger = store.load_ledger("alice").unwrap();
    assert_eq!(ledger.installment_plans[0].description, "New laptop");
    let rent = ledger.fixed_expenses[0].id.to_string();
    let laptop = ledger.installment_plans[0].id.to_string();
    let salary = ledger.income[0].id.to_string();

    run(&store, &["edit", &rent, "1600"]).unwrap();
    run(&store, &["toggle", &laptop, "--month", "2024-02"]).unwrap();

    let ledger = store.load_ledger("alice").unwrap();
    let feb = MonthKey::parse("2024-02").unwrap();
    let p = ledger::project(&ledger, &feb);
    assert_eq!(p.total_expenses_pending, dec!(1600));
    assert_eq!(p.total_expenses_paid, dec!(400));
    assert_eq!(p.free_balance, dec!(4600));

    // Income has no paid status, plans cannot be edited
    assert!(run(&store, &["toggle", &salary, "--month", "2024-02"]).is_err());
    assert!(run(&store, &["edit", &laptop, "10"]).is_err());
    // No occurrence after the last installment
    assert!(run(&store, &["toggle", &laptop, "--month", "2024-04"]).is_err());

    run(&store, &["delete", &rent, "--yes"]).unwrap();
    assert!(store.load_ledger("alice").unwrap().fixed_expenses.is_empty());
    assert!(run(&store, &["delete", &rent, "--yes"]).is_err());
}

#[test]
fn test_invalid_input_leaves_ledger_unchanged() {
    let store = store_logged_in();
    assert!(run(&store, &["add", "income", "Salary", "abc"]).is_err());
    assert!(run(&store, &["add", "installment", "Laptop", "1200", "0"]).is_err());
    assert!(run(&store, &["add", "bonus", "Gift", "10"]).is_err());
    assert!(run(&store, &["add", "income", "Lottery", "79228162514264337593543950335"]).is_err());
    assert!(run(&store, &["add", "expense", "Yacht", "1000000000000001"]).is_err());
    assert!(store.load_ledger("alice").unwrap().is_empty());
}

#[test]
fn test_repair_drops_flags_of_deleted_entries() {
    let store = store_logged_in();
    run(&store, &["add", "expense", "Rent", "1500", "--month", "2024-01"]).unwrap();
    run(&store, &["add", "installment", "Laptop", "1200", "3", "--month", "2024-01"]).unwrap();
    let ledger = store.load_ledger("alice").unwrap();
    let rent = ledger.fixed_expenses[0].id.to_string();
    let laptop = ledger.installment_plans[0].id.to_string();
    run(&store, &["toggle", &rent, "--month", "2024-01"]).unwrap();
    run(&store, &["toggle", &laptop, "--month", "2024-01"]).unwrap();
    run(&store, &["toggle", &laptop, "--month", "2024-02"]).unwrap();
    run(&store, &["delete", &laptop, "--yes"]).unwrap();
    assert_eq!(store.load_ledger("alice").unwrap().paid_key_count(), 3);

    run(&store, &["repair"]).unwrap();
    let repaired = store.load_ledger("alice").unwrap();
    assert_eq!(repaired.paid_key_count(), 1);
    assert_eq!(repaired.fixed_expenses.len(), 1);

    run(&store, &["logout"]).unwrap();
    assert!(run(&store, &["repair"]).is_err());
}

#[test]
fn test_reports_run() {
    let store = store_logged_in();
    run(&store, &["add", "installment", "Laptop", "1200", "3", "--month", "2024-01"]).unwrap();
    run(&store, &["list", "2024-02"]).unwrap();
    run(&store, &["summary", "2024-02"]).unwrap();
    run(&store, &["report", "2024-02"]).unwrap();
    assert!(run(&store, &["summary", "Feb"]).is_err());
}

#[test]
fn test_export_to_path() {
    let store = store_logged_in();
    run(&store, &["add", "income", "Salary", "5000", "--month", "2024-01"]).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jan.csv");
    let path_str = path.to_str().unwrap();
    run(&store, &["export", path_str, "--month", "2024-01"]).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("kind,description,amount,status"));
    assert!(text.contains("Salary"));
}

#[test]
fn test_passwd_and_logout() {
    let store = store_logged_in();
    assert!(run(&store, &["passwd", "wrong", "newpass"]).is_err());
    run(&store, &["passwd", "secret", "newpass"]).unwrap();
    run(&store, &["logout"]).unwrap();
    assert_eq!(store.current_user().unwrap(), None);
    run(&store, &["login", "alice", "newpass"]).unwrap();
    run(&store, &["whoami"]).unwrap();
}
