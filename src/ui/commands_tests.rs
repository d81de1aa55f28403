#![allow(clippy::unwrap_used)]

use rust_decimal_macros::dec;

use super::*;
use crate::ledger::OccurrenceSource;
use crate::ui::app::DashboardRow;

fn logged_in_app(store: &Store) -> App {
    session::register(store, "alice", "secret").unwrap();
    let mut app = App::new(None);
    handle_command("login alice secret", &mut app, store).unwrap();
    app.set_month(MonthKey::parse("2024-01").unwrap());
    app
}

// ── Parsing helpers ───────────────────────────────────────────

#[test]
fn test_split_trailing() {
    let (head, tail) = split_trailing("Rent flat 2 1500", 1).unwrap();
    assert_eq!(head, "Rent flat 2");
    assert_eq!(tail, vec!["1500"]);

    let (head, tail) = split_trailing("New  laptop   1200 3", 2).unwrap();
    assert_eq!(head, "New laptop");
    assert_eq!(tail, vec!["1200", "3"]);

    assert!(split_trailing("1500", 1).is_none());
    assert!(split_trailing("", 1).is_none());
}

#[test]
fn test_levenshtein() {
    assert_eq!(levenshtein("income", "income"), 0);
    assert_eq!(levenshtein("incom", "income"), 1);
    assert_eq!(levenshtein("", "abc"), 3);
}

#[test]
fn test_unknown_command_suggests_closest() {
    let store = Store::open_in_memory().unwrap();
    let mut app = logged_in_app(&store);
    handle_command("incme Salary 10", &mut app, &store).unwrap();
    assert!(app.status_message.contains("Did you mean :income?"));
}

// ── Session commands ──────────────────────────────────────────

#[test]
fn test_commands_need_login() {
    let store = Store::open_in_memory().unwrap();
    let mut app = App::new(None);
    handle_command("income Salary 10", &mut app, &store).unwrap();
    assert!(app.status_message.starts_with("Log in first"));
    assert!(!app.logged_in());
}

#[test]
fn test_register_then_login() {
    let store = Store::open_in_memory().unwrap();
    let mut app = App::new(None);
    handle_command("register bob hunter2", &mut app, &store).unwrap();
    assert!(app.status_message.starts_with("Account created"));
    assert!(!app.logged_in());

    handle_command("login bob hunter2", &mut app, &store).unwrap();
    assert_eq!(app.username(), Some("bob"));
}

#[test]
fn test_login_failure_shows_error() {
    let store = Store::open_in_memory().unwrap();
    session::register(&store, "alice", "secret").unwrap();
    let mut app = App::new(None);
    handle_command("login alice wrong", &mut app, &store).unwrap();
    assert_eq!(app.status_message, "Error: invalid credentials");
    assert!(!app.logged_in());
}

#[test]
fn test_register_short_password_shows_error() {
    let store = Store::open_in_memory().unwrap();
    let mut app = App::new(None);
    handle_command("register bob ab", &mut app, &store).unwrap();
    assert!(app.status_message.starts_with("Error: new password too short"));
}

#[test]
fn test_register_existing_user_shows_error() {
    let store = Store::open_in_memory().unwrap();
    session::register(&store, "alice", "secret").unwrap();
    let mut app = App::new(None);
    handle_command("register alice other", &mut app, &store).unwrap();
    assert_eq!(app.status_message, "Error: user 'alice' already exists");
}

#[test]
fn test_logout() {
    let store = Store::open_in_memory().unwrap();
    let mut app = logged_in_app(&store);
    handle_command("logout", &mut app, &store).unwrap();
    assert!(!app.logged_in());
    assert_eq!(store.current_user().unwrap(), None);
    assert!(app.projection.income.is_empty());
}

#[test]
fn test_passwd() {
    let store = Store::open_in_memory().unwrap();
    let mut app = logged_in_app(&store);
    handle_command("passwd nope newpass", &mut app, &store).unwrap();
    assert_eq!(app.status_message, "Error: wrong current password");

    handle_command("passwd secret newpass", &mut app, &store).unwrap();
    assert_eq!(app.status_message, "Password changed");
    assert!(store.load_credentials().unwrap().verify("alice", "newpass"));
}

// ── Ledger commands ───────────────────────────────────────────

#[test]
fn test_income_and_expense_update_projection() {
    let store = Store::open_in_memory().unwrap();
    let mut app = logged_in_app(&store);
    handle_command("income Salary 5000", &mut app, &store).unwrap();
    handle_command("expense Rent flat 1500,50", &mut app, &store).unwrap();

    assert_eq!(app.projection.total_income, dec!(5000));
    assert_eq!(app.projection.expenses[0].description, "Rent flat");
    assert_eq!(app.projection.total_expenses_pending, dec!(1500.50));
    assert_eq!(store.load_ledger("alice").unwrap().income.len(), 1);
}

#[test]
fn test_invalid_amount_leaves_ledger_unchanged() {
    let store = Store::open_in_memory().unwrap();
    let mut app = logged_in_app(&store);
    handle_command("income Salary lots", &mut app, &store).unwrap();
    assert_eq!(app.status_message, "Error: 'lots' is not a valid amount");
    assert!(app.session.as_ref().unwrap().ledger().is_empty());
}

#[test]
fn test_installment_command() {
    let store = Store::open_in_memory().unwrap();
    let mut app = logged_in_app(&store);
    handle_command("installment New laptop 1200 3", &mut app, &store).unwrap();
    assert_eq!(app.projection.expenses[0].description, "New laptop (1/3)");
    assert_eq!(app.plans.len(), 1);

    handle_command("installment Phone 600 0", &mut app, &store).unwrap();
    assert_eq!(app.status_message, "Error: installment count must be at least 1");
    assert_eq!(app.plans.len(), 1);

    handle_command("installment Phone 600 many", &mut app, &store).unwrap();
    assert_eq!(app.status_message, "Invalid installment count: many");
}

#[test]
fn test_delete_asks_for_confirmation() {
    let store = Store::open_in_memory().unwrap();
    let mut app = logged_in_app(&store);
    handle_command("expense Rent 1500", &mut app, &store).unwrap();
    let Some(DashboardRow::Expense(source)) = app.selected_row() else {
        panic!("expected the expense row to be selected");
    };

    handle_command("delete", &mut app, &store).unwrap();
    assert_eq!(app.input_mode, InputMode::Confirm);
    assert_eq!(app.confirm_message, "Delete 'Rent' from every month?");
    assert!(matches!(
        app.pending_action,
        Some(PendingAction::DeleteEntry { id, .. }) if id == source.entry_id()
    ));
}

#[test]
fn test_total_contracted_ignores_viewed_month() {
    let store = Store::open_in_memory().unwrap();
    let mut app = logged_in_app(&store);
    assert_eq!(app.contracted, dec!(0));
    handle_command("installment Laptop 1200 3", &mut app, &store).unwrap();
    handle_command("month 2024-06", &mut app, &store).unwrap();
    handle_command("installment Phone 600 2", &mut app, &store).unwrap();
    assert_eq!(app.contracted, dec!(1800));

    handle_command("month 2030-01", &mut app, &store).unwrap();
    assert!(app.projection.expenses.is_empty());
    assert_eq!(app.contracted, dec!(1800));
}

#[test]
fn test_repair_removes_flags_of_deleted_entries() {
    let store = Store::open_in_memory().unwrap();
    let mut app = logged_in_app(&store);
    handle_command("expense Rent 1500", &mut app, &store).unwrap();
    handle_command("expense Gym 50", &mut app, &store).unwrap();
    let ledger = app.session.as_ref().unwrap().ledger().clone();
    let rent = OccurrenceSource::Fixed(ledger.fixed_expenses[0].id);
    let gym = ledger.fixed_expenses[1].id;
    let month = app.month.clone();
    app.apply(&store, |l| Ok(ledger::toggle_status(l, rent, &month))).unwrap();
    app.apply(&store, |l| Ok(ledger::toggle_status(l, OccurrenceSource::Fixed(gym), &month)))
        .unwrap();
    app.apply(&store, |l| ledger::delete_entry(l, gym)).unwrap();
    let paid_before = app.projection.total_expenses_paid;

    handle_command("repair", &mut app, &store).unwrap();
    assert_eq!(app.status_message, "Removed 1 stale paid flags");
    assert_eq!(app.projection.total_expenses_paid, paid_before);
    assert_eq!(store.load_ledger("alice").unwrap().paid_key_count(), 1);

    handle_command("repair", &mut app, &store).unwrap();
    assert_eq!(app.status_message, "Removed 0 stale paid flags");
}

// ── Month navigation ──────────────────────────────────────────

#[test]
fn test_month_command() {
    let store = Store::open_in_memory().unwrap();
    let mut app = logged_in_app(&store);
    handle_command("month 2025-03", &mut app, &store).unwrap();
    assert_eq!(app.month.as_str(), "2025-03");

    handle_command("m 7", &mut app, &store).unwrap();
    assert_eq!(app.month.as_str(), "2025-07");

    handle_command("month 2025-13", &mut app, &store).unwrap();
    assert!(app.status_message.starts_with("Invalid month format"));
    assert_eq!(app.month.as_str(), "2025-07");
}

#[test]
fn test_next_and_prev_month_cross_year() {
    let store = Store::open_in_memory().unwrap();
    let mut app = logged_in_app(&store);
    handle_command("month 2024-12", &mut app, &store).unwrap();
    handle_command("next-month", &mut app, &store).unwrap();
    assert_eq!(app.month.as_str(), "2025-01");
    handle_command("prev-month", &mut app, &store).unwrap();
    handle_command("prev-month", &mut app, &store).unwrap();
    assert_eq!(app.month.as_str(), "2024-11");
}

#[test]
fn test_entries_recur_into_later_months() {
    let store = Store::open_in_memory().unwrap();
    let mut app = logged_in_app(&store);
    handle_command("installment Laptop 1200 3", &mut app, &store).unwrap();
    handle_command("next-month", &mut app, &store).unwrap();
    assert_eq!(app.projection.expenses[0].description, "Laptop (2/3)");
    handle_command("month 2024-04", &mut app, &store).unwrap();
    assert!(app.projection.expenses.is_empty());
}

// ── Export ────────────────────────────────────────────────────

#[test]
fn test_export_writes_file() {
    let store = Store::open_in_memory().unwrap();
    let mut app = logged_in_app(&store);
    handle_command("income Salary 5000", &mut app, &store).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jan.csv");
    handle_command(&format!("export {}", path.display()), &mut app, &store).unwrap();

    assert!(app.status_message.starts_with("Exported 1 rows"));
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("income,Salary,5000.00,"));
}

#[test]
fn test_export_to_missing_directory_keeps_running() {
    let store = Store::open_in_memory().unwrap();
    let mut app = logged_in_app(&store);
    handle_command("income Salary 5000", &mut app, &store).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("jan.csv");
    handle_command(&format!("export {}", path.display()), &mut app, &store).unwrap();

    assert!(app.running);
    assert!(app.status_message.starts_with("Error: Failed to create"));
    assert!(!path.exists());
    assert_eq!(app.projection.total_income, dec!(5000));
}
