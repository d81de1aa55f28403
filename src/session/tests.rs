#![allow(clippy::unwrap_used)]

use super::*;
use crate::ledger::OccurrenceSource;
use rust_decimal_macros::dec;

fn store_with_alice() -> Store {
    let store = Store::open_in_memory().unwrap();
    register(&store, "alice", "secret").unwrap();
    store
}

fn jan() -> MonthKey {
    MonthKey::parse("2024-01").unwrap()
}

// ── Login / logout ────────────────────────────────────────────

#[test]
fn test_login_sets_marker_and_loads_ledger() {
    let store = store_with_alice();
    let saved = ledger::add_income(&Ledger::default(), "Salary", dec!(5000), &jan()).unwrap();
    store.save_ledger("alice", &saved).unwrap();

    let session = Session::login(&store, "alice", "secret").unwrap();
    assert_eq!(session.username(), "alice");
    assert_eq!(session.ledger(), &saved);
    assert_eq!(store.current_user().unwrap().as_deref(), Some("alice"));
}

#[test]
fn test_login_wrong_password_is_rejected() {
    let store = store_with_alice();
    let err = Session::login(&store, "alice", "nope").err().unwrap();
    assert!(matches!(
        err.downcast_ref::<AuthError>(),
        Some(AuthError::InvalidCredentials)
    ));
    assert_eq!(store.current_user().unwrap(), None);
}

#[test]
fn test_login_unknown_user_is_rejected() {
    let store = store_with_alice();
    assert!(Session::login(&store, "bob", "secret").is_err());
}

#[test]
fn test_resume_after_login() {
    let store = store_with_alice();
    assert!(Session::resume(&store).unwrap().is_none());

    let mut session = Session::login(&store, "alice", "secret").unwrap();
    session
        .apply(&store, |l| ledger::add_fixed_expense(l, "Rent", dec!(1500), &jan()))
        .unwrap();
    drop(session);

    let resumed = Session::resume(&store).unwrap().unwrap();
    assert_eq!(resumed.username(), "alice");
    assert_eq!(resumed.ledger().fixed_expenses.len(), 1);
}

#[test]
fn test_logout_clears_marker() {
    let store = store_with_alice();
    let session = Session::login(&store, "alice", "secret").unwrap();
    session.logout(&store).unwrap();
    assert!(Session::resume(&store).unwrap().is_none());
}

#[test]
fn test_register_rejects_short_password() {
    let store = Store::open_in_memory().unwrap();
    let err = register(&store, "bob", "ab").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AuthError>(),
        Some(AuthError::PasswordTooShort)
    ));
    assert!(store.load_credentials().unwrap().is_empty());
}

#[test]
fn test_register_existing_user_cannot_take_over() {
    let store = store_with_alice();
    let err = register(&store, "alice", "stolen").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AuthError>(),
        Some(AuthError::UserExists(_))
    ));
    assert!(Session::login(&store, "alice", "stolen").is_err());
    Session::login(&store, "alice", "secret").unwrap();
}

// ── Apply ─────────────────────────────────────────────────────

#[test]
fn test_apply_persists_each_change() {
    let store = store_with_alice();
    let mut session = Session::login(&store, "alice", "secret").unwrap();
    session
        .apply(&store, |l| ledger::add_installment_plan(l, "Laptop", dec!(1200), 3, &jan()))
        .unwrap();
    let plan_id = session.ledger().installment_plans[0].id;

    session
        .apply(&store, |l| {
            Ok(ledger::toggle_status(l, OccurrenceSource::Installment(plan_id), &jan()))
        })
        .unwrap();

    let stored = store.load_ledger("alice").unwrap();
    assert_eq!(&stored, session.ledger());
    assert!(stored.installment_paid.is_paid(plan_id, &jan()));
    assert_eq!(session.project(&jan()).total_installments, dec!(400));
}

#[test]
fn test_rejected_mutation_changes_nothing() {
    let store = store_with_alice();
    let mut session = Session::login(&store, "alice", "secret").unwrap();
    session
        .apply(&store, |l| ledger::add_income(l, "Salary", dec!(100), &jan()))
        .unwrap();
    let before = session.ledger().clone();

    let err = session
        .apply(&store, |l| ledger::add_income(l, "   ", dec!(5), &jan()))
        .unwrap_err();
    assert_eq!(
        err.downcast_ref::<InputError>(),
        Some(&InputError::EmptyDescription)
    );
    assert_eq!(session.ledger(), &before);
    assert_eq!(store.load_ledger("alice").unwrap(), before);
}

#[test]
fn test_users_do_not_share_ledgers() {
    let store = store_with_alice();
    register(&store, "bob", "hunter2").unwrap();

    let mut alice = Session::login(&store, "alice", "secret").unwrap();
    alice
        .apply(&store, |l| ledger::add_income(l, "Salary", dec!(100), &jan()))
        .unwrap();

    let bob = Session::login(&store, "bob", "hunter2").unwrap();
    assert!(bob.ledger().is_empty());
}

// ── Password change ───────────────────────────────────────────

#[test]
fn test_change_password_persists() {
    let store = store_with_alice();
    let session = Session::login(&store, "alice", "secret").unwrap();
    session.change_password(&store, "secret", "n3w").unwrap();
    assert!(Session::login(&store, "alice", "n3w").is_ok());
    assert!(Session::login(&store, "alice", "secret").is_err());
}

#[test]
fn test_change_password_wrong_current_keeps_old() {
    let store = store_with_alice();
    let session = Session::login(&store, "alice", "secret").unwrap();
    let err = session
        .change_password(&store, "wrong", "n3w")
        .unwrap_err();
    assert_eq!(err.to_string(), "wrong current password");
    assert!(Session::login(&store, "alice", "secret").is_ok());
}
