use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

use super::projection::OccurrenceSource;
use crate::models::{
    EntryId, FixedExpense, IncomeEntry, InstallmentPlan, Ledger, MonthKey, PaidKey,
};

/// Rejected input. The ledger the mutation was given stays as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("description is empty")]
    EmptyDescription,
    #[error("'{0}' is not a valid amount")]
    InvalidAmount(String),
    #[error("installment count must be at least 1")]
    InvalidInstallmentCount,
    #[error("entry #{0} cannot be edited")]
    NotEditable(EntryId),
    #[error("no entry with id #{0}")]
    UnknownEntry(EntryId),
}

/// Largest magnitude accepted for an amount: 10^15.
pub fn max_amount() -> Decimal {
    Decimal::new(1_000_000_000_000_000, 0)
}

fn within_limit(amount: Decimal) -> bool {
    amount.abs() <= max_amount()
}

/// Parse a user-typed amount. A decimal comma is accepted (`12,50`).
/// Anything beyond [`max_amount`] is refused.
pub fn parse_amount(input: &str) -> Option<Decimal> {
    let normalized = input.trim().replacen(',', ".", 1);
    if normalized.is_empty() {
        return None;
    }
    Decimal::from_str(&normalized)
        .or_else(|_| Decimal::from_scientific(&normalized))
        .ok()
        .filter(|amount| within_limit(*amount))
}

/// Like [`parse_amount`], but as an [`InputError`].
pub fn require_amount(input: &str) -> Result<Decimal, InputError> {
    parse_amount(input).ok_or_else(|| InputError::InvalidAmount(input.trim().to_string()))
}

/// A fresh id: the current millisecond timestamp, bumped past every id
/// already in the ledger so ids stay unique and increasing.
pub fn next_id(ledger: &Ledger) -> EntryId {
    next_id_at(ledger, chrono::Utc::now().timestamp_millis())
}

pub fn next_id_at(ledger: &Ledger, now_ms: i64) -> EntryId {
    let floor = ledger.ids().map(|id| id.0.saturating_add(1)).max().unwrap_or(i64::MIN);
    EntryId(now_ms.max(floor))
}

fn check_amount(amount: Decimal) -> Result<Decimal, InputError> {
    if within_limit(amount) {
        Ok(amount)
    } else {
        Err(InputError::InvalidAmount(amount.to_string()))
    }
}

fn require_description(description: &str) -> Result<String, InputError> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Err(InputError::EmptyDescription);
    }
    Ok(trimmed.to_string())
}

pub fn add_income(
    ledger: &Ledger,
    description: &str,
    amount: Decimal,
    month: &MonthKey,
) -> Result<Ledger, InputError> {
    let description = require_description(description)?;
    let amount = check_amount(amount)?;
    let mut next = ledger.clone();
    next.income.push(IncomeEntry {
        id: next_id(ledger),
        description,
        amount,
        month: month.clone(),
    });
    tracing::debug!(month = %month, %amount, "income added");
    Ok(next)
}

pub fn add_fixed_expense(
    ledger: &Ledger,
    description: &str,
    amount: Decimal,
    month: &MonthKey,
) -> Result<Ledger, InputError> {
    let description = require_description(description)?;
    let amount = check_amount(amount)?;
    let mut next = ledger.clone();
    next.fixed_expenses.push(FixedExpense {
        id: next_id(ledger),
        description,
        amount,
        month: month.clone(),
    });
    tracing::debug!(month = %month, %amount, "fixed expense added");
    Ok(next)
}

pub fn add_installment_plan(
    ledger: &Ledger,
    description: &str,
    total_amount: Decimal,
    installment_count: i64,
    start_month: &MonthKey,
) -> Result<Ledger, InputError> {
    let description = require_description(description)?;
    let total_amount = check_amount(total_amount)?;
    let count = u32::try_from(installment_count)
        .ok()
        .filter(|count| *count >= 1)
        .ok_or(InputError::InvalidInstallmentCount)?;
    let plan = InstallmentPlan::new(
        next_id(ledger),
        description,
        total_amount,
        count,
        start_month.clone(),
    )
    .ok_or(InputError::InvalidInstallmentCount)?;

    let mut next = ledger.clone();
    tracing::debug!(
        month = %start_month,
        total = %total_amount,
        count,
        "installment plan added"
    );
    next.installment_plans.push(plan);
    Ok(next)
}

/// Replace the amount of an income or fixed expense.
/// Installment plans are immutable, so their ids are refused.
pub fn edit_amount(ledger: &Ledger, id: EntryId, amount: Decimal) -> Result<Ledger, InputError> {
    let amount = check_amount(amount)?;
    let mut next = ledger.clone();
    if let Some(entry) = next.income.iter_mut().find(|e| e.id == id) {
        entry.amount = amount;
    } else if let Some(expense) = next.fixed_expenses.iter_mut().find(|e| e.id == id) {
        expense.amount = amount;
    } else if ledger.installment_plans.iter().any(|p| p.id == id) {
        return Err(InputError::NotEditable(id));
    } else {
        return Err(InputError::UnknownEntry(id));
    }
    tracing::debug!(%id, %amount, "amount edited");
    Ok(next)
}

/// Flip the paid flag of one occurrence. An absent flag counts as unpaid.
pub fn toggle_status(ledger: &Ledger, source: OccurrenceSource, month: &MonthKey) -> Ledger {
    let mut next = ledger.clone();
    let map = match source {
        OccurrenceSource::Fixed(_) => &mut next.fixed_paid,
        OccurrenceSource::Installment(_) => &mut next.installment_paid,
    };
    let paid = map.toggle(PaidKey::new(source.entry_id(), month.clone()));
    tracing::debug!(id = %source.entry_id(), month = %month, paid, "status toggled");
    next
}

/// Remove an entry from whichever collection holds it, for every month.
/// Paid flags referring to it are left behind and ignored from then on.
pub fn delete_entry(ledger: &Ledger, id: EntryId) -> Result<Ledger, InputError> {
    if !ledger.contains(id) {
        return Err(InputError::UnknownEntry(id));
    }
    let mut next = ledger.clone();
    next.income.retain(|e| e.id != id);
    next.fixed_expenses.retain(|e| e.id != id);
    next.installment_plans.retain(|p| p.id != id);
    tracing::debug!(%id, "entry deleted");
    Ok(next)
}

/// Drop paid flags whose entry no longer exists: fixed flags without a
/// fixed expense, installment flags without a plan. Projections are
/// unaffected since they only read flags of live entries.
pub fn purge_stale_paid(ledger: &Ledger) -> Ledger {
    let mut next = ledger.clone();
    next.fixed_paid
        .retain(|key| ledger.fixed_expenses.iter().any(|e| e.id == key.entry_id));
    next.installment_paid
        .retain(|key| ledger.installment_plans.iter().any(|p| p.id == key.entry_id));
    tracing::debug!(
        removed = ledger.paid_key_count() - next.paid_key_count(),
        "stale paid flags purged"
    );
    next
}

/// The kind of entry an id refers to, used to resolve ids typed by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Income,
    Fixed,
    Installment,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Fixed => "fixed",
            Self::Installment => "installment",
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn entry_kind(ledger: &Ledger, id: EntryId) -> Option<EntryKind> {
    if ledger.income.iter().any(|e| e.id == id) {
        Some(EntryKind::Income)
    } else if ledger.fixed_expenses.iter().any(|e| e.id == id) {
        Some(EntryKind::Fixed)
    } else if ledger.installment_plans.iter().any(|p| p.id == id) {
        Some(EntryKind::Installment)
    } else {
        None
    }
}

/// Map an entry id to the occurrence source that toggling should use.
/// Income has no paid status.
pub fn occurrence_source(ledger: &Ledger, id: EntryId) -> Option<OccurrenceSource> {
    match entry_kind(ledger, id)? {
        EntryKind::Fixed => Some(OccurrenceSource::Fixed(id)),
        EntryKind::Installment => Some(OccurrenceSource::Installment(id)),
        EntryKind::Income => None,
    }
}
