use rust_decimal::Decimal;

use crate::models::{EntryId, IncomeEntry, Ledger, MonthKey};

/// Where an expense occurrence comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OccurrenceSource {
    Fixed(EntryId),
    Installment(EntryId),
}

impl OccurrenceSource {
    /// Id of the fixed expense or installment plan behind this occurrence.
    pub fn entry_id(&self) -> EntryId {
        match self {
            Self::Fixed(id) | Self::Installment(id) => *id,
        }
    }

    pub fn is_installment(&self) -> bool {
        matches!(self, Self::Installment(_))
    }

    /// Installment occurrences have no amount of their own to edit.
    pub fn editable_id(&self) -> Option<EntryId> {
        match self {
            Self::Fixed(id) => Some(*id),
            Self::Installment(_) => None,
        }
    }
}

/// One expense as it applies to the projected month.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseOccurrence {
    pub source: OccurrenceSource,
    /// Installments carry their position, e.g. `Laptop (2/3)`.
    pub description: String,
    pub amount: Decimal,
    pub paid: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionResult {
    pub month: MonthKey,
    pub income: Vec<IncomeEntry>,
    /// Fixed expenses first, then installments, each in storage order.
    pub expenses: Vec<ExpenseOccurrence>,
    pub total_income: Decimal,
    pub total_expenses_paid: Decimal,
    pub total_expenses_pending: Decimal,
    pub total_installments: Decimal,
    /// `total_income - total_expenses_paid`
    pub free_balance: Decimal,
}

impl ProjectionResult {
    pub fn paid_count(&self) -> usize {
        self.expenses.iter().filter(|e| e.paid).count()
    }

    pub fn pending_count(&self) -> usize {
        self.expenses.len() - self.paid_count()
    }
}

/// Derive everything that applies to `month` from the ledger.
pub fn project(ledger: &Ledger, month: &MonthKey) -> ProjectionResult {
    let income: Vec<IncomeEntry> = ledger
        .income
        .iter()
        .filter(|entry| entry.applies_to(month))
        .cloned()
        .collect();

    let fixed = ledger
        .fixed_expenses
        .iter()
        .filter(|expense| expense.applies_to(month))
        .map(|expense| ExpenseOccurrence {
            source: OccurrenceSource::Fixed(expense.id),
            description: expense.description.clone(),
            amount: expense.amount,
            paid: ledger.fixed_paid.is_paid(expense.id, month),
        });

    let installments: Vec<ExpenseOccurrence> = ledger
        .installment_plans
        .iter()
        .filter_map(|plan| {
            let index = plan.installment_index(month)?;
            Some(ExpenseOccurrence {
                source: OccurrenceSource::Installment(plan.id),
                description: format!(
                    "{} ({}/{})",
                    plan.description,
                    index + 1,
                    plan.installment_count
                ),
                amount: plan.installment_amount,
                paid: ledger.installment_paid.is_paid(plan.id, month),
            })
        })
        .collect();

    let total_installments = total(installments.iter().map(|o| o.amount));
    let expenses: Vec<ExpenseOccurrence> = fixed.chain(installments).collect();

    let total_income = total(income.iter().map(|e| e.amount));
    let total_expenses_paid = total(expenses.iter().filter(|e| e.paid).map(|e| e.amount));
    let total_expenses_pending = total(expenses.iter().filter(|e| !e.paid).map(|e| e.amount));

    ProjectionResult {
        month: month.clone(),
        income,
        expenses,
        total_income,
        total_expenses_paid,
        total_expenses_pending,
        total_installments,
        free_balance: total_income.saturating_sub(total_expenses_paid),
    }
}

/// Sum that stops at the `Decimal` bounds. Typed amounts are capped, but
/// a stored ledger is loaded as-is.
pub(super) fn total(amounts: impl Iterator<Item = Decimal>) -> Decimal {
    amounts.fold(Decimal::ZERO, Decimal::saturating_add)
}
