use rust_decimal::Decimal;

use super::projection::{total, ProjectionResult};
use crate::models::{EntryId, Ledger, MonthKey};

#[derive(Debug, Clone, PartialEq)]
pub struct PlanProgress {
    pub id: EntryId,
    pub description: String,
    pub installment_count: u32,
    pub installment_amount: Decimal,
    pub total_amount: Decimal,
    /// Installments left after the viewed month.
    pub remaining: u32,
    pub active: bool,
}

/// Progress of every installment plan as seen from `month`, including plans
/// that have not started yet or are already paid off.
pub fn plan_progress(ledger: &Ledger, month: &MonthKey) -> Vec<PlanProgress> {
    ledger
        .installment_plans
        .iter()
        .map(|plan| PlanProgress {
            id: plan.id,
            description: plan.description.clone(),
            installment_count: plan.installment_count,
            installment_amount: plan.installment_amount,
            total_amount: plan.total_amount,
            remaining: plan.remaining_after(month),
            active: plan.installment_index(month).is_some(),
        })
        .collect()
}

/// Sum of `total_amount` over every installment plan ever recorded,
/// finished and future plans included. Independent of the viewed month.
pub fn total_contracted(ledger: &Ledger) -> Decimal {
    total(ledger.installment_plans.iter().map(|plan| plan.total_amount))
}

/// How the month's income splits into free money, installments and
/// fixed expenses already paid. Negative slices are clamped to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceBreakdown {
    pub free: Decimal,
    pub installments: Decimal,
    pub fixed_paid: Decimal,
}

impl BalanceBreakdown {
    pub fn total(&self) -> Decimal {
        self.free
            .saturating_add(self.installments)
            .saturating_add(self.fixed_paid)
    }

    /// `(label, value)` slices in display order.
    pub fn slices(&self) -> [(&'static str, Decimal); 3] {
        [
            ("Free balance", self.free),
            ("Installments", self.installments),
            ("Fixed paid", self.fixed_paid),
        ]
    }
}

pub fn balance_breakdown(projection: &ProjectionResult) -> BalanceBreakdown {
    BalanceBreakdown {
        free: projection.free_balance.max(Decimal::ZERO),
        installments: projection.total_installments,
        fixed_paid: projection
            .total_expenses_paid
            .saturating_sub(projection.total_installments)
            .max(Decimal::ZERO),
    }
}
