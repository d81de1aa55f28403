use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::month::{months_between, MonthKey};

/// Creation-order token shared by all entry collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub i64);

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

impl std::str::FromStr for EntryId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().trim_start_matches('#').parse().map(Self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeEntry {
    pub id: EntryId,
    pub description: String,
    pub amount: Decimal,
    /// First month the income counts towards.
    pub month: MonthKey,
}

impl IncomeEntry {
    pub fn applies_to(&self, month: &MonthKey) -> bool {
        self.month <= *month
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedExpense {
    pub id: EntryId,
    pub description: String,
    pub amount: Decimal,
    /// Recurs from this month onwards, inclusive.
    pub month: MonthKey,
}

impl FixedExpense {
    pub fn applies_to(&self, month: &MonthKey) -> bool {
        self.month <= *month
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallmentPlan {
    pub id: EntryId,
    pub description: String,
    pub total_amount: Decimal,
    /// Fixed at creation; never recomputed from `total_amount`.
    pub installment_amount: Decimal,
    pub installment_count: u32,
    pub start_month: MonthKey,
}

impl InstallmentPlan {
    /// Build a plan, splitting `total_amount` evenly. `None` when `installment_count` is 0.
    pub fn new(
        id: EntryId,
        description: String,
        total_amount: Decimal,
        installment_count: u32,
        start_month: MonthKey,
    ) -> Option<Self> {
        let installment_amount = total_amount.checked_div(Decimal::from(installment_count))?;
        Some(Self {
            id,
            description,
            total_amount,
            installment_amount,
            installment_count,
            start_month,
        })
    }

    /// Zero-based installment index for `month`, or `None` outside the plan.
    pub fn installment_index(&self, month: &MonthKey) -> Option<u32> {
        let diff = months_between(&self.start_month, month);
        u32::try_from(diff)
            .ok()
            .filter(|index| *index < self.installment_count)
    }

    /// Installments still due after `month`, between zero and the count.
    pub fn remaining_after(&self, month: &MonthKey) -> u32 {
        let count = i64::from(self.installment_count);
        let left = count - i64::from(months_between(&self.start_month, month)) - 1;
        u32::try_from(left.clamp(0, count)).unwrap_or(self.installment_count)
    }
}
