mod entry;
mod ledger;
mod month;

pub use entry::{EntryId, FixedExpense, IncomeEntry, InstallmentPlan};
pub use ledger::{Ledger, PaidKey, PaidMap};
pub use month::{months_between, MonthKey};
