//! Month-indexed view over a [`Ledger`](crate::models::Ledger) and the
//! operations that change it. Everything here is pure: callers decide when
//! to persist.

mod mutations;
mod projection;
mod reports;

pub use mutations::{
    add_fixed_expense, add_income, add_installment_plan, delete_entry, edit_amount, entry_kind,
    next_id, next_id_at, occurrence_source, parse_amount, purge_stale_paid, require_amount,
    toggle_status, EntryKind, InputError,
};
pub use projection::{project, ExpenseOccurrence, OccurrenceSource, ProjectionResult};
pub use reports::{
    balance_breakdown, plan_progress, total_contracted, BalanceBreakdown, PlanProgress,
};
