use anyhow::Result;
use rust_decimal::Decimal;

use crate::auth::AuthError;
use crate::db::Store;
use crate::ledger::{
    self, balance_breakdown, plan_progress, total_contracted, BalanceBreakdown, InputError,
    OccurrenceSource, PlanProgress, ProjectionResult,
};
use crate::models::{EntryId, Ledger, MonthKey};
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Dashboard,
    Reports,
    Account,
}

impl Screen {
    pub(crate) fn all() -> &'static [Screen] {
        &[Self::Dashboard, Self::Reports, Self::Account]
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dashboard => write!(f, "Dashboard"),
            Self::Reports => write!(f, "Reports"),
            Self::Account => write!(f, "Account"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Command,
    Editing,
    Confirm,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Command => write!(f, "COMMAND"),
            Self::Editing => write!(f, "EDIT"),
            Self::Confirm => write!(f, "CONFIRM"),
        }
    }
}

/// Pending action that requires user confirmation.
#[derive(Debug, Clone)]
pub(crate) enum PendingAction {
    DeleteEntry { id: EntryId, description: String },
}

/// A row under the dashboard cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DashboardRow {
    Income(EntryId),
    Expense(OccurrenceSource),
}

pub(crate) struct App {
    pub(crate) running: bool,
    pub(crate) screen: Screen,
    pub(crate) input_mode: InputMode,
    pub(crate) command_input: String,
    pub(crate) status_message: String,
    pub(crate) show_help: bool,
    pub(crate) month: MonthKey,
    pub(crate) session: Option<Session>,

    // Derived from the session ledger for `month`
    pub(crate) projection: ProjectionResult,
    pub(crate) plans: Vec<PlanProgress>,
    pub(crate) breakdown: BalanceBreakdown,
    /// Across all plans, not only the viewed month's.
    pub(crate) contracted: Decimal,

    // Dashboard cursor runs over income rows, then expense rows
    pub(crate) row_index: usize,
    pub(crate) row_scroll: usize,

    // Reports
    pub(crate) plan_index: usize,
    pub(crate) plan_scroll: usize,

    // Editing
    pub(crate) edit_target: Option<EntryId>,

    // Confirmation
    pub(crate) pending_action: Option<PendingAction>,
    pub(crate) confirm_message: String,

    // Layout (updated each render frame)
    pub(crate) visible_rows: usize,
}

impl App {
    pub(crate) fn new(session: Option<Session>) -> Self {
        let month = MonthKey::current();
        let projection = ledger::project(&Ledger::default(), &month);
        let breakdown = balance_breakdown(&projection);
        let mut app = Self {
            running: true,
            screen: Screen::Dashboard,
            input_mode: InputMode::Normal,
            command_input: String::new(),
            status_message: String::new(),
            show_help: false,
            month,
            session,

            projection,
            plans: Vec::new(),
            breakdown,
            contracted: Decimal::ZERO,

            row_index: 0,
            row_scroll: 0,

            plan_index: 0,
            plan_scroll: 0,

            edit_target: None,

            pending_action: None,
            confirm_message: String::new(),

            visible_rows: 20,
        };
        app.refresh();
        app
    }

    pub(crate) fn logged_in(&self) -> bool {
        self.session.is_some()
    }

    pub(crate) fn username(&self) -> Option<&str> {
        self.session.as_ref().map(Session::username)
    }

    /// Recompute everything derived from the ledger and selected month.
    pub(crate) fn refresh(&mut self) {
        let empty = Ledger::default();
        let ledger = self.session.as_ref().map_or(&empty, Session::ledger);
        self.projection = ledger::project(ledger, &self.month);
        self.plans = plan_progress(ledger, &self.month);
        self.breakdown = balance_breakdown(&self.projection);
        self.contracted = total_contracted(ledger);

        let rows = self.row_count();
        if self.row_index >= rows {
            self.row_index = rows.saturating_sub(1);
        }
        self.row_scroll = self.row_scroll.min(self.row_index);
        if self.plan_index >= self.plans.len() {
            self.plan_index = self.plans.len().saturating_sub(1);
        }
        self.plan_scroll = self.plan_scroll.min(self.plan_index);
    }

    pub(crate) fn set_month(&mut self, month: MonthKey) {
        self.set_status(format!("Month: {month}"));
        self.month = month;
        self.row_index = 0;
        self.row_scroll = 0;
        self.refresh();
    }

    pub(crate) fn row_count(&self) -> usize {
        self.projection.income.len() + self.projection.expenses.len()
    }

    pub(crate) fn selected_row(&self) -> Option<DashboardRow> {
        let income = &self.projection.income;
        if let Some(entry) = income.get(self.row_index) {
            return Some(DashboardRow::Income(entry.id));
        }
        self.projection
            .expenses
            .get(self.row_index - income.len())
            .map(|occurrence| DashboardRow::Expense(occurrence.source))
    }

    /// Description shown for the selected row, without the `(n/total)` suffix.
    pub(crate) fn selected_description(&self) -> Option<String> {
        let ledger = self.session.as_ref()?.ledger();
        match self.selected_row()? {
            DashboardRow::Income(id) => ledger
                .income
                .iter()
                .find(|e| e.id == id)
                .map(|e| e.description.clone()),
            DashboardRow::Expense(OccurrenceSource::Fixed(id)) => ledger
                .fixed_expenses
                .iter()
                .find(|e| e.id == id)
                .map(|e| e.description.clone()),
            DashboardRow::Expense(OccurrenceSource::Installment(id)) => ledger
                .installment_plans
                .iter()
                .find(|p| p.id == id)
                .map(|p| p.description.clone()),
        }
    }

    /// Run a ledger mutation on the logged-in session and refresh the view.
    pub(crate) fn apply<F>(&mut self, store: &Store, mutation: F) -> Result<()>
    where
        F: FnOnce(&Ledger) -> std::result::Result<Ledger, InputError>,
    {
        let Some(session) = self.session.as_mut() else {
            self.set_status("Log in first: :login <user> <password>");
            return Ok(());
        };
        session.apply(store, mutation)?;
        self.refresh();
        Ok(())
    }

    /// Surface rejected input in the status line. Anything else is a real
    /// failure and propagates.
    pub(crate) fn report(&mut self, result: Result<()>) -> Result<()> {
        match result {
            Ok(()) => Ok(()),
            Err(e) if is_user_error(&e) => {
                self.set_status(format!("Error: {e}"));
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }
}

pub(crate) fn is_user_error(e: &anyhow::Error) -> bool {
    e.downcast_ref::<InputError>().is_some() || e.downcast_ref::<AuthError>().is_some()
}
