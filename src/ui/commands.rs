use std::collections::HashMap;
use std::sync::LazyLock;

use super::app::{App, DashboardRow, InputMode, PendingAction, Screen};
use crate::db::Store;
use crate::ledger;
use crate::models::MonthKey;
use crate::session::{self, Session};

pub(crate) struct Command {
    pub(crate) description: &'static str,
    pub(crate) run: fn(&str, &mut App, &Store) -> anyhow::Result<()>,
    /// Whether the command works from the login screen.
    pub(crate) open: bool,
}

macro_rules! register_command {
    (open $name:expr, $desc:expr, $func:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                description: $desc,
                run: $func,
                open: true,
            },
        );
    }};
    ($name:expr, $desc:expr, $func:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                description: $desc,
                run: $func,
                open: false,
            },
        );
    }};
}

pub(crate) static COMMANDS: LazyLock<HashMap<&str, Command>> = LazyLock::new(|| {
    let mut r: HashMap<&str, Command> = HashMap::new();

    register_command!(open "q", "Quit fintrack", cmd_quit, r);
    register_command!(open "quit", "Quit fintrack", cmd_quit, r);
    register_command!(open "help", "Show available commands", cmd_help, r);
    register_command!(open "h", "Show available commands", cmd_help, r);
    register_command!(
        open "login",
        "Log in (e.g. :login alice secret)",
        cmd_login,
        r
    );
    register_command!(
        open "register",
        "Create an account (e.g. :register alice secret)",
        cmd_register,
        r
    );
    register_command!("d", "Go to Dashboard", cmd_dashboard, r);
    register_command!("dashboard", "Go to Dashboard", cmd_dashboard, r);
    register_command!("r", "Go to Reports", cmd_reports, r);
    register_command!("reports", "Go to Reports", cmd_reports, r);
    register_command!("a", "Go to Account", cmd_account, r);
    register_command!("account", "Go to Account", cmd_account, r);
    register_command!(
        "income",
        "Add income from this month on (e.g. :income Salary 5000)",
        cmd_income,
        r
    );
    register_command!(
        "expense",
        "Add fixed expense from this month on (e.g. :expense Rent 1500)",
        cmd_expense,
        r
    );
    register_command!(
        "installment",
        "Add installment purchase (e.g. :installment Laptop 1200 3)",
        cmd_installment,
        r
    );
    register_command!("month", "Set month (e.g. :month 2024-01)", cmd_month, r);
    register_command!("m", "Set month (e.g. :m 2024-01)", cmd_month, r);
    register_command!("next-month", "Go to next month", cmd_next_month, r);
    register_command!("prev-month", "Go to previous month", cmd_prev_month, r);
    register_command!(
        "passwd",
        "Change password (e.g. :passwd old new)",
        cmd_passwd,
        r
    );
    register_command!("logout", "Log out", cmd_logout, r);
    register_command!(
        "export",
        "Export this month to CSV (e.g. :export ~/jan.csv)",
        cmd_export,
        r
    );
    register_command!("delete", "Delete the selected entry", cmd_delete, r);
    register_command!(
        "repair",
        "Drop paid flags left behind by deleted entries",
        cmd_repair,
        r
    );

    r
});

pub(crate) fn handle_command(input: &str, app: &mut App, store: &Store) -> anyhow::Result<()> {
    let trimmed = input.trim();
    let mut parts = trimmed.splitn(2, ' ');
    let cmd_name = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    if let Some(cmd) = COMMANDS.get(cmd_name) {
        if !cmd.open && !app.logged_in() {
            app.set_status("Log in first: :login <user> <password>");
            return Ok(());
        }
        let result = (cmd.run)(args, app, store);
        app.report(result)?;
    } else {
        // Try fuzzy match
        let suggestion = find_closest(cmd_name);
        app.set_status(format!(
            "Unknown command: :{cmd_name}. Did you mean :{suggestion}?"
        ));
    }

    Ok(())
}

fn find_closest(input: &str) -> String {
    COMMANDS
        .keys()
        .filter(|k| k.len() > 1) // skip single-letter aliases for suggestions
        .min_by_key(|k| levenshtein(input, k))
        .unwrap_or(&"help")
        .to_string()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Split `args` into a leading free-text part and `n` trailing tokens,
/// e.g. `"Rent flat 2 1500"` with `n = 1` gives `("Rent flat 2", ["1500"])`.
fn split_trailing(args: &str, n: usize) -> Option<(String, Vec<&str>)> {
    let tokens: Vec<&str> = args.split_whitespace().collect();
    if tokens.len() < n + 1 {
        return None;
    }
    let (head, tail) = tokens.split_at(tokens.len() - n);
    Some((head.join(" "), tail.to_vec()))
}

// ── Command implementations ──────────────────────────────────

fn cmd_quit(_args: &str, app: &mut App, _store: &Store) -> anyhow::Result<()> {
    app.running = false;
    Ok(())
}

fn cmd_help(_args: &str, app: &mut App, _store: &Store) -> anyhow::Result<()> {
    app.show_help = true;
    Ok(())
}

fn cmd_login(args: &str, app: &mut App, store: &Store) -> anyhow::Result<()> {
    if let Some(user) = app.username().map(str::to_string) {
        app.set_status(format!("Already logged in as {user}. Use :logout first"));
        return Ok(());
    }
    let parts: Vec<&str> = args.split_whitespace().collect();
    let &[username, password] = parts.as_slice() else {
        app.set_status("Usage: :login <user> <password>");
        return Ok(());
    };

    let session = Session::login(store, username, password)?;
    app.set_status(format!("Logged in as {}", session.username()));
    app.session = Some(session);
    app.screen = Screen::Dashboard;
    app.refresh();
    Ok(())
}

fn cmd_register(args: &str, app: &mut App, store: &Store) -> anyhow::Result<()> {
    let parts: Vec<&str> = args.split_whitespace().collect();
    let &[username, password] = parts.as_slice() else {
        app.set_status("Usage: :register <user> <password>");
        return Ok(());
    };

    session::register(store, username, password)?;
    app.set_status(format!("Account created. Log in with :login {username} <password>"));
    Ok(())
}

fn cmd_logout(_args: &str, app: &mut App, store: &Store) -> anyhow::Result<()> {
    if let Some(session) = app.session.take() {
        session.logout(store)?;
    }
    app.screen = Screen::Dashboard;
    app.input_mode = InputMode::Normal;
    app.pending_action = None;
    app.refresh();
    app.set_status("Logged out");
    Ok(())
}

fn cmd_dashboard(_args: &str, app: &mut App, _store: &Store) -> anyhow::Result<()> {
    app.screen = Screen::Dashboard;
    Ok(())
}

fn cmd_reports(_args: &str, app: &mut App, _store: &Store) -> anyhow::Result<()> {
    app.screen = Screen::Reports;
    Ok(())
}

fn cmd_account(_args: &str, app: &mut App, _store: &Store) -> anyhow::Result<()> {
    app.screen = Screen::Account;
    Ok(())
}

fn cmd_income(args: &str, app: &mut App, store: &Store) -> anyhow::Result<()> {
    let Some((description, rest)) = split_trailing(args, 1) else {
        app.set_status("Usage: :income <description> <amount>");
        return Ok(());
    };
    let amount = ledger::require_amount(rest[0])?;
    let month = app.month.clone();
    app.apply(store, |l| ledger::add_income(l, &description, amount, &month))?;
    app.set_status(format!("Added income: {description}"));
    Ok(())
}

fn cmd_expense(args: &str, app: &mut App, store: &Store) -> anyhow::Result<()> {
    let Some((description, rest)) = split_trailing(args, 1) else {
        app.set_status("Usage: :expense <description> <amount>");
        return Ok(());
    };
    let amount = ledger::require_amount(rest[0])?;
    let month = app.month.clone();
    app.apply(store, |l| ledger::add_fixed_expense(l, &description, amount, &month))?;
    app.set_status(format!("Added fixed expense: {description}"));
    Ok(())
}

fn cmd_installment(args: &str, app: &mut App, store: &Store) -> anyhow::Result<()> {
    let Some((description, rest)) = split_trailing(args, 2) else {
        app.set_status("Usage: :installment <description> <total> <count>");
        return Ok(());
    };
    let total = ledger::require_amount(rest[0])?;
    let Ok(count) = rest[1].parse::<i64>() else {
        app.set_status(format!("Invalid installment count: {}", rest[1]));
        return Ok(());
    };
    let month = app.month.clone();
    app.apply(store, |l| {
        ledger::add_installment_plan(l, &description, total, count, &month)
    })?;
    app.set_status(format!("Added {count}x installment: {description}"));
    Ok(())
}

fn cmd_month(args: &str, app: &mut App, _store: &Store) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_month(MonthKey::current());
        return Ok(());
    }

    // Accept formats like "2024-01", "01", "1"
    let input = if args.len() <= 2 {
        let year = app
            .month
            .year_month()
            .map_or_else(|| chrono::Local::now().format("%Y").to_string(), |(y, _)| y.to_string());
        format!("{year}-{args:0>2}")
    } else {
        args.to_string()
    };

    match MonthKey::parse(&input) {
        Some(month) => app.set_month(month),
        None => app.set_status("Invalid month format. Use YYYY-MM (e.g. 2024-01)"),
    }
    Ok(())
}

fn cmd_next_month(_args: &str, app: &mut App, _store: &Store) -> anyhow::Result<()> {
    advance_month(app, 1);
    Ok(())
}

fn cmd_prev_month(_args: &str, app: &mut App, _store: &Store) -> anyhow::Result<()> {
    advance_month(app, -1);
    Ok(())
}

fn advance_month(app: &mut App, delta: i32) {
    match app.month.offset(delta) {
        Some(month) => app.set_month(month),
        None => app.set_status("No month in that direction"),
    }
}

fn cmd_passwd(args: &str, app: &mut App, store: &Store) -> anyhow::Result<()> {
    let parts: Vec<&str> = args.split_whitespace().collect();
    let &[current, new] = parts.as_slice() else {
        app.set_status("Usage: :passwd <current> <new>");
        return Ok(());
    };
    let Some(session) = app.session.as_ref() else {
        return Ok(());
    };
    session.change_password(store, current, new)?;
    app.set_status("Password changed");
    Ok(())
}

fn cmd_export(args: &str, app: &mut App, _store: &Store) -> anyhow::Result<()> {
    let path = if args.is_empty() {
        crate::export::default_path(&app.month)
    } else {
        crate::run::shellexpand(args)
    };

    let count = match crate::export::export_month(std::path::Path::new(&path), &app.projection) {
        Ok(count) => count,
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "export failed");
            app.set_status(format!("Error: {e:#}"));
            return Ok(());
        }
    };
    if count == 0 {
        app.set_status(format!("Nothing recorded for {}; wrote header to {path}", app.month));
    } else {
        app.set_status(format!("Exported {count} rows to {path}"));
    }
    Ok(())
}

fn cmd_delete(_args: &str, app: &mut App, _store: &Store) -> anyhow::Result<()> {
    if app.screen != Screen::Dashboard {
        app.set_status("Navigate to Dashboard and select an entry first");
        return Ok(());
    }
    let (Some(row), Some(description)) = (app.selected_row(), app.selected_description()) else {
        app.set_status("Nothing selected");
        return Ok(());
    };

    let id = match row {
        DashboardRow::Income(id) => id,
        DashboardRow::Expense(source) => source.entry_id(),
    };
    app.confirm_message = format!("Delete '{description}' from every month?");
    app.pending_action = Some(PendingAction::DeleteEntry { id, description });
    app.input_mode = InputMode::Confirm;
    Ok(())
}

fn cmd_repair(_args: &str, app: &mut App, store: &Store) -> anyhow::Result<()> {
    let Some(before) = app.session.as_ref().map(|s| s.ledger().paid_key_count()) else {
        return Ok(());
    };
    app.apply(store, |l| Ok(ledger::purge_stale_paid(l)))?;
    let after = app.session.as_ref().map_or(0, |s| s.ledger().paid_key_count());
    app.set_status(format!("Removed {} stale paid flags", before - after));
    Ok(())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
