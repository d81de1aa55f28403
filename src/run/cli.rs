use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::db::Store;
use crate::ledger::{self, InputError};
use crate::models::{EntryId, MonthKey};
use crate::session::{self, Session};
use crate::ui::util::format_amount;

pub(crate) fn as_cli(args: &[String], store: &Store) -> Result<()> {
    let rest = &args[2..];
    match args[1].as_str() {
        "register" => cli_register(rest, store),
        "login" => cli_login(rest, store),
        "logout" => cli_logout(store),
        "whoami" => cli_whoami(store),
        "passwd" => cli_passwd(rest, store),
        "add" => cli_add(rest, store),
        "list" | "ls" => cli_list(rest, store),
        "edit" => cli_edit(rest, store),
        "toggle" => cli_toggle(rest, store),
        "delete" | "rm" => cli_delete(rest, store),
        "repair" => cli_repair(store),
        "summary" | "s" => cli_summary(rest, store),
        "report" => cli_report(rest, store),
        "export" => cli_export(rest, store),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("fintrack {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("fintrack - monthly income, fixed expense and installment tracker");
    println!();
    println!("Usage: fintrack [command]");
    println!();
    println!("Commands:");
    println!("  (none)                              Launch interactive TUI");
    println!("  register <user> <password>          Create an account");
    println!("  login <user> <password>             Log in");
    println!("  logout                              Log out");
    println!("  whoami                              Show the logged-in user");
    println!("  passwd <current> <new>              Change password");
    println!("  add income <desc> <amount>          Add income, recurring from the month on");
    println!("  add expense <desc> <amount>         Add fixed expense, recurring from the month on");
    println!("  add installment <desc> <total> <n>  Split a purchase into n monthly installments");
    println!("    --month <YYYY-MM>                 Month to add to (default: current)");
    println!("  list [YYYY-MM]                      List the month's entries with ids");
    println!("  edit <id> <amount>                  Change the amount of an income or fixed expense");
    println!("  toggle <id>                         Flip paid/pending for an expense");
    println!("    --month <YYYY-MM>                 Month to toggle (default: current)");
    println!("  delete <id>                         Delete an entry from every month");
    println!("    --yes                             Skip confirmation");
    println!("  repair                              Drop paid flags left behind by deleted entries");
    println!("  summary [YYYY-MM]                   Print monthly totals");
    println!("  report [YYYY-MM]                    Print installment progress and balance breakdown");
    println!("  export [path]                       Export the month to CSV");
    println!("    --month <YYYY-MM>                 Month to export (default: current)");
    println!("  --help, -h                          Show this help");
    println!("  --version, -V                       Show version");
}

// ── Argument helpers ─────────────────────────────────────────

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

/// Arguments with `--month <value>` and bare `--flags` removed.
fn positional(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--month" {
            iter.next();
        } else if !arg.starts_with("--") {
            out.push(arg.as_str());
        }
    }
    out
}

fn parse_month(input: &str) -> Result<MonthKey> {
    MonthKey::parse(input)
        .ok_or_else(|| anyhow::anyhow!("Invalid month: {input}. Use YYYY-MM (e.g. 2024-01)"))
}

/// `--month` if given, otherwise the current month.
fn month_flag(args: &[String]) -> Result<MonthKey> {
    flag_value(args, "--month").map_or_else(|| Ok(MonthKey::current()), parse_month)
}

/// First positional argument as a month, otherwise the current month.
fn month_arg(args: &[String]) -> Result<MonthKey> {
    positional(args)
        .first()
        .map_or_else(|| Ok(MonthKey::current()), |m| parse_month(m))
}

fn parse_id(input: &str) -> Result<EntryId> {
    input
        .parse()
        .with_context(|| format!("Invalid entry id: {input}"))
}

fn require_session(store: &Store) -> Result<Session> {
    Session::resume(store)?
        .ok_or_else(|| anyhow::anyhow!("Not logged in. Run: fintrack login <user> <password>"))
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

// ── Account ──────────────────────────────────────────────────

fn cli_register(args: &[String], store: &Store) -> Result<()> {
    let [username, password] = args else {
        anyhow::bail!("Usage: fintrack register <user> <password>");
    };
    session::register(store, username, password)?;
    println!("Account created: {}", username.trim());
    Ok(())
}

fn cli_login(args: &[String], store: &Store) -> Result<()> {
    let [username, password] = args else {
        anyhow::bail!("Usage: fintrack login <user> <password>");
    };
    let session = Session::login(store, username, password)?;
    println!("Logged in as {}", session.username());
    Ok(())
}

fn cli_logout(store: &Store) -> Result<()> {
    match Session::resume(store)? {
        Some(session) => {
            let name = session.username().to_string();
            session.logout(store)?;
            println!("Logged out {name}");
        }
        None => println!("Not logged in"),
    }
    Ok(())
}

fn cli_whoami(store: &Store) -> Result<()> {
    match Session::resume(store)? {
        Some(session) => println!("{}", session.username()),
        None => println!("Not logged in"),
    }
    Ok(())
}

fn cli_passwd(args: &[String], store: &Store) -> Result<()> {
    let [current, new] = args else {
        anyhow::bail!("Usage: fintrack passwd <current> <new>");
    };
    let session = require_session(store)?;
    session.change_password(store, current, new)?;
    println!("Password changed");
    Ok(())
}

// ── Ledger ───────────────────────────────────────────────────

fn cli_add(args: &[String], store: &Store) -> Result<()> {
    let month = month_flag(args)?;
    let pos = positional(args);
    let Some((&kind, rest)) = pos.split_first() else {
        anyhow::bail!("Usage: fintrack add income|expense|installment ...");
    };

    let mut session = require_session(store)?;
    match kind {
        "income" | "expense" => {
            let [desc @ .., amount] = rest else {
                anyhow::bail!("Usage: fintrack add {kind} <desc> <amount>");
            };
            let description = desc.join(" ");
            let amount = ledger::require_amount(amount)?;
            if kind == "income" {
                session.apply(store, |l| ledger::add_income(l, &description, amount, &month))?;
            } else {
                session.apply(store, |l| {
                    ledger::add_fixed_expense(l, &description, amount, &month)
                })?;
            }
            println!("Added {kind} '{}' {} from {month}", description.trim(), format_amount(amount));
        }
        "installment" => {
            let [desc @ .., total, count] = rest else {
                anyhow::bail!("Usage: fintrack add installment <desc> <total> <count>");
            };
            let description = desc.join(" ");
            let total = ledger::require_amount(total)?;
            let count: i64 = count
                .parse()
                .map_err(|_| InputError::InvalidInstallmentCount)?;
            session.apply(store, |l| {
                ledger::add_installment_plan(l, &description, total, count, &month)
            })?;
            println!(
                "Added '{}' {} in {count} installments from {month}",
                description.trim(),
                format_amount(total)
            );
        }
        other => anyhow::bail!("Unknown entry kind: {other}. Use income, expense or installment"),
    }
    Ok(())
}

fn cli_list(args: &[String], store: &Store) -> Result<()> {
    let month = month_arg(args)?;
    let session = require_session(store)?;
    let projection = session.project(&month);

    println!("fintrack - {} - {month}", session.username());
    println!("{}", "─".repeat(64));
    if session.ledger().is_empty() {
        println!("No entries yet. Start with: fintrack add income <desc> <amount>");
        return Ok(());
    }
    if projection.income.is_empty() && projection.expenses.is_empty() {
        println!("Nothing recorded for {month}");
        return Ok(());
    }

    println!("{:<15} {:<12} {:<24} {:>12} Status", "ID", "Kind", "Description", "Amount");
    for entry in &projection.income {
        println!(
            "{:<15} {:<12} {:<24} {:>12}",
            entry.id,
            "income",
            entry.description,
            format_amount(entry.amount)
        );
    }
    for occurrence in &projection.expenses {
        let kind = if occurrence.source.is_installment() {
            "installment"
        } else {
            "fixed"
        };
        println!(
            "{:<15} {:<12} {:<24} {:>12} {}",
            occurrence.source.entry_id(),
            kind,
            occurrence.description,
            format_amount(occurrence.amount),
            if occurrence.paid { "paid" } else { "pending" }
        );
    }
    Ok(())
}

fn cli_edit(args: &[String], store: &Store) -> Result<()> {
    let [id, amount] = args else {
        anyhow::bail!("Usage: fintrack edit <id> <amount>");
    };
    let id = parse_id(id)?;
    let amount = ledger::require_amount(amount)?;
    let mut session = require_session(store)?;
    session.apply(store, |l| ledger::edit_amount(l, id, amount))?;
    println!("Entry {id} now {}", format_amount(amount));
    Ok(())
}

fn cli_toggle(args: &[String], store: &Store) -> Result<()> {
    let month = month_flag(args)?;
    let Some(id) = positional(args).first().copied() else {
        anyhow::bail!("Usage: fintrack toggle <id> [--month YYYY-MM]");
    };
    let id = parse_id(id)?;
    let mut session = require_session(store)?;

    let Some(source) = ledger::occurrence_source(session.ledger(), id) else {
        if ledger::entry_kind(session.ledger(), id).is_some() {
            anyhow::bail!("Entry {id} is income and has no paid status");
        }
        return Err(InputError::UnknownEntry(id).into());
    };
    let projection = session.project(&month);
    if !projection.expenses.iter().any(|o| o.source == source) {
        anyhow::bail!("Entry {id} has no occurrence in {month}");
    }

    session.apply(store, |l| Ok(ledger::toggle_status(l, source, &month)))?;
    let paid = session
        .project(&month)
        .expenses
        .iter()
        .any(|o| o.source == source && o.paid);
    println!("Entry {id} is {} for {month}", if paid { "paid" } else { "pending" });
    Ok(())
}

fn cli_delete(args: &[String], store: &Store) -> Result<()> {
    let Some(id) = positional(args).first().copied() else {
        anyhow::bail!("Usage: fintrack delete <id> [--yes]");
    };
    let id = parse_id(id)?;
    let mut session = require_session(store)?;
    let Some(kind) = ledger::entry_kind(session.ledger(), id) else {
        return Err(InputError::UnknownEntry(id).into());
    };

    if !has_flag(args, "--yes") && !confirm(&format!("Delete {kind} {id} from every month?"))? {
        println!("Cancelled");
        return Ok(());
    }
    session.apply(store, |l| ledger::delete_entry(l, id))?;
    println!("Deleted {kind} {id}");
    Ok(())
}

fn cli_repair(store: &Store) -> Result<()> {
    let mut session = require_session(store)?;
    let before = session.ledger().paid_key_count();
    session.apply(store, |l| Ok(ledger::purge_stale_paid(l)))?;
    let removed = before - session.ledger().paid_key_count();
    println!("Removed {removed} stale paid flags");
    Ok(())
}

// ── Reports ──────────────────────────────────────────────────

fn cli_summary(args: &[String], store: &Store) -> Result<()> {
    let month = month_arg(args)?;
    let session = require_session(store)?;
    let p = session.project(&month);

    println!("fintrack - {month}");
    println!("{}", "─".repeat(40));
    println!("  Income:        {:>14}", format_amount(p.total_income));
    println!("  Paid:          {:>14}", format_amount(p.total_expenses_paid));
    println!("  Pending:       {:>14}", format_amount(p.total_expenses_pending));
    println!("  Installments:  {:>14}", format_amount(p.total_installments));
    println!("  Free balance:  {:>14}", format_amount(p.free_balance));
    println!(
        "  Expenses:      {} paid, {} pending",
        p.paid_count(),
        p.pending_count()
    );
    Ok(())
}

fn cli_report(args: &[String], store: &Store) -> Result<()> {
    let month = month_arg(args)?;
    let session = require_session(store)?;
    let p = session.project(&month);
    let plans = ledger::plan_progress(session.ledger(), &month);
    let breakdown = ledger::balance_breakdown(&p);

    println!("fintrack report - {month}");
    println!("{}", "─".repeat(56));
    println!("  Active income:      {:>14}", format_amount(p.total_income));
    println!("  Pending expenses:   {:>14}", format_amount(p.total_expenses_pending));
    println!("  Installments:       {:>14}", format_amount(p.total_installments));
    println!(
        "  Total contracted:   {:>14}",
        format_amount(ledger::total_contracted(session.ledger()))
    );

    println!();
    println!("Installment plans:");
    if plans.is_empty() {
        println!("  (none)");
    }
    for plan in &plans {
        println!(
            "  {:<15} {:<24} {:>3}x {:>12}  {:>3} left{}",
            plan.id,
            plan.description,
            plan.installment_count,
            format_amount(plan.installment_amount),
            plan.remaining,
            if plan.active { "" } else { "  (inactive)" }
        );
    }

    println!();
    println!("Balance breakdown:");
    for (label, value) in breakdown.slices() {
        println!("  {label:<18} {:>14}", format_amount(value));
    }
    Ok(())
}

fn cli_export(args: &[String], store: &Store) -> Result<()> {
    let month = month_flag(args)?;
    let session = require_session(store)?;

    // Output path is the first non-flag argument
    let output_path = positional(args)
        .first()
        .map(|a| shellexpand(a))
        .unwrap_or_else(|| crate::export::default_path(&month));

    let projection = session.project(&month);
    let count = crate::export::export_month(Path::new(&output_path), &projection)?;
    if count == 0 {
        println!("Nothing recorded for {month}; wrote header to {output_path}");
    } else {
        println!("Exported {count} rows to {output_path}");
    }
    Ok(())
}

pub(crate) fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
