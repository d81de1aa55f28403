use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

use crate::db::Store;
use crate::ledger;
use crate::models::EntryId;
use crate::session::Session;
use crate::ui::app::{App, DashboardRow, InputMode, PendingAction, Screen};
use crate::ui::commands;
use crate::ui::util::{format_amount, scroll_down, scroll_to_bottom, scroll_to_top, scroll_up};

pub(crate) fn as_tui(store: &Store) -> Result<()> {
    let session = Session::resume(store)?;
    let mut app = App::new(session);
    if !app.logged_in() {
        app.set_status("Log in with :login <user> <password>, or :register <user> <password>");
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, store);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        tracing::error!(error = ?e, "tui exited with error");
        eprintln!("Error: {e:?}");
    }

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    store: &Store,
) -> Result<()> {
    while app.running {
        terminal.draw(|f| {
            // tab + status + command bars, cards, borders and table header
            let content_height = f.area().height.saturating_sub(11) as usize;
            app.visible_rows = content_height.max(1);
            crate::ui::render::render(f, app);
        })?;

        if let Event::Key(key) = event::read()? {
            if key.kind != event::KeyEventKind::Press {
                continue;
            }
            if app.show_help {
                app.show_help = false;
                continue;
            }
            match app.input_mode {
                InputMode::Normal => handle_normal_input(key, app, store)?,
                InputMode::Command => handle_command_input(key, app, store)?,
                InputMode::Editing => handle_editing_input(key, app, store)?,
                InputMode::Confirm => handle_confirm_input(key, app, store)?,
            }
        }
    }
    Ok(())
}

// ── Input handlers ───────────────────────────────────────────

fn handle_normal_input(key: event::KeyEvent, app: &mut App, store: &Store) -> Result<()> {
    match key.code {
        KeyCode::Char(':') => {
            app.input_mode = InputMode::Command;
            app.command_input.clear();
            return Ok(());
        }
        KeyCode::Char('q') | KeyCode::Char('c')
            if key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            app.running = false;
            return Ok(());
        }
        KeyCode::Char('?') => {
            app.show_help = true;
            return Ok(());
        }
        KeyCode::Esc => {
            app.status_message.clear();
            return Ok(());
        }
        _ => {}
    }

    if !app.logged_in() {
        return Ok(());
    }

    match key.code {
        KeyCode::Char('j') | KeyCode::Down => handle_move_down(app),
        KeyCode::Char('k') | KeyCode::Up => handle_move_up(app),
        KeyCode::Char('g') => handle_goto_top(app),
        KeyCode::Char('G') => handle_goto_bottom(app),
        KeyCode::Char('1') => app.screen = Screen::Dashboard,
        KeyCode::Char('2') => app.screen = Screen::Reports,
        KeyCode::Char('3') => app.screen = Screen::Account,
        KeyCode::Tab => {
            let screens = Screen::all();
            let idx = screens.iter().position(|s| *s == app.screen).unwrap_or(0);
            app.screen = screens[(idx + 1) % screens.len()];
        }
        KeyCode::BackTab => {
            let screens = Screen::all();
            let idx = screens.iter().position(|s| *s == app.screen).unwrap_or(0);
            app.screen = screens[(idx + screens.len() - 1) % screens.len()];
        }
        KeyCode::Char('H') => commands::handle_command("prev-month", app, store)?,
        KeyCode::Char('L') => commands::handle_command("next-month", app, store)?,
        KeyCode::Char(' ') if app.screen == Screen::Dashboard => handle_toggle(app, store)?,
        KeyCode::Char('e') if app.screen == Screen::Dashboard => handle_start_edit(app),
        KeyCode::Char('D') if app.screen == Screen::Dashboard => {
            commands::handle_command("delete", app, store)?;
        }
        _ => {}
    }
    Ok(())
}

fn handle_command_input(key: event::KeyEvent, app: &mut App, store: &Store) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            let input = app.command_input.clone();
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
            commands::handle_command(&input, app, store)?;
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
        }
        KeyCode::Backspace => {
            app.command_input.pop();
            if app.command_input.is_empty() {
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.command_input.clear();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Char('w') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let trimmed = app.command_input.trim_end();
            if let Some(pos) = trimmed.rfind(' ') {
                app.command_input.truncate(pos + 1);
            } else {
                app.command_input.clear();
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char(c) => {
            app.command_input.push(c);
        }
        _ => {}
    }
    Ok(())
}

fn handle_editing_input(key: event::KeyEvent, app: &mut App, store: &Store) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            let input = std::mem::take(&mut app.command_input);
            app.input_mode = InputMode::Normal;
            if let Some(id) = app.edit_target.take() {
                let result = apply_edit(app, store, id, &input);
                app.report(result)?;
            }
        }
        KeyCode::Esc => {
            app.command_input.clear();
            app.edit_target = None;
            app.input_mode = InputMode::Normal;
            app.set_status("Edit cancelled");
        }
        KeyCode::Backspace => {
            app.command_input.pop();
        }
        KeyCode::Char(c) => {
            app.command_input.push(c);
        }
        _ => {}
    }
    Ok(())
}

fn handle_confirm_input(key: event::KeyEvent, app: &mut App, store: &Store) -> Result<()> {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            if let Some(action) = app.pending_action.take() {
                match action {
                    PendingAction::DeleteEntry { id, description } => {
                        let result = apply_delete(app, store, id, &description);
                        app.report(result)?;
                    }
                }
            }
        }
        _ => {
            app.pending_action = None;
            app.set_status("Cancelled");
        }
    }
    app.confirm_message.clear();
    app.input_mode = InputMode::Normal;
    Ok(())
}

// ── Actions ──────────────────────────────────────────────────

fn apply_edit(app: &mut App, store: &Store, id: EntryId, input: &str) -> Result<()> {
    let amount = ledger::require_amount(input)?;
    app.apply(store, |l| ledger::edit_amount(l, id, amount))?;
    app.set_status(format!("Amount set to {}", format_amount(amount)));
    Ok(())
}

fn apply_delete(app: &mut App, store: &Store, id: EntryId, description: &str) -> Result<()> {
    app.apply(store, |l| ledger::delete_entry(l, id))?;
    app.set_status(format!("Deleted: {description}"));
    Ok(())
}

fn handle_toggle(app: &mut App, store: &Store) -> Result<()> {
    match app.selected_row() {
        Some(DashboardRow::Expense(source)) => {
            let month = app.month.clone();
            let result = app.apply(store, |l| Ok(ledger::toggle_status(l, source, &month)));
            app.report(result)?;
        }
        Some(DashboardRow::Income(_)) => app.set_status("Income has no paid status"),
        None => app.set_status("Nothing selected"),
    }
    Ok(())
}

fn handle_start_edit(app: &mut App) {
    let id = match app.selected_row() {
        Some(DashboardRow::Income(id)) => id,
        Some(DashboardRow::Expense(source)) => match source.editable_id() {
            Some(id) => id,
            None => {
                app.set_status("Installment amounts cannot be edited");
                return;
            }
        },
        None => {
            app.set_status("Nothing selected");
            return;
        }
    };
    app.edit_target = Some(id);
    app.command_input.clear();
    app.input_mode = InputMode::Editing;
}

// ── Movement ─────────────────────────────────────────────────

fn handle_move_down(app: &mut App) {
    let page = app.visible_rows;
    match app.screen {
        Screen::Dashboard => {
            let len = app.row_count();
            scroll_down(&mut app.row_index, &mut app.row_scroll, len, page);
        }
        Screen::Reports => {
            let len = app.plans.len();
            scroll_down(&mut app.plan_index, &mut app.plan_scroll, len, page);
        }
        Screen::Account => {}
    }
}

fn handle_move_up(app: &mut App) {
    match app.screen {
        Screen::Dashboard => scroll_up(&mut app.row_index, &mut app.row_scroll),
        Screen::Reports => scroll_up(&mut app.plan_index, &mut app.plan_scroll),
        Screen::Account => {}
    }
}

fn handle_goto_top(app: &mut App) {
    match app.screen {
        Screen::Dashboard => scroll_to_top(&mut app.row_index, &mut app.row_scroll),
        Screen::Reports => scroll_to_top(&mut app.plan_index, &mut app.plan_scroll),
        Screen::Account => {}
    }
}

fn handle_goto_bottom(app: &mut App) {
    let page = app.visible_rows;
    match app.screen {
        Screen::Dashboard => {
            let len = app.row_count();
            scroll_to_bottom(&mut app.row_index, &mut app.row_scroll, len, page);
        }
        Screen::Reports => {
            let len = app.plans.len();
            scroll_to_bottom(&mut app.plan_index, &mut app.plan_scroll, len, page);
        }
        Screen::Account => {}
    }
}
