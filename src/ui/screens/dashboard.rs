use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table},
    Frame,
};
use rust_decimal::Decimal;

use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Summary cards
            Constraint::Min(4),    // Entries
        ])
        .split(area);

    render_summary_cards(f, chunks[0], app);
    render_entries(f, chunks[1], app);
}

fn render_summary_cards(f: &mut Frame, area: Rect, app: &App) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    let p = &app.projection;
    let free_color = if p.free_balance >= Decimal::ZERO {
        theme::GREEN
    } else {
        theme::RED
    };

    render_card(
        f,
        cards[0],
        "Income",
        p.total_income,
        theme::GREEN,
        format!("{} entries", p.income.len()),
    );
    render_card(
        f,
        cards[1],
        "Paid",
        p.total_expenses_paid,
        theme::ACCENT,
        format!("{} paid", p.paid_count()),
    );
    render_card(
        f,
        cards[2],
        "Pending",
        p.total_expenses_pending,
        theme::YELLOW,
        format!("{} pending", p.pending_count()),
    );
    render_card(
        f,
        cards[3],
        "Free balance",
        p.free_balance,
        free_color,
        String::new(),
    );
}

fn render_card(
    f: &mut Frame,
    area: Rect,
    title: &str,
    amount: Decimal,
    color: Color,
    subtitle: String,
) {
    let text = Paragraph::new(vec![
        Line::from(Span::styled(
            format_amount(amount),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(subtitle, theme::dim_style())),
    ])
    .centered()
    .block(theme::panel(title));

    f.render_widget(text, area);
}

fn render_entries(f: &mut Frame, area: Rect, app: &App) {
    let p = &app.projection;
    let title = format!("{} ({} entries)", app.month, app.row_count());

    if app.row_count() == 0 {
        let msg = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("Nothing recorded for this month", theme::dim_style())),
            Line::from(""),
            Line::from(Span::styled(
                "Add one with :income, :expense or :installment",
                theme::dim_style(),
            )),
        ])
        .centered()
        .block(theme::panel(title));
        f.render_widget(msg, area);
        return;
    }

    let header = Row::new(
        ["Kind", "Description", "Amount", "Status"]
            .iter()
            .map(|h| Cell::from(*h).style(theme::header_style())),
    )
    .height(1);

    let income_rows = p.income.iter().map(|entry| {
        (
            Cell::from(Span::styled("income", theme::income_style())),
            entry.description.as_str(),
            Span::styled(format!("+{}", format_amount(entry.amount)), theme::income_style()),
            Cell::from(""),
        )
    });
    let expense_rows = p.expenses.iter().map(|occurrence| {
        let kind = if occurrence.source.is_installment() {
            Span::styled("installment", Style::default().fg(theme::MAUVE))
        } else {
            Span::styled("fixed", theme::expense_style())
        };
        let status = if occurrence.paid {
            Span::styled("● paid", theme::paid_style())
        } else {
            Span::styled("○ pending", theme::pending_style())
        };
        (
            Cell::from(kind),
            occurrence.description.as_str(),
            Span::styled(format_amount(occurrence.amount), theme::expense_style()),
            Cell::from(status),
        )
    });

    let rows: Vec<Row> = income_rows
        .chain(expense_rows)
        .enumerate()
        .skip(app.row_scroll)
        .take(area.height.saturating_sub(3) as usize)
        .map(|(i, (kind, description, amount, status))| {
            let style = if i == app.row_index {
                theme::selected_style()
            } else if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };
            Row::new(vec![
                kind,
                Cell::from(truncate(description, 48)),
                Cell::from(amount),
                status,
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(12),
        Constraint::Min(20),
        Constraint::Length(16),
        Constraint::Length(11),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(theme::panel(title));
    f.render_widget(table, area);
}
