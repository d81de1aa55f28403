use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::ui::app::App;
use crate::ui::theme;

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let Some(session) = app.session.as_ref() else {
        return;
    };
    let ledger = session.ledger();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(4)])
        .split(area);

    let label = |text: &str| Span::styled(format!("  {text:<20}"), theme::dim_style());
    let value = |text: String| Span::styled(text, theme::normal_style());

    let paid_marks = ledger.fixed_paid.iter().filter(|(_, paid)| *paid).count()
        + ledger.installment_paid.iter().filter(|(_, paid)| *paid).count();

    let summary = Paragraph::new(vec![
        Line::from(""),
        Line::from(vec![
            label("User"),
            Span::styled(
                session.username().to_string(),
                Style::default()
                    .fg(theme::ACCENT)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![label("Income entries"), value(ledger.income.len().to_string())]),
        Line::from(vec![
            label("Fixed expenses"),
            value(ledger.fixed_expenses.len().to_string()),
        ]),
        Line::from(vec![
            label("Installment plans"),
            value(ledger.installment_plans.len().to_string()),
        ]),
        Line::from(vec![label("Months marked paid"), value(paid_marks.to_string())]),
    ])
    .block(theme::panel("Account"));
    f.render_widget(summary, chunks[0]);

    let hints = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "  :passwd <current> <new>   Change password",
            theme::normal_style(),
        )),
        Line::from(Span::styled(
            "  :logout                   End the session on this machine",
            theme::normal_style(),
        )),
        Line::from(Span::styled(
            "  :export [path]            Write the viewed month to CSV",
            theme::normal_style(),
        )),
        Line::from(Span::styled(
            "  :repair                   Drop paid flags of deleted entries",
            theme::normal_style(),
        )),
    ])
    .block(theme::panel("Actions"));
    f.render_widget(hints, chunks[1]);
}
