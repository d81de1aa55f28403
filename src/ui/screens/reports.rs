use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, List, ListItem, Paragraph},
    Frame,
};
use rust_decimal::prelude::ToPrimitive;

use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, progress_bar, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(6)])
        .split(area);

    render_totals(f, chunks[0], app);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);

    render_plans(f, body[0], app);
    render_breakdown(f, body[1], app);
}

fn render_totals(f: &mut Frame, area: Rect, app: &App) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    let p = &app.projection;
    let totals = [
        ("Active income", p.total_income, theme::GREEN),
        ("Pending expenses", p.total_expenses_pending, theme::YELLOW),
        ("Installments", p.total_installments, theme::MAUVE),
        ("Total contracted", app.contracted, theme::RED),
    ];
    for ((title, amount, color), card) in totals.into_iter().zip(cards.iter()) {
        let text = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                format_amount(amount),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )),
        ])
        .centered()
        .block(theme::panel(title));
        f.render_widget(text, *card);
    }
}

fn render_plans(f: &mut Frame, area: Rect, app: &App) {
    if app.plans.is_empty() {
        let msg = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("No installment plans", theme::dim_style())),
            Line::from(""),
            Line::from(Span::styled(
                "Use :installment <description> <total> <count>",
                theme::dim_style(),
            )),
        ])
        .centered()
        .block(theme::panel("Installment plans"));
        f.render_widget(msg, area);
        return;
    }

    let items: Vec<ListItem> = app
        .plans
        .iter()
        .enumerate()
        .skip(app.plan_scroll)
        .take(area.height.saturating_sub(2) as usize)
        .map(|(i, plan)| {
            let done = plan.installment_count.saturating_sub(plan.remaining);
            let color = if !plan.active {
                theme::TEXT_DIM
            } else if plan.remaining == 0 {
                theme::GREEN
            } else {
                theme::ACCENT
            };
            let name_style = if i == app.plan_index {
                theme::selected_style()
            } else if plan.active {
                theme::normal_style()
            } else {
                theme::dim_style()
            };
            let marker = if plan.active { "" } else { " (not running)" };

            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<18}", truncate(&plan.description, 17)), name_style),
                Span::styled(
                    progress_bar(done, plan.installment_count, 20),
                    Style::default().fg(color),
                ),
                Span::styled(
                    format!(" {done}/{} ", plan.installment_count),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!(
                        "{} of {}{marker}",
                        format_amount(plan.installment_amount),
                        format_amount(plan.total_amount)
                    ),
                    theme::dim_style(),
                ),
            ]))
        })
        .collect();

    let list = List::new(items).block(theme::panel(format!(
        "Installment plans ({})",
        app.plans.len()
    )));
    f.render_widget(list, area);
}

fn render_breakdown(f: &mut Frame, area: Rect, app: &App) {
    let title = format!("Income breakdown, {}", app.month);
    if app.breakdown.total().is_zero() {
        let msg = Paragraph::new(Line::from(Span::styled(
            "No income this month",
            theme::dim_style(),
        )))
        .centered()
        .block(theme::panel(title));
        f.render_widget(msg, area);
        return;
    }

    let colors = [theme::GREEN, theme::MAUVE, theme::RED];
    let bars: Vec<Bar> = app
        .breakdown
        .slices()
        .into_iter()
        .zip(colors)
        .map(|((label, amount), color)| {
            Bar::default()
                .value(amount.round().to_u64().unwrap_or(0))
                .text_value(format_amount(amount))
                .label(Line::from(label))
                .style(Style::default().fg(color))
                .value_style(
                    Style::default()
                        .fg(theme::HEADER_BG)
                        .bg(color)
                        .add_modifier(Modifier::BOLD),
                )
        })
        .collect();

    let bar_width = (area.width.saturating_sub(4) / 3).clamp(3, 14);
    let chart = BarChart::default()
        .block(theme::panel(title))
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(1);
    f.render_widget(chart, area);
}
