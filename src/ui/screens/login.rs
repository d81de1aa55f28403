use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::ui::theme;

pub(crate) fn render(f: &mut Frame, area: Rect) {
    let [column] = Layout::horizontal([Constraint::Length(60)])
        .flex(Flex::Center)
        .areas(area);
    let [panel] = Layout::vertical([Constraint::Length(10)])
        .flex(Flex::Center)
        .areas(column);

    let text = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "Welcome to fintrack",
            Style::default()
                .fg(theme::ACCENT)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            ":login <user> <password>",
            theme::normal_style(),
        )),
        Line::from(Span::styled(
            ":register <user> <password>",
            theme::normal_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Press ? for help, Ctrl-q to quit",
            theme::dim_style(),
        )),
    ])
    .centered()
    .block(theme::panel("Login"));
    f.render_widget(text, panel);
}
