// src/ui/widgets/domain_table.rs

use crate::app::App;
use liveknoxss_rs::core::models::{Badge, DomainState};
use ratatui::{
    layout::Margin,
    prelude::*,
    widgets::{Block, Borders, Cell, Row, Scrollbar, ScrollbarOrientation, Table},
};

fn flag(value: bool) -> &'static str {
    if value { "✓" } else { "·" }
}

fn badge_style(state: &DomainState) -> Style {
    match state.badge() {
        Badge::Active => Style::default().fg(Color::Green),
        Badge::Vulnerable => Style::default().fg(Color::Red).bold(),
        Badge::Off => Style::default(),
    }
}

/// Renders every known domain with its flags, the popup's domain highlighted.
pub fn render_domain_table(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Domains ({}) (navigate with ↑ ↓)", app.snapshot.domain_state.len()));

    let current = app.snapshot.current_domain.as_str();
    let rows: Vec<Row> = app
        .snapshot
        .domain_state
        .iter()
        .skip(app.table_scroll)
        .map(|(domain, state)| {
            let name_style = if domain == current {
                Style::new().bold().fg(Color::Yellow)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(domain.as_str()).style(name_style),
                Cell::from(flag(state.active)).style(badge_style(state)),
                Cell::from(flag(state.xssed)).style(badge_style(state)),
                Cell::from(flag(state.is_second_level_domain)),
                Cell::from(flag(state.handle_subdomains)),
                Cell::from(state.parent_domain.as_str()),
                Cell::from(state.urls.len().to_string()),
            ])
        })
        .collect();

    let header = Row::new(vec!["Domain", "On", "XSS", "SLD", "Subs", "Parent", "URLs"])
        .style(Style::new().bold().fg(Color::Cyan));

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(30),
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Length(4),
            Constraint::Length(5),
            Constraint::Percentage(25),
            Constraint::Length(5),
        ],
    )
    .header(header)
    .block(block);
    frame.render_widget(table, area);

    app.table_scroll_state = app
        .table_scroll_state
        .content_length(app.snapshot.domain_state.len())
        .position(app.table_scroll);
    frame.render_stateful_widget(
        Scrollbar::new(ScrollbarOrientation::VerticalRight),
        area.inner(Margin { vertical: 1, horizontal: 0 }),
        &mut app.table_scroll_state,
    );
}
