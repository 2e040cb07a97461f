// src/ui/widgets/input.rs

use crate::app::App;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

/// Renders the URL bar. The title lists the open tabs, the active one highlighted.
pub fn render_input(frame: &mut Frame, app: &App, area: Rect) {
    let active = app.tabs.active_index();
    let mut title = vec![Span::raw("Tabs: ")];
    for (index, tab) in app.tabs.all().iter().enumerate() {
        let style = if index == active {
            Style::new().bold().fg(Color::Yellow)
        } else {
            Style::new().fg(Color::DarkGray)
        };
        title.push(Span::styled(format!("{} ", tab.id), style));
    }

    let text = if app.is_editing() {
        app.input.clone()
    } else {
        app.tabs.active().map(|tab| tab.url).unwrap_or_else(|| "Press e to open a URL".to_string())
    };

    let input_paragraph = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(Line::from(title)))
        .style(Style::default().fg(if app.is_editing() { Color::Yellow } else { Color::White }));
    frame.render_widget(input_paragraph, area);

    if app.is_editing() {
        frame.set_cursor_position((area.x + app.input.chars().count() as u16 + 1, area.y + 1));
    }
}
