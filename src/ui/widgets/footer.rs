// src/ui/widgets/footer.rs

use crate::app::App;
use ratatui::{
    prelude::*,
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::Paragraph,
};

fn key(label: &'static str) -> Span<'static> {
    Span::styled(label, Style::new().bold().fg(Color::Yellow))
}

/// Renders the footer widget, which displays available actions.
pub fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let line = if app.show_disclaimer {
        Line::from(vec![Span::raw("Press "), key("Enter"), Span::raw(" to continue, "), key("Q"), Span::raw(" to quit.")])
    } else if app.is_editing() {
        Line::from(vec![Span::raw("Type a URL, "), key("Enter"), Span::raw(" to load, "), key("Esc"), Span::raw(" to cancel.")])
    } else {
        Line::from(vec![
            key("[E]"),
            Span::raw("dit URL "),
            key("[N]"),
            Span::raw("ew tab "),
            key("[Tab]"),
            Span::raw(" switch "),
            key("[R]"),
            Span::raw("eload "),
            key("[T]"),
            Span::raw("oggle "),
            key("[S]"),
            Span::raw("ubdomains "),
            key("[C]"),
            Span::raw("lear "),
            key("[L]"),
            Span::raw("ogs "),
            key("[Q]"),
            Span::raw("uit"),
        ])
    };

    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}
