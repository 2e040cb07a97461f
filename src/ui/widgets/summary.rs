// src/ui/widgets/summary.rs

use crate::app::App;
use liveknoxss_rs::core::models::Badge;
use ratatui::{
    prelude::*,
    text::Line,
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

/// Renders the status panel: what the popup would show for the active tab,
/// followed by the most recent notifications.
///
/// # Arguments
/// * `frame` - The `Frame` used for rendering the UI.
/// * `app` - The application state, holding the toolbar and the latest snapshot.
/// * `area` - The `Rect` defining the drawable area for this widget.
pub fn render_summary(frame: &mut Frame, app: &App, area: Rect) {
    let container = Block::default().borders(Borders::ALL).title("Status");
    let inner = container.inner(area);
    frame.render_widget(container, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Badge
            Constraint::Length(6), // Popup
            Constraint::Min(0),    // Notifications
        ])
        .split(inner);

    // --- Badge ---
    let badge = app.toolbar.badge();
    let badge_color = badge.color().parse::<Color>().unwrap_or(Color::DarkGray);
    let badge_text = match badge {
        Badge::Off => "off".to_string(),
        _ => badge.text().to_string(),
    };
    let badge_line = Line::from(vec![
        Span::raw("Badge: "),
        Span::styled(format!("[{}]", badge_text), Style::new().bold().fg(badge_color)),
    ]);
    frame.render_widget(Paragraph::new(badge_line), chunks[0]);

    // --- Popup ---
    let popup_lines = match app.popup_state() {
        Some((domain, state)) => {
            let mut lines = vec![
                Line::from(Span::styled(domain, Style::new().bold())),
                Line::from(format!("Scanning: {}", if state.active { "on" } else { "off" })),
            ];
            if state.is_second_level_domain {
                lines.push(Line::from(format!(
                    "Handle subdomains: {}",
                    if state.handle_subdomains { "yes" } else { "no" }
                )));
            } else {
                lines.push(Line::from(format!("Parent: {}", state.parent_domain)));
            }
            for url in &state.urls {
                lines.push(Line::from(Span::styled(url.clone(), Style::default().fg(Color::Red))));
            }
            lines
        }
        None => vec![Line::from("No domain selected.".italic())],
    };
    frame.render_widget(
        Paragraph::new(popup_lines)
            .block(Block::default().title("POPUP".bold()))
            .wrap(Wrap { trim: true }),
        chunks[1],
    );

    // --- Notifications ---
    let items: Vec<ListItem> = app
        .toolbar
        .notifications()
        .iter()
        .rev()
        .map(|notification| {
            let mut lines = vec![Line::from(vec![
                Span::styled(
                    notification.at.format("%Y-%m-%d %H:%M:%S").to_string(),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(" "),
                Span::styled(notification.title.clone(), Style::new().bold()),
            ])];
            lines.extend(notification.message.lines().map(|line| Line::from(line.to_string())));
            ListItem::new(lines)
        })
        .collect();
    frame.render_widget(
        List::new(items).block(Block::default().title("NOTIFICATIONS".bold())),
        chunks[2],
    );
}
