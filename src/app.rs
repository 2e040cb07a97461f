// src/app.rs

use liveknoxss_rs::adapters::browser::{SharedTabs, TerminalUi};
use liveknoxss_rs::config::UiSettings;
use liveknoxss_rs::core::models::{DomainState, Snapshot, Tab};
use liveknoxss_rs::logging::log_path;
use ratatui::widgets::ScrollbarState;

/// Log lines kept for the log panel.
const LOG_TAIL: usize = 200;

pub enum InputMode {
    Normal,
    /// Typing a URL. `new_tab` opens it in a fresh tab instead of the active one.
    Editing { new_tab: bool },
}

pub struct App {
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub input: String,
    pub tabs: SharedTabs,
    pub toolbar: TerminalUi,
    pub snapshot: Snapshot,
    pub show_disclaimer: bool,
    pub show_logs: bool,
    pub table_scroll: usize,
    pub table_scroll_state: ScrollbarState,
    pub log_content: Vec<String>,
    pub log_horizontal_scroll: usize,
    pub log_horizontal_scroll_state: ScrollbarState,
}

impl App {
    pub fn new(tabs: SharedTabs, toolbar: TerminalUi, settings: &UiSettings) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            input: String::new(),
            tabs,
            toolbar,
            snapshot: Snapshot::default(),
            show_disclaimer: settings.show_disclaimer,
            show_logs: settings.show_logs,
            table_scroll: 0,
            table_scroll_state: ScrollbarState::default(),
            log_content: Vec::new(),
            log_horizontal_scroll: 0,
            log_horizontal_scroll_state: ScrollbarState::default(),
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.input_mode, InputMode::Editing { .. })
    }

    /// Enters URL editing, pre-filled with the active tab's URL unless a new tab is wanted.
    pub fn start_editing(&mut self, new_tab: bool) {
        self.input = if new_tab {
            String::new()
        } else {
            self.tabs.active().map(|tab| tab.url).unwrap_or_default()
        };
        self.input_mode = InputMode::Editing { new_tab };
    }

    pub fn cancel_editing(&mut self) {
        self.input.clear();
        self.input_mode = InputMode::Normal;
    }

    /// Opens or navigates to the typed URL and returns the tab that finished loading.
    pub fn submit_url(&mut self) -> Option<Tab> {
        let new_tab = matches!(self.input_mode, InputMode::Editing { new_tab: true });
        self.input_mode = InputMode::Normal;
        let url = normalize_url(&std::mem::take(&mut self.input))?;
        if new_tab || self.tabs.active().is_none() {
            Some(self.tabs.open(&url))
        } else {
            self.tabs.navigate(&url)
        }
    }

    /// The domain the popup currently shows, with its state.
    pub fn popup_state(&self) -> Option<(String, DomainState)> {
        let domain = self.toolbar.popup_domain();
        let state = self.snapshot.domain_state.get(&domain)?.clone();
        Some((domain, state))
    }

    pub fn scroll_up(&mut self) {
        self.table_scroll = self.table_scroll.saturating_sub(1);
        self.table_scroll_state = self.table_scroll_state.position(self.table_scroll);
    }

    pub fn scroll_down(&mut self) {
        let last = self.snapshot.domain_state.len().saturating_sub(1);
        self.table_scroll = self.table_scroll.saturating_add(1).min(last);
        self.table_scroll_state = self.table_scroll_state.position(self.table_scroll);
    }

    pub fn scroll_left(&mut self) {
        self.log_horizontal_scroll = self.log_horizontal_scroll.saturating_sub(4);
        self.log_horizontal_scroll_state = self.log_horizontal_scroll_state.position(self.log_horizontal_scroll);
    }

    pub fn scroll_right(&mut self) {
        self.log_horizontal_scroll = self.log_horizontal_scroll.saturating_add(4);
        self.log_horizontal_scroll_state = self.log_horizontal_scroll_state.position(self.log_horizontal_scroll);
    }

    /// Re-reads the tail of the log file. Missing or unreadable files leave the panel as is.
    pub fn refresh_logs(&mut self) {
        if !self.show_logs {
            return;
        }
        if let Ok(content) = std::fs::read_to_string(log_path()) {
            let lines: Vec<&str> = content.lines().collect();
            let start = lines.len().saturating_sub(LOG_TAIL);
            self.log_content = lines[start..].iter().map(|line| line.to_string()).collect();
        }
    }
}

/// Adds `https://` when the typed URL has no scheme. Blank input yields `None`.
fn normalize_url(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if raw.starts_with("http://") || raw.starts_with("https://") {
        Some(raw.to_string())
    } else {
        Some(format!("https://{}", raw))
    }
}
