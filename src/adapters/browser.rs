// src/adapters/browser.rs

//! The terminal front end's stand-in for the browser: a list of tabs, the
//! toolbar badge, the popup pointer and the notification area.

use crate::core::models::{Badge, Notification, Tab, TabId};
use crate::core::ports::{Notifier, TabSource, UiRenderer};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::info;

/// Notifications kept for display; older ones are dropped.
const MAX_NOTIFICATIONS: usize = 200;

#[derive(Debug, Default)]
struct TabList {
    tabs: Vec<Tab>,
    active: usize,
    next_id: u32,
}

/// Tabs shared between the front end (which edits them) and the engine (which reads them).
#[derive(Debug, Clone, Default)]
pub struct SharedTabs {
    inner: Arc<RwLock<TabList>>,
}

impl SharedTabs {
    /// Opens a new tab on `url`, focuses it and returns it.
    pub fn open(&self, url: &str) -> Tab {
        let mut list = self.inner.write();
        list.next_id += 1;
        let tab = Tab::new(list.next_id, url);
        list.tabs.push(tab.clone());
        list.active = list.tabs.len() - 1;
        tab
    }

    /// Points the active tab at `url` and returns it, or `None` with no tabs open.
    pub fn navigate(&self, url: &str) -> Option<Tab> {
        let mut list = self.inner.write();
        let active = list.active;
        let tab = list.tabs.get_mut(active)?;
        tab.url = url.to_string();
        Some(tab.clone())
    }

    /// Focuses the next tab, wrapping around.
    pub fn cycle(&self) -> Option<Tab> {
        let mut list = self.inner.write();
        if list.tabs.is_empty() {
            return None;
        }
        list.active = (list.active + 1) % list.tabs.len();
        list.tabs.get(list.active).cloned()
    }

    pub fn active(&self) -> Option<Tab> {
        let list = self.inner.read();
        list.tabs.get(list.active).cloned()
    }

    pub fn all(&self) -> Vec<Tab> {
        self.inner.read().tabs.clone()
    }

    pub fn active_index(&self) -> usize {
        self.inner.read().active
    }
}

#[async_trait]
impl TabSource for SharedTabs {
    async fn active_tab(&self) -> Option<Tab> {
        self.active()
    }

    async fn tab(&self, id: TabId) -> Option<Tab> {
        self.inner.read().tabs.iter().find(|tab| tab.id == id).cloned()
    }
}

#[derive(Debug)]
struct Toolbar {
    badge: Badge,
    popup_domain: String,
    notifications: VecDeque<Notification>,
}

/// Badge, popup pointer and notifications, written by the engine and read by the UI.
#[derive(Debug, Clone)]
pub struct TerminalUi {
    inner: Arc<RwLock<Toolbar>>,
}

impl Default for TerminalUi {
    fn default() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Toolbar {
                badge: Badge::Off,
                popup_domain: String::new(),
                notifications: VecDeque::new(),
            })),
        }
    }
}

impl TerminalUi {
    pub fn badge(&self) -> Badge {
        self.inner.read().badge
    }

    pub fn popup_domain(&self) -> String {
        self.inner.read().popup_domain.clone()
    }

    /// Newest last.
    pub fn notifications(&self) -> Vec<Notification> {
        self.inner.read().notifications.iter().cloned().collect()
    }
}

impl UiRenderer for TerminalUi {
    fn set_badge(&self, badge: Badge) {
        self.inner.write().badge = badge;
    }

    fn set_popup_domain(&self, domain: &str) {
        self.inner.write().popup_domain = domain.to_string();
    }
}

impl Notifier for TerminalUi {
    fn notify(&self, title: &str, message: &str) {
        info!(title, "Notification: {}", message);
        let mut toolbar = self.inner.write();
        toolbar.notifications.push_back(Notification::new(title, message));
        while toolbar.notifications.len() > MAX_NOTIFICATIONS {
            toolbar.notifications.pop_front();
        }
    }
}
