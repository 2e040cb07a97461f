// src/core/ui_sync.rs

use crate::core::domain::{domain_from_url, extract_host};
use crate::core::error::Result;
use crate::core::models::{Badge, DomainState, Tab};
use crate::core::ports::{TabSource, UiRenderer};
use crate::core::store::StateStore;
use std::sync::Arc;
use tracing::{debug, info};

/// Keeps the badge and the popup pointer in line with the focused tab.
#[derive(Clone)]
pub struct UiSync {
    tabs: Arc<dyn TabSource>,
    renderer: Arc<dyn UiRenderer>,
}

impl UiSync {
    pub fn new(tabs: Arc<dyn TabSource>, renderer: Arc<dyn UiRenderer>) -> Self {
        Self { tabs, renderer }
    }

    /// Renders `state` for `tab`, but only when `tab` is the active tab or the
    /// active tab shows the same host. `None` renders the "off" badge.
    ///
    /// Returns whether the badge was updated.
    pub async fn refresh(&self, tab: &Tab, domain: &str, state: Option<&DomainState>) -> bool {
        let Some(active) = self.tabs.active_tab().await else {
            debug!(tab = %tab.id, "No active tab, skipping badge refresh.");
            return false;
        };
        let same_host = match (extract_host(&active.url), extract_host(&tab.url)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        };
        if active.id != tab.id && !same_host {
            return false;
        }

        let badge = state.map(DomainState::badge).unwrap_or(Badge::Off);
        match (badge, state) {
            (Badge::Active, _) => info!(domain, "Scanning active."),
            (Badge::Vulnerable, Some(state)) => info!(
                domain,
                vulnerable = state.urls.first().map(String::as_str).unwrap_or(""),
                "The scanning service found an XSS vulnerability."
            ),
            _ => debug!(domain, "Scanning not active."),
        }
        self.renderer.set_badge(badge);
        true
    }

    /// Like `refresh`, for work that finished after `tab` was captured: the
    /// tab is looked up again and must still show `domain`.
    pub async fn refresh_if_showing(&self, tab: &Tab, domain: &str, state: Option<&DomainState>) -> bool {
        let Some(current) = self.tabs.tab(tab.id).await else {
            debug!(tab = %tab.id, domain, "Tab closed, skipping badge refresh.");
            return false;
        };
        if domain_from_url(&current.url).ok().as_deref() != Some(domain) {
            debug!(tab = %tab.id, domain, url = %current.url, "Tab moved on, skipping badge refresh.");
            return false;
        }
        self.refresh(&current, domain, state).await
    }

    /// Points the popup at `domain`, if `tab` is the one the user is looking at.
    pub async fn set_popup_domain(&self, store: &mut StateStore, tab: &Tab, domain: &str) -> Result<()> {
        let is_active = self
            .tabs
            .active_tab()
            .await
            .is_some_and(|active| active.id == tab.id);
        if is_active {
            store.set_current_domain(domain).await?;
            self.renderer.set_popup_domain(domain);
        }
        Ok(())
    }
}
