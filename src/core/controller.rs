// src/core/controller.rs

//! User-initiated policy changes: toggle, subdomain handling, clear.
//!
//! Every operation takes the target domain explicitly. Resolving "the domain
//! of the active tab" happens in `crate::core::engine`.

use crate::core::error::Result;
use crate::core::models::{DomainPatch, DomainState, Tab};
use crate::core::propagation::propagate;
use crate::core::store::StateStore;
use crate::core::ui_sync::UiSync;
use tracing::info;

pub struct ActivationController {
    ui: UiSync,
}

impl ActivationController {
    pub fn new(ui: UiSync) -> Self {
        Self { ui }
    }

    /// Flips scanning for `domain` and cascades to its subdomains.
    ///
    /// A prior finding is cleared: toggling is the user re-engaging.
    pub async fn toggle(&self, store: &mut StateStore, tab: &Tab, domain: &str) -> Result<DomainState> {
        let current = store.get_or_create(domain).await?;
        let patch = DomainPatch {
            active: Some(!current.active),
            xssed: Some(false),
            ..Default::default()
        };
        let state = store.merge(domain, patch).await?;
        info!(domain, active = state.active, "Scanning {}.", if state.active { "enabled" } else { "disabled" });

        propagate(store, domain).await?;
        self.ui.refresh(tab, domain, Some(&state)).await;
        Ok(state)
    }

    /// Enables or disables automatic handling of `*.domain`.
    pub async fn set_handle_subdomains(
        &self,
        store: &mut StateStore,
        tab: &Tab,
        domain: &str,
        value: bool,
    ) -> Result<DomainState> {
        store.get_or_create(domain).await?;
        let state = store.merge(domain, DomainPatch::handle_subdomains(value)).await?;
        info!(
            domain,
            "Automatic subdomain handling {} for \"*.{}\".",
            if value { "activated" } else { "deactivated" },
            domain
        );

        propagate(store, domain).await?;
        self.ui.refresh(tab, domain, Some(&state)).await;
        Ok(state)
    }

    /// Empties the whole table and the popup pointer.
    ///
    /// The caller is expected to resync with the active tab afterwards.
    pub async fn clear(&self, store: &mut StateStore) -> Result<()> {
        store.clear_all().await
    }
}
