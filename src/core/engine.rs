// src/core/engine.rs

//! The single owner of the domain state.
//!
//! Browser events, popup commands and scan completions are all funnelled into
//! one task and handled one at a time, so no two handlers ever touch the
//! table concurrently.

use crate::config::ServiceSettings;
use crate::core::controller::ActivationController;
use crate::core::dispatcher::{ScanCompletion, ScanDispatcher, ScanOutcome, ScanPhase};
use crate::core::domain::{domain_from_url, SecondLevelStrategy};
use crate::core::error::Result;
use crate::core::models::{Command, DomainState, Tab, TabId};
use crate::core::ports::{CookieProvider, HttpClient, Notifier, Storage, TabSource, UiRenderer};
use crate::core::store::StateStore;
use crate::core::ui_sync::UiSync;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Inputs the engine reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    TabActivated(TabId),
    NavigationComplete(Tab),
    Command(Command),
    Shutdown,
}

/// The outside world, as the engine sees it.
#[derive(Clone)]
pub struct Collaborators {
    pub tabs: Arc<dyn TabSource>,
    pub storage: Arc<dyn Storage>,
    pub cookies: Arc<dyn CookieProvider>,
    pub http: Arc<dyn HttpClient>,
    pub notifier: Arc<dyn Notifier>,
    pub renderer: Arc<dyn UiRenderer>,
}

pub struct Engine {
    store: StateStore,
    controller: ActivationController,
    dispatcher: ScanDispatcher,
    completions: mpsc::UnboundedReceiver<ScanCompletion>,
    tabs: Arc<dyn TabSource>,
}

impl Engine {
    /// Loads the persisted snapshot and wires the components together.
    pub async fn start(
        collaborators: Collaborators,
        strategy: Arc<dyn SecondLevelStrategy>,
        service: ServiceSettings,
        version: &str,
    ) -> Result<Self> {
        info!("This is {} {}", service.client_name, version);
        let store = StateStore::load(collaborators.storage, strategy).await?;
        let ui = UiSync::new(Arc::clone(&collaborators.tabs), collaborators.renderer);
        let (dispatcher, completions) = ScanDispatcher::new(
            ui.clone(),
            collaborators.cookies,
            collaborators.http,
            collaborators.notifier,
            service,
            version,
        );
        Ok(Self {
            store,
            controller: ActivationController::new(ui),
            dispatcher,
            completions,
            tabs: collaborators.tabs,
        })
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn dispatcher(&self) -> &ScanDispatcher {
        &self.dispatcher
    }

    pub async fn handle(&mut self, event: Event) -> Result<()> {
        match event {
            Event::TabActivated(id) => match self.tabs.tab(id).await {
                Some(tab) => self.dispatcher.on_tab_activated(&mut self.store, &tab).await?,
                None => warn!(tab = %id, "Activated tab not found."),
            },
            Event::NavigationComplete(tab) => {
                self.dispatcher.on_navigation_complete(&mut self.store, &tab).await?;
            }
            Event::Command(command) => {
                info!(command = %command, "Received command.");
                match command {
                    Command::Toggle => {
                        self.toggle_active_tab().await?;
                    }
                    Command::ClearState => self.clear_state().await?,
                    Command::SetHandleSubdomains(value) => {
                        self.set_handle_subdomains_active_tab(value).await?;
                    }
                }
            }
            Event::Shutdown => self.store.flush().await?,
        }
        Ok(())
    }

    /// Replays a navigation-complete event for whatever the active tab shows.
    pub async fn sync_with_active_tab(&mut self) -> Result<Option<ScanPhase>> {
        match self.tabs.active_tab().await {
            Some(tab) => Ok(Some(self.dispatcher.on_navigation_complete(&mut self.store, &tab).await?)),
            None => Ok(None),
        }
    }

    /// Toggles scanning for the active tab's domain. `None` when there is no
    /// active tab or it shows no valid domain.
    pub async fn toggle_active_tab(&mut self) -> Result<Option<DomainState>> {
        let Some((tab, domain)) = self.active_target("toggle").await else {
            return Ok(None);
        };
        let state = self.controller.toggle(&mut self.store, &tab, &domain).await?;
        Ok(Some(state))
    }

    pub async fn set_handle_subdomains_active_tab(&mut self, value: bool) -> Result<Option<DomainState>> {
        let Some((tab, domain)) = self.active_target("subdomain handling").await else {
            return Ok(None);
        };
        let state = self
            .controller
            .set_handle_subdomains(&mut self.store, &tab, &domain, value)
            .await?;
        Ok(Some(state))
    }

    /// Forgets everything, then resyncs with the active tab.
    pub async fn clear_state(&mut self) -> Result<()> {
        self.controller.clear(&mut self.store).await?;
        self.sync_with_active_tab().await?;
        Ok(())
    }

    pub async fn apply_completion(&mut self, completion: ScanCompletion) -> Result<ScanOutcome> {
        self.dispatcher.complete(&mut self.store, completion).await
    }

    /// Waits for every outstanding scan and applies its result.
    pub async fn settle(&mut self) -> Result<Vec<ScanOutcome>> {
        let mut outcomes = Vec::new();
        while self.dispatcher.in_flight_count() > 0 {
            let Some(completion) = self.completions.recv().await else {
                break;
            };
            outcomes.push(self.apply_completion(completion).await?);
        }
        Ok(outcomes)
    }

    /// Runs until `Shutdown` arrives or every event sender is gone, then
    /// flushes a final snapshot.
    pub async fn run(mut self, mut events: mpsc::Receiver<Event>) -> Result<()> {
        if let Err(e) = self.sync_with_active_tab().await {
            error!(error = %e, "Initial sync failed.");
        }

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(Event::Shutdown) | None => break,
                    Some(event) => {
                        if let Err(e) = self.handle(event).await {
                            error!(error = %e, "Event handling failed.");
                        }
                    }
                },
                Some(completion) = self.completions.recv() => {
                    if let Err(e) = self.apply_completion(completion).await {
                        error!(error = %e, "Applying scan result failed.");
                    }
                }
            }
        }

        self.store.flush().await?;
        info!("Engine stopped.");
        Ok(())
    }

    async fn active_target(&self, action: &str) -> Option<(Tab, String)> {
        let tab = self.tabs.active_tab().await?;
        match domain_from_url(&tab.url) {
            Ok(domain) => Some((tab, domain)),
            Err(e) => {
                info!(action, error = %e, "Ignoring request on invalid domain.");
                None
            }
        }
    }
}
