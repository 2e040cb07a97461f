// src/core/store.rs

//! The domain-state table and its persistence lifecycle.

use crate::core::domain::SecondLevelStrategy;
use crate::core::error::Result;
use crate::core::models::{DomainPatch, DomainState, DomainTable, Snapshot};
use crate::core::ports::Storage;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// In-memory domain table mirrored to a `Storage` on every mutation.
///
/// Besides the persisted data, each entry carries a generation number that
/// changes on every write to that entry. Asynchronous work captures it up
/// front and compares on completion to detect that the entry moved on.
pub struct StateStore {
    table: DomainTable,
    current_domain: String,
    generations: HashMap<String, u64>,
    next_generation: u64,
    storage: Arc<dyn Storage>,
    strategy: Arc<dyn SecondLevelStrategy>,
}

impl StateStore {
    /// An empty store; nothing is read from `storage`.
    pub fn new(storage: Arc<dyn Storage>, strategy: Arc<dyn SecondLevelStrategy>) -> Self {
        Self {
            table: DomainTable::new(),
            current_domain: String::new(),
            generations: HashMap::new(),
            next_generation: 1,
            storage,
            strategy,
        }
    }

    /// Builds a store from the last snapshot in `storage`.
    pub async fn load(storage: Arc<dyn Storage>, strategy: Arc<dyn SecondLevelStrategy>) -> Result<Self> {
        let snapshot = storage.load().await?;
        let mut store = Self::new(storage, strategy);
        for domain in snapshot.domain_state.keys() {
            store.bump(domain);
        }
        info!(domains = snapshot.domain_state.len(), "Domain state loaded.");
        store.table = snapshot.domain_state;
        store.current_domain = snapshot.current_domain;
        Ok(store)
    }

    pub fn has(&self, domain: &str) -> bool {
        self.table.contains_key(domain)
    }

    pub fn get(&self, domain: &str) -> Option<&DomainState> {
        self.table.get(domain)
    }

    pub fn table(&self) -> &DomainTable {
        &self.table
    }

    pub fn current_domain(&self) -> &str {
        &self.current_domain
    }

    /// The entry's current generation, `None` once it no longer exists.
    pub fn generation(&self, domain: &str) -> Option<u64> {
        self.generations.get(domain).copied()
    }

    /// The state a first sighting of `domain` would get.
    ///
    /// A subdomain inherits `active` from its parent's policy when the parent
    /// is already known; everything else starts inactive.
    pub fn initial_state(&self, domain: &str) -> DomainState {
        let is_sld = self.strategy.is_second_level(domain);
        let parent_domain = self.strategy.second_level_of(domain);
        let active = if is_sld {
            false
        } else {
            self.table
                .get(&parent_domain)
                .map(|parent| parent.active && parent.handle_subdomains)
                .unwrap_or(false)
        };
        DomainState {
            active,
            xssed: false,
            is_second_level_domain: is_sld,
            handle_subdomains: is_sld,
            parent_domain,
            urls: Vec::new(),
        }
    }

    /// Creates (or re-creates) the entry for `domain` and persists.
    pub async fn create_and_store(&mut self, domain: &str) -> Result<DomainState> {
        let state = self.initial_state(domain);
        debug!(domain, active = state.active, parent = %state.parent_domain, "Creating domain state.");
        self.table.insert(domain.to_string(), state.clone());
        self.bump(domain);
        self.persist().await?;
        Ok(state)
    }

    pub async fn get_or_create(&mut self, domain: &str) -> Result<DomainState> {
        match self.table.get(domain) {
            Some(state) => Ok(state.clone()),
            None => self.create_and_store(domain).await,
        }
    }

    /// Shallow-merges `patch` into the entry, creating it first if needed, and persists.
    pub async fn merge(&mut self, domain: &str, patch: DomainPatch) -> Result<DomainState> {
        let mut state = match self.table.remove(domain) {
            Some(state) => state,
            None => self.initial_state(domain),
        };
        patch.apply_to(&mut state);
        self.table.insert(domain.to_string(), state.clone());
        self.bump(domain);
        self.persist().await?;
        Ok(state)
    }

    /// Applies `update` to an existing entry without persisting.
    ///
    /// Callers batching several writes persist once via `persist()` afterwards.
    /// Returns `None` when `domain` is unknown.
    pub fn update_in_place<F>(&mut self, domain: &str, update: F) -> Option<DomainState>
    where
        F: FnOnce(&mut DomainState),
    {
        let state = self.table.get_mut(domain)?;
        update(state);
        let updated = state.clone();
        self.bump(domain);
        Some(updated)
    }

    pub async fn set_current_domain(&mut self, domain: &str) -> Result<()> {
        if self.current_domain == domain {
            return Ok(());
        }
        self.current_domain = domain.to_string();
        self.persist().await
    }

    /// Forgets every domain and the current-domain pointer.
    pub async fn clear_all(&mut self) -> Result<()> {
        info!(domains = self.table.len(), "Clearing all domain state.");
        self.table.clear();
        self.generations.clear();
        self.current_domain.clear();
        self.persist().await
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            domain_state: self.table.clone(),
            current_domain: self.current_domain.clone(),
        }
    }

    /// Writes the full table to storage.
    pub async fn persist(&self) -> Result<()> {
        self.storage.save(&self.snapshot()).await
    }

    /// Final write on shutdown.
    pub async fn flush(&self) -> Result<()> {
        info!(domains = self.table.len(), "Flushing domain state.");
        self.persist().await
    }

    fn bump(&mut self, domain: &str) {
        self.generations.insert(domain.to_string(), self.next_generation);
        self.next_generation += 1;
    }
}
