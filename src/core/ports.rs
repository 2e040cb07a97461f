// src/core/ports.rs

//! Collaborator interfaces the engine drives.
//!
//! Concrete implementations live in `crate::adapters`; tests substitute
//! in-memory fakes.

use crate::core::error::Result;
use crate::core::models::{Badge, Cookie, ServiceRequest, ServiceResponse, Snapshot, Tab, TabId};
use async_trait::async_trait;

/// The browser's tab model.
#[async_trait]
pub trait TabSource: Send + Sync {
    /// The tab currently focused by the user, if any.
    async fn active_tab(&self) -> Option<Tab>;

    /// Looks a tab up by id.
    async fn tab(&self, id: TabId) -> Option<Tab>;
}

/// Whole-snapshot persistence.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn load(&self) -> Result<Snapshot>;
    async fn save(&self, snapshot: &Snapshot) -> Result<()>;
}

#[async_trait]
pub trait CookieProvider: Send + Sync {
    /// Cookies set for `domain` or any of its subdomains.
    async fn cookies_for_domain(&self, domain: &str) -> Result<Vec<Cookie>>;
}

#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn post(&self, request: ServiceRequest) -> Result<ServiceResponse>;
}

/// Best-effort user notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, message: &str);
}

/// Toolbar badge and popup pointer.
pub trait UiRenderer: Send + Sync {
    fn set_badge(&self, badge: Badge);
    fn set_popup_domain(&self, domain: &str);
}
