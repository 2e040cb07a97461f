// src/core/models.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use strum::Display;

// --- Domain State ---

/// Everything the engine knows about one observed domain.
///
/// Field names follow the persisted layout, so a snapshot written by an
/// earlier run loads back without any translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainState {
    /// Scanning is enabled for this domain.
    pub active: bool,
    /// The scanning service reported a vulnerability here.
    pub xssed: bool,
    pub is_second_level_domain: bool,
    /// Only meaningful on a second-level domain: whether its subdomains inherit activation.
    pub handle_subdomains: bool,
    /// The second-level domain this entry belongs to (itself when second-level).
    pub parent_domain: String,
    /// Distinct vulnerable URLs, in discovery order.
    #[serde(default)]
    pub urls: Vec<String>,
}

impl DomainState {
    /// Retires scanning for the domain and remembers the vulnerable URL.
    ///
    /// Returns `true` when the URL was not known before.
    pub fn record_finding(&mut self, url: &str) -> bool {
        self.active = false;
        self.xssed = true;
        if self.urls.iter().any(|known| known == url) {
            return false;
        }
        self.urls.push(url.to_string());
        true
    }

    /// The badge this state should be rendered with.
    pub fn badge(&self) -> Badge {
        if self.active {
            Badge::Active
        } else if self.xssed {
            Badge::Vulnerable
        } else {
            Badge::Off
        }
    }
}

/// A shallow, field-by-field update of a `DomainState`.
///
/// Only the fields set to `Some` are written by `StateStore::merge`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainPatch {
    pub active: Option<bool>,
    pub xssed: Option<bool>,
    pub is_second_level_domain: Option<bool>,
    pub handle_subdomains: Option<bool>,
    pub parent_domain: Option<String>,
    pub urls: Option<Vec<String>>,
}

impl DomainPatch {
    pub fn active(value: bool) -> Self {
        Self { active: Some(value), ..Default::default() }
    }

    pub fn handle_subdomains(value: bool) -> Self {
        Self { handle_subdomains: Some(value), ..Default::default() }
    }

    /// Writes every provided field onto `state`.
    pub fn apply_to(self, state: &mut DomainState) {
        if let Some(active) = self.active {
            state.active = active;
        }
        if let Some(xssed) = self.xssed {
            state.xssed = xssed;
        }
        if let Some(is_sld) = self.is_second_level_domain {
            state.is_second_level_domain = is_sld;
        }
        if let Some(handle) = self.handle_subdomains {
            state.handle_subdomains = handle;
        }
        if let Some(parent) = self.parent_domain {
            state.parent_domain = parent;
        }
        if let Some(urls) = self.urls {
            state.urls = urls;
        }
    }
}

/// Domain name to state, ordered so snapshots and the domain table are stable.
pub type DomainTable = BTreeMap<String, DomainState>;

/// The single persisted record: the whole table plus the popup's domain pointer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub domain_state: DomainTable,
    #[serde(default)]
    pub current_domain: String,
}

// --- UI ---

/// Toolbar badge states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Badge {
    Off,
    Active,
    Vulnerable,
}

impl Badge {
    pub fn text(self) -> &'static str {
        match self {
            Badge::Off => "",
            Badge::Active => "on",
            Badge::Vulnerable => "XSS",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Badge::Off => "",
            Badge::Active => "#20c020",
            Badge::Vulnerable => "#ff2020",
        }
    }
}

/// A user-facing message, stamped when it was raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl Notification {
    pub fn new(title: &str, message: &str) -> Self {
        Self {
            title: title.to_string(),
            message: message.to_string(),
            at: Utc::now(),
        }
    }
}

// --- Browser ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TabId(pub u32);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    pub id: TabId,
    pub url: String,
}

impl Tab {
    pub fn new(id: u32, url: &str) -> Self {
        Self { id: TabId(id), url: url.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub domain: String,
    pub name: String,
    pub value: String,
}

/// Inbound control messages, as sent by the popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Command {
    Toggle,
    ClearState,
    SetHandleSubdomains(bool),
}

// --- Scanning Service ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl ServiceRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// What came back from the scanning service. `url` is the final URL after redirects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceResponse {
    pub status: u16,
    pub url: String,
    pub body: String,
}
