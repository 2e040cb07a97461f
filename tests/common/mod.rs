// tests/common/mod.rs

#![allow(dead_code)]

use async_trait::async_trait;
use liveknoxss_rs::adapters::browser::{SharedTabs, TerminalUi};
use liveknoxss_rs::adapters::cookies::cookie_matches;
use liveknoxss_rs::adapters::storage::MemoryStorage;
use liveknoxss_rs::config::ServiceSettings;
use liveknoxss_rs::core::dispatcher::ScanPhase;
use liveknoxss_rs::core::domain::LabelCount;
use liveknoxss_rs::core::engine::{Collaborators, Engine};
use liveknoxss_rs::core::error::{Error, Result};
use liveknoxss_rs::core::models::{Cookie, DomainState, ServiceRequest, ServiceResponse, Snapshot};
use liveknoxss_rs::core::ports::{CookieProvider, HttpClient};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

pub const ENDPOINT: &str = "https://knoxss.me/old/pro";

// --- Fakes ---

/// Cookies held in memory, matched the same way the real jar matches them.
#[derive(Default)]
pub struct FakeCookies {
    cookies: Mutex<Vec<Cookie>>,
    broken: Mutex<bool>,
}

impl FakeCookies {
    pub fn add(&self, domain: &str, name: &str, value: &str) {
        self.cookies.lock().push(Cookie {
            domain: domain.to_string(),
            name: name.to_string(),
            value: value.to_string(),
        });
    }

    /// Every later lookup fails as if the jar file were corrupt.
    pub fn break_jar(&self) {
        *self.broken.lock() = true;
    }

    pub fn logged_in() -> Self {
        let jar = Self::default();
        jar.add(".knoxss.me", "wordpress_logged_in", "session");
        jar
    }
}

#[async_trait]
impl CookieProvider for FakeCookies {
    async fn cookies_for_domain(&self, domain: &str) -> Result<Vec<Cookie>> {
        if *self.broken.lock() {
            return Err(Error::Storage("corrupt cookie jar".to_string()));
        }
        Ok(self
            .cookies
            .lock()
            .iter()
            .filter(|cookie| cookie_matches(&cookie.domain, domain))
            .cloned()
            .collect())
    }
}

/// What the fake scanning service does with the next requests.
#[derive(Debug, Clone)]
pub enum Reply {
    /// 200 at the endpoint with this body.
    Body(String),
    /// Redirected to `url`, empty body.
    LandOn(String),
    Unreachable,
    /// Never answers within any sane timeout.
    Hang,
}

/// Records every request and answers with the configured `Reply`.
pub struct FakeHttp {
    requests: Mutex<Vec<ServiceRequest>>,
    reply: Mutex<Reply>,
}

impl Default for FakeHttp {
    fn default() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            reply: Mutex::new(Reply::Body("<html>Nothing found.</html>".to_string())),
        }
    }
}

impl FakeHttp {
    pub fn reply_with(&self, reply: Reply) {
        *self.reply.lock() = reply;
    }

    pub fn requests(&self) -> Vec<ServiceRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl HttpClient for FakeHttp {
    async fn post(&self, request: ServiceRequest) -> Result<ServiceResponse> {
        let url = request.url.clone();
        self.requests.lock().push(request);
        let reply = self.reply.lock().clone();
        match reply {
            Reply::Body(body) => Ok(ServiceResponse { status: 200, url, body }),
            Reply::LandOn(landed) => Ok(ServiceResponse { status: 200, url: landed, body: String::new() }),
            Reply::Unreachable => Err(Error::ServiceUnreachable("connection refused".to_string())),
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(Error::ServiceUnreachable("hung up".to_string()))
            }
        }
    }
}

pub fn finding_body(url: &str) -> String {
    format!("<html><script>window.open('{}', '_blank');</script></html>", url)
}

// --- Harness ---

/// A fully wired engine over in-memory collaborators.
pub struct Harness {
    pub engine: Engine,
    pub tabs: SharedTabs,
    pub ui: TerminalUi,
    pub cookies: Arc<FakeCookies>,
    pub http: Arc<FakeHttp>,
    pub storage: Arc<MemoryStorage>,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with(ServiceSettings::default(), Snapshot::default(), FakeCookies::logged_in()).await
    }

    pub async fn with(service: ServiceSettings, snapshot: Snapshot, cookies: FakeCookies) -> Self {
        let tabs = SharedTabs::default();
        let ui = TerminalUi::default();
        let cookies = Arc::new(cookies);
        let http = Arc::new(FakeHttp::default());
        let storage = Arc::new(MemoryStorage::with_snapshot(snapshot));
        let collaborators = Collaborators {
            tabs: Arc::new(tabs.clone()),
            storage: storage.clone(),
            cookies: cookies.clone(),
            http: http.clone(),
            notifier: Arc::new(ui.clone()),
            renderer: Arc::new(ui.clone()),
        };
        let engine = Engine::start(collaborators, Arc::new(LabelCount), service, "v0.1.0")
            .await
            .expect("engine starts");
        Self { engine, tabs, ui, cookies, http, storage }
    }

    /// Loads `url` in the active tab (opening one if needed) and reports the phase reached.
    pub async fn visit(&mut self, url: &str) -> ScanPhase {
        if self.tabs.navigate(url).is_none() {
            self.tabs.open(url);
        }
        self.engine
            .sync_with_active_tab()
            .await
            .expect("navigation handled")
            .expect("a tab is active")
    }

    pub fn state(&self, domain: &str) -> Option<DomainState> {
        self.engine.store().get(domain).cloned()
    }

    pub fn notification_messages(&self) -> Vec<String> {
        self.ui.notifications().into_iter().map(|n| n.message).collect()
    }
}

/// Every stored entry satisfies `xssed => !active`.
pub fn assert_xssed_never_active(snapshot: &Snapshot) {
    for (domain, state) in &snapshot.domain_state {
        assert!(!(state.xssed && state.active), "{} is both xssed and active", domain);
    }
}
