// src/core/dispatcher.rs

//! Turns navigation-complete events into scan requests and scan responses
//! into state changes.
//!
//! One event walks `VALIDATING -> (INACTIVE | DISPATCHING)`. The request runs
//! on its own task; its `ScanCompletion` comes back through a channel and is
//! applied by `complete`, which decides between `DONE` and `FINDING_RECORDED`.

use crate::config::ServiceSettings;
use crate::core::domain::{domain_from_url, extract_host};
use crate::core::error::{Error, Result};
use crate::core::models::{Cookie, DomainPatch, ServiceRequest, ServiceResponse, Tab};
use crate::core::ports::{CookieProvider, HttpClient, Notifier};
use crate::core::store::StateStore;
use crate::core::ui_sync::UiSync;
use crate::core::verdict::Verdict;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Where a navigation-complete event stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanPhase {
    /// The URL has no trackable domain.
    InvalidDomain,
    /// Scanning is off for the domain.
    Inactive,
    /// A request for the same domain is still outstanding.
    AlreadyInFlight,
    /// No session with the scanning service.
    Unauthenticated,
    /// A request is on its way.
    Dispatched,
}

/// How a completed request was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Nothing to record.
    Done,
    FindingRecorded(String),
    /// A finding arrived for a domain whose state changed since dispatch; dropped.
    Stale,
    /// The service could not be reached in time.
    Failed,
}

/// The result of one scan request, routed back to the engine.
#[derive(Debug)]
pub struct ScanCompletion {
    pub tab: Tab,
    pub domain: String,
    /// The domain's generation when the request was sent.
    pub generation: Option<u64>,
    pub result: Result<ServiceResponse>,
}

pub struct ScanDispatcher {
    ui: UiSync,
    cookies: Arc<dyn CookieProvider>,
    http: Arc<dyn HttpClient>,
    notifier: Arc<dyn Notifier>,
    service: ServiceSettings,
    version: String,
    in_flight: HashSet<String>,
    completions: mpsc::UnboundedSender<ScanCompletion>,
}

impl ScanDispatcher {
    /// Creates the dispatcher and the receiving end of its completion channel.
    pub fn new(
        ui: UiSync,
        cookies: Arc<dyn CookieProvider>,
        http: Arc<dyn HttpClient>,
        notifier: Arc<dyn Notifier>,
        service: ServiceSettings,
        version: &str,
    ) -> (Self, mpsc::UnboundedReceiver<ScanCompletion>) {
        let (completions, receiver) = mpsc::unbounded_channel();
        let dispatcher = Self {
            ui,
            cookies,
            http,
            notifier,
            service,
            version: version.to_string(),
            in_flight: HashSet::new(),
            completions,
        };
        (dispatcher, receiver)
    }

    pub fn is_in_flight(&self, domain: &str) -> bool {
        self.in_flight.contains(domain)
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Reflects the newly focused tab's domain in the badge and popup.
    pub async fn on_tab_activated(&mut self, store: &mut StateStore, tab: &Tab) -> Result<()> {
        match domain_from_url(&tab.url) {
            Ok(domain) => {
                let state = store.get_or_create(&domain).await?;
                self.ui.refresh(tab, &domain, Some(&state)).await;
                self.ui.set_popup_domain(store, tab, &domain).await?;
            }
            Err(e) => {
                debug!(tab = %tab.id, error = %e, "Ignoring activated tab.");
                self.ui.set_popup_domain(store, tab, "").await?;
                self.ui.refresh(tab, &extract_host(&tab.url).unwrap_or_default(), None).await;
            }
        }
        Ok(())
    }

    /// Handles a page load that finished in `tab`.
    pub async fn on_navigation_complete(&mut self, store: &mut StateStore, tab: &Tab) -> Result<ScanPhase> {
        let domain = match domain_from_url(&tab.url) {
            Ok(domain) => domain,
            Err(e) => {
                info!(tab = %tab.id, error = %e, "Ignoring update on invalid domain.");
                self.ui.set_popup_domain(store, tab, "").await?;
                self.ui.refresh(tab, &extract_host(&tab.url).unwrap_or_default(), None).await;
                return Ok(ScanPhase::InvalidDomain);
            }
        };

        self.ui.set_popup_domain(store, tab, &domain).await?;
        let state = store.get_or_create(&domain).await?;
        self.ui.refresh(tab, &domain, Some(&state)).await;

        if !state.active {
            return Ok(ScanPhase::Inactive);
        }
        if self.is_in_flight(&domain) {
            debug!(domain = %domain, "Scan already in flight, not dispatching another.");
            return Ok(ScanPhase::AlreadyInFlight);
        }

        let site_cookies = self.lookup_cookies(&domain).await?;
        let auth_cookies = self.lookup_cookies(&self.service.auth_cookie_domain).await?;
        if auth_cookies.is_empty() {
            let e = Error::Unauthenticated { cookie_domain: self.service.auth_cookie_domain.clone() };
            warn!(domain = %domain, error = %e, "Scan skipped.");
            self.notifier.notify(
                &self.service.client_name,
                "No scanning service auth cookies found: try to log into the service again.",
            );
            return Ok(ScanPhase::Unauthenticated);
        }

        let request = build_request(
            &self.service,
            &self.version,
            &tab.url,
            &cookie_header(&site_cookies),
            &cookie_header(&auth_cookies),
        );
        info!(url = %tab.url, tab = %tab.id, cookies = site_cookies.len(), "Querying the scanning service.");

        self.in_flight.insert(domain.clone());
        let generation = store.generation(&domain);
        self.spawn_request(request, tab.clone(), domain, generation);
        Ok(ScanPhase::Dispatched)
    }

    /// Cookie lookup whose failure is also shown to the user.
    async fn lookup_cookies(&self, domain: &str) -> Result<Vec<Cookie>> {
        self.cookies.cookies_for_domain(domain).await.map_err(|e| {
            warn!(domain, error = %e, "Cookie lookup failed.");
            self.notifier
                .notify(&self.service.client_name, &format!("Could not read cookies for {}: {}", domain, e));
            e
        })
    }

    fn spawn_request(&self, request: ServiceRequest, tab: Tab, domain: String, generation: Option<u64>) {
        let http = Arc::clone(&self.http);
        let completions = self.completions.clone();
        let timeout = self.service.timeout();
        tokio::spawn(async move {
            let result = match tokio::time::timeout(timeout, http.post(request)).await {
                Ok(result) => result,
                Err(_) => Err(Error::Timeout(timeout)),
            };
            let completion = ScanCompletion { tab, domain, generation, result };
            if completions.send(completion).is_err() {
                debug!("Engine gone, dropping scan completion.");
            }
        });
    }

    /// Applies a finished request against the state as it is now.
    pub async fn complete(&mut self, store: &mut StateStore, completion: ScanCompletion) -> Result<ScanOutcome> {
        let ScanCompletion { tab, domain, generation, result } = completion;
        self.in_flight.remove(&domain);
        let title = self.service.client_name.clone();

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                warn!(domain = %domain, error = %e, "Scan request failed.");
                let message = if e.is_unreachable() {
                    format!("The scanning service did not answer for {}: {}", domain, e)
                } else {
                    format!("Could not scan {}: {}", domain, e)
                };
                self.notifier.notify(&title, &message);
                return Ok(ScanOutcome::Failed);
            }
        };
        debug!(domain = %domain, status = response.status, url = %response.url, "Scanning service responded.");

        let verdict = Verdict::from_response(&response, &self.service.endpoint, &self.service.login_path);
        let mut outcome = ScanOutcome::Done;

        if let Some(vulnerable) = verdict.finding {
            let current = store.get(&domain).cloned();
            match current {
                Some(mut state) if store.generation(&domain) == generation => {
                    state.record_finding(&vulnerable);
                    let patch = DomainPatch {
                        active: Some(state.active),
                        xssed: Some(state.xssed),
                        urls: Some(state.urls),
                        ..Default::default()
                    };
                    let state = store.merge(&domain, patch).await?;
                    self.ui.refresh_if_showing(&tab, &domain, Some(&state)).await;
                    info!(domain = %domain, vulnerable = %vulnerable, "XSS found.");
                    self.notifier.notify(
                        &title,
                        &format!("An XSS has been found on {}!\n{}", domain, vulnerable),
                    );
                    outcome = ScanOutcome::FindingRecorded(vulnerable);
                }
                _ => {
                    warn!(
                        domain = %domain,
                        vulnerable = %vulnerable,
                        "Domain state changed while the scan was running, discarding finding."
                    );
                    outcome = ScanOutcome::Stale;
                }
            }
        }

        if verdict.login_required {
            self.notifier.notify(
                &title,
                "You have no permission to access this scanning service resource. Please log in again.",
            );
        }

        if let Some(error) = verdict.error {
            warn!(domain = %domain, error = %error.line, "Scanning service reported an error.");
            self.notifier.notify(&title, &error.message());
        }

        Ok(outcome)
    }
}

/// `name=value` pairs joined with `"; "`.
pub fn cookie_header(cookies: &[Cookie]) -> String {
    cookies
        .iter()
        .map(|cookie| format!("{}={}", cookie.name, cookie.value))
        .collect::<Vec<_>>()
        .join("; ")
        .trim()
        .to_string()
}

/// Keeps only `[0-9A-Za-z.-+]`.
pub fn sanitize_version(version: &str) -> String {
    version
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '+'))
        .collect()
}

/// The form POST sent to the scanning service for `target`.
pub fn build_request(
    service: &ServiceSettings,
    version: &str,
    target: &str,
    site_cookies: &str,
    auth_cookies: &str,
) -> ServiceRequest {
    let auth = if site_cookies.is_empty() {
        String::new()
    } else {
        format!("Cookie:{}", site_cookies)
    };
    let body = format!(
        "target={}&auth={}",
        urlencoding::encode(target),
        urlencoding::encode(&auth)
    );

    ServiceRequest {
        url: service.endpoint.clone(),
        headers: vec![
            ("Accept".to_string(), "text/html,application/xhtml+xml,application/xml".to_string()),
            ("Content-Type".to_string(), "application/x-www-form-urlencoded".to_string()),
            (
                service.client_header.clone(),
                format!("{} {}", service.client_name, sanitize_version(version)),
            ),
            ("Cookie".to_string(), auth_cookies.to_string()),
        ],
        body,
    }
}
