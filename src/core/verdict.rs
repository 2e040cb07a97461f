// src/core/verdict.rs

//! Interprets what the scanning service sent back.
//!
//! The service answers with an HTML page. A hit is signalled by a script that
//! opens the proof-of-concept URL in a new window; errors are reported as an
//! `ERROR: ...!` line, optionally followed by an HTML comment with details.

use crate::core::models::ServiceResponse;
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

static RE_FINDING: Lazy<Regex> = Lazy::new(|| Regex::new(r"window\.open\('([^']+)'").unwrap());
static RE_ERROR: Lazy<Regex> = Lazy::new(|| Regex::new(r"ERROR:.*!").unwrap());
static RE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"<!--(.*)-->").unwrap());

/// An error line reported by the service, with its explanatory comment if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    pub line: String,
    pub comment: Option<String>,
}

impl ServiceError {
    /// The notification text: the error line, then the comment on its own line.
    pub fn message(&self) -> String {
        match &self.comment {
            Some(comment) => format!("{}\n{}", self.line, comment),
            None => self.line.clone(),
        }
    }
}

/// Everything a single response tells us. The three parts are independent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verdict {
    /// The vulnerable URL, when the service found something.
    pub finding: Option<String>,
    /// The request ended up on the service's login page.
    pub login_required: bool,
    pub error: Option<ServiceError>,
}

impl Verdict {
    /// Reads `response`. `endpoint` and `login_path` identify the service's
    /// own login page.
    pub fn from_response(response: &ServiceResponse, endpoint: &str, login_path: &str) -> Self {
        Self {
            finding: find_vulnerable_url(&response.body),
            login_required: is_login_page(&response.url, endpoint, login_path),
            error: find_service_error(&response.body),
        }
    }
}

pub fn find_vulnerable_url(body: &str) -> Option<String> {
    RE_FINDING
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|url| url.as_str().to_string())
}

/// Whether `final_url` is the login page on `endpoint`'s host or one of its subdomains.
pub fn is_login_page(final_url: &str, endpoint: &str, login_path: &str) -> bool {
    let (Ok(landed), Ok(service)) = (Url::parse(final_url), Url::parse(endpoint)) else {
        return false;
    };
    let (Some(landed_host), Some(service_host)) = (landed.host_str(), service.host_str()) else {
        return false;
    };
    let on_service = landed_host == service_host || landed_host.ends_with(&format!(".{}", service_host));
    on_service && landed.path().starts_with(login_path)
}

pub fn find_service_error(body: &str) -> Option<ServiceError> {
    let line = RE_ERROR.find(body)?.as_str().to_string();
    let comment = RE_COMMENT
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|comment| comment.as_str().trim().to_string())
        .filter(|comment| !comment.is_empty());
    Some(ServiceError { line, comment })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENDPOINT: &str = "https://knoxss.me/old/pro";

    fn response(url: &str, body: &str) -> ServiceResponse {
        ServiceResponse { status: 200, url: url.to_string(), body: body.to_string() }
    }

    #[test]
    fn extracts_vulnerable_url() {
        let body = "<script>window.open('http://example.com/?x=<script>', '_blank')</script>";
        assert_eq!(find_vulnerable_url(body).as_deref(), Some("http://example.com/?x=<script>"));
    }

    #[test]
    fn marker_without_quoted_url_is_not_a_finding() {
        assert_eq!(find_vulnerable_url("window.open(target)"), None);
    }

    #[test]
    fn login_page_detection_is_host_bound() {
        assert!(is_login_page("https://knoxss.me/wp-login.php?redirect_to=x", ENDPOINT, "/wp-login.php"));
        assert!(is_login_page("https://www.knoxss.me/wp-login.php", ENDPOINT, "/wp-login.php"));
        assert!(!is_login_page("https://evil.test/wp-login.php", ENDPOINT, "/wp-login.php"));
        assert!(!is_login_page("https://notknoxss.me/wp-login.php", ENDPOINT, "/wp-login.php"));
        assert!(!is_login_page("https://knoxss.me/old/pro", ENDPOINT, "/wp-login.php"));
    }

    #[test]
    fn error_with_comment() {
        let body = "<p>ERROR: API limit reached!</p>\n<!-- try again tomorrow -->";
        let error = find_service_error(body).unwrap();
        assert_eq!(error.line, "ERROR: API limit reached!");
        assert_eq!(error.comment.as_deref(), Some("try again tomorrow"));
        assert_eq!(error.message(), "ERROR: API limit reached!\ntry again tomorrow");
    }

    #[test]
    fn error_without_comment() {
        let error = find_service_error("ERROR: target unreachable!").unwrap();
        assert_eq!(error.comment, None);
        assert_eq!(error.message(), "ERROR: target unreachable!");
    }

    #[test]
    fn parts_are_independent() {
        let verdict = Verdict::from_response(
            &response("https://knoxss.me/wp-login.php", "window.open('http://a.b/x') ERROR: oops!"),
            ENDPOINT,
            "/wp-login.php",
        );
        assert_eq!(verdict.finding.as_deref(), Some("http://a.b/x"));
        assert!(verdict.login_required);
        assert_eq!(verdict.error.map(|e| e.line).as_deref(), Some("ERROR: oops!"));
    }
}
