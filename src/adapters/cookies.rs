// src/adapters/cookies.rs

use crate::core::error::Result;
use crate::core::models::Cookie;
use crate::core::ports::CookieProvider;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Whether a cookie set for `cookie_domain` is sent to `domain` or its subdomains.
///
/// A leading dot on the cookie's domain is ignored.
pub fn cookie_matches(cookie_domain: &str, domain: &str) -> bool {
    let cookie_domain = cookie_domain.trim_start_matches('.').to_ascii_lowercase();
    let domain = domain.trim_start_matches('.').to_ascii_lowercase();
    cookie_domain == domain || cookie_domain.ends_with(&format!(".{}", domain))
}

/// Cookies read from a JSON list of `{domain, name, value}` objects.
///
/// The file is re-read on every lookup so edits (e.g. a fresh login to the
/// scanning service) take effect without a restart. A missing file is an
/// empty jar.
pub struct CookieJar {
    path: PathBuf,
}

impl CookieJar {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    async fn read_all(&self) -> Result<Vec<Cookie>> {
        if !tokio::fs::try_exists(&self.path).await? {
            return Ok(Vec::new());
        }
        let content = tokio::fs::read_to_string(&self.path).await?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }
}

#[async_trait]
impl CookieProvider for CookieJar {
    async fn cookies_for_domain(&self, domain: &str) -> Result<Vec<Cookie>> {
        let cookies: Vec<Cookie> = self
            .read_all()
            .await?
            .into_iter()
            .filter(|cookie| cookie_matches(&cookie.domain, domain))
            .collect();
        debug!(domain, count = cookies.len(), "Cookies looked up.");
        Ok(cookies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_domain_and_subdomains() {
        assert!(cookie_matches(".example.com", "example.com"));
        assert!(cookie_matches("shop.example.com", "example.com"));
        assert!(!cookie_matches("example.com", "shop.example.com"));
        assert!(!cookie_matches("badexample.com", "example.com"));
    }

    #[tokio::test]
    async fn jar_filters_by_domain() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies.json");
        std::fs::write(
            &path,
            r#"[
                {"domain": ".knoxss.me", "name": "wordpress_logged_in", "value": "abc"},
                {"domain": "example.com", "name": "sid", "value": "1"}
            ]"#,
        )
        .unwrap();

        let jar = CookieJar::new(&path);
        let auth = jar.cookies_for_domain("knoxss.me").await.unwrap();
        assert_eq!(auth.len(), 1);
        assert_eq!(auth[0].name, "wordpress_logged_in");
        assert!(jar.cookies_for_domain("other.org").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_jar_is_empty() {
        let jar = CookieJar::new("/nonexistent/cookies.json");
        assert!(jar.cookies_for_domain("example.com").await.unwrap().is_empty());
    }
}
