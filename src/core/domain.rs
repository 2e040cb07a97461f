// src/core/domain.rs

//! Domain classification: host extraction and second-level-domain rules.

use crate::core::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;

// Optional http(s) scheme, optional credentials, optional leading "www.", then the host.
static RE_HOST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:https?://)?(?:[^@/\n]+@)?(?:www\.)?([^:/?#\n]+)").unwrap()
});

/// Extracts the host portion of `url`, without scheme, credentials or a leading `www.`.
///
/// The host is lower-cased. A URL with nothing that looks like a host is an error.
pub fn extract_host(url: &str) -> Result<String> {
    RE_HOST
        .captures(url.trim())
        .and_then(|caps| caps.get(1))
        .map(|host| host.as_str().to_ascii_lowercase())
        .ok_or_else(|| Error::HostExtraction { url: url.to_string() })
}

/// A host is tracked only if it is non-empty and has at least one dot.
///
/// Single-label hosts such as `localhost` are never valid.
pub fn is_valid_domain(host: &str) -> bool {
    !host.is_empty() && host.contains('.')
}

/// Extracts the host of `url` and rejects it unless it is a valid domain.
pub fn domain_from_url(url: &str) -> Result<String> {
    let host = extract_host(url)?;
    if is_valid_domain(&host) {
        Ok(host)
    } else {
        Err(Error::InvalidDomain(host))
    }
}

/// True iff `host` has exactly two dot-separated labels.
pub fn is_second_level_domain(host: &str) -> bool {
    host.split('.').count() == 2
}

/// The last two labels of `host`, or `host` itself when already second-level.
///
/// No public suffix list is consulted: `shop.example.co.uk` maps to `co.uk`.
pub fn second_level_domain_of(host: &str) -> String {
    if is_second_level_domain(host) {
        return host.to_string();
    }
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() < 2 {
        return host.to_string();
    }
    labels[labels.len() - 2..].join(".")
}

/// Decides where second-level boundaries lie.
///
/// The store and the propagation engine only go through this trait, so a
/// suffix-list backed implementation can replace the label-count heuristic.
pub trait SecondLevelStrategy: Send + Sync {
    fn is_second_level(&self, host: &str) -> bool;
    fn second_level_of(&self, host: &str) -> String;
}

/// The default heuristic: "second-level" means exactly two labels.
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelCount;

impl SecondLevelStrategy for LabelCount {
    fn is_second_level(&self, host: &str) -> bool {
        is_second_level_domain(host)
    }

    fn second_level_of(&self, host: &str) -> String {
        second_level_domain_of(host)
    }
}
