// src/config.rs

//! Settings, read from a TOML file with a default for every field.

use crate::core::error::{Error, Result};
use crate::logging::{get_data_dir, project_directory};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Environment variable pointing at an alternative settings file.
pub const CONFIG_ENV: &str = "LIVEKNOXSS_CONFIG";

/// The version string sent to the scanning service.
pub fn client_version() -> String {
    format!("v{}", env!("CARGO_PKG_VERSION"))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub service: ServiceSettings,
    pub storage: StorageSettings,
    pub ui: UiSettings,
}

/// Where the scanning service lives and how to talk to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Form endpoint scan requests are POSTed to.
    pub endpoint: String,
    /// Domain the service's session cookies are set for.
    pub auth_cookie_domain: String,
    /// Path of the service's login page; landing there means the session expired.
    pub login_path: String,
    /// Header identifying this client to the service.
    pub client_header: String,
    pub client_name: String,
    pub timeout_secs: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://knoxss.me/old/pro".to_string(),
            auth_cookie_domain: "knoxss.me".to_string(),
            login_path: "/wp-login.php".to_string(),
            client_header: "X-WebExtension".to_string(),
            client_name: "LiveKNOXSS".to_string(),
            timeout_secs: 30,
        }
    }
}

impl ServiceSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cookie_jar: Option<PathBuf>,
}

impl StorageSettings {
    pub fn state_file(&self) -> PathBuf {
        self.state_file
            .clone()
            .unwrap_or_else(|| get_data_dir().join("state.json"))
    }

    pub fn cookie_jar(&self) -> PathBuf {
        self.cookie_jar
            .clone()
            .unwrap_or_else(|| get_data_dir().join("cookies.json"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    pub show_logs: bool,
    pub show_disclaimer: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self { show_logs: true, show_disclaimer: true }
    }
}

impl Settings {
    /// Loads settings from `LIVEKNOXSS_CONFIG`, else `<config dir>/config.toml`.
    ///
    /// A missing file yields the defaults.
    pub fn load_default() -> Result<Self> {
        let path = match std::env::var_os(CONFIG_ENV) {
            Some(path) => PathBuf::from(path),
            None => match project_directory() {
                Some(dirs) => dirs.config_dir().join("config.toml"),
                None => return Ok(Self::default()),
            },
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        let settings = Self::from_toml(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.service.timeout_secs == 0 {
            return Err(Error::Config("service.timeout_secs must be greater than 0".to_string()));
        }

        let endpoint = Url::parse(&self.service.endpoint)
            .map_err(|e| Error::Config(format!("service.endpoint: {e}")))?;
        if !matches!(endpoint.scheme(), "http" | "https") || endpoint.host_str().is_none() {
            return Err(Error::Config("service.endpoint must be an absolute http(s) URL".to_string()));
        }

        if self.service.auth_cookie_domain.trim().is_empty() {
            return Err(Error::Config("service.auth_cookie_domain must not be empty".to_string()));
        }

        Ok(())
    }
}
