// src/adapters/http.rs

use crate::core::error::{Error, Result};
use crate::core::models::{ServiceRequest, ServiceResponse};
use crate::core::ports::HttpClient;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;
use tracing::{debug, error, warn};

/// `HttpClient` backed by a shared `reqwest::Client`.
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Builds the client. `timeout` bounds the whole request, body included.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("liveknoxss-rs/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| {
                error!(error = %e, "Failed to build HTTP client.");
                Error::Http(e)
            })?;
        Ok(Self { client })
    }
}

fn header_map(headers: &[(String, String)]) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        match (HeaderName::try_from(name.as_str()), HeaderValue::from_str(value)) {
            (Ok(name), Ok(value)) => {
                map.insert(name, value);
            }
            _ => warn!(header_name = %name, "Skipping header that is not valid HTTP."),
        }
    }
    map
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn post(&self, request: ServiceRequest) -> Result<ServiceResponse> {
        debug!(url = %request.url, "Sending POST.");
        let response = self
            .client
            .post(&request.url)
            .headers(header_map(&request.headers))
            .body(request.body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::ServiceUnreachable(format!("request timed out: {}", e))
                } else {
                    Error::ServiceUnreachable(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        let url = response.url().to_string();
        let body = response.text().await?;
        debug!(status, url = %url, bytes = body.len(), "Received response.");
        Ok(ServiceResponse { status, url, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_headers_are_skipped() {
        let map = header_map(&[
            ("Accept".to_string(), "text/html".to_string()),
            ("Bad Header".to_string(), "x".to_string()),
            ("X-Ok".to_string(), "line\nbreak".to_string()),
        ]);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("accept").unwrap(), "text/html");
    }
}
