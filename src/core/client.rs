//! Shared HTTP client for the GitLab API
//!
//! Built once from the run configuration and handed to every component that
//! issues requests. Nothing mutates it after construction, so clones are
//! shared freely across workers.

use std::time::Duration;

use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, CONNECTION, COOKIE};
use reqwest::{Client, ClientBuilder, Response, Url};
use serde::de::DeserializeOwned;

use crate::core::config::MirrorConfig;
use crate::core::endpoint::Endpoints;
use crate::core::error::{Error, Result};

/// Per-request timeout for list endpoints
const LIST_TIMEOUT: Duration = Duration::from_secs(30);

/// Idle read timeout, applies to archive bodies as well
const READ_TIMEOUT: Duration = Duration::from_secs(15);

/// GitLab API client with credentials baked into its default headers
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    endpoints: Endpoints,
}

impl ApiClient {
    /// Build a client from the run configuration
    pub fn new(config: &MirrorConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();

        let mut token = HeaderValue::from_str(config.token.trim())
            .map_err(|_| Error::InvalidInput("Token contains invalid header characters".to_string()))?;
        token.set_sensitive(true);
        headers.insert("PRIVATE-TOKEN", token);
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

        if let Some(cookie) = &config.cookie {
            let mut value = HeaderValue::from_str(cookie)
                .map_err(|_| Error::InvalidInput("Cookie contains invalid header characters".to_string()))?;
            value.set_sensitive(true);
            headers.insert(COOKIE, value);
        }

        let user_agent = config
            .user_agent
            .clone()
            .unwrap_or_else(|| format!("gitlab-archive-dl/{}", env!("CARGO_PKG_VERSION")));

        let http = ClientBuilder::new()
            .default_headers(headers)
            .user_agent(user_agent)
            .tcp_keepalive(Duration::from_secs(60))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(20)
            .connect_timeout(Duration::from_secs(10))
            .read_timeout(READ_TIMEOUT)
            .build()
            .map_err(|e| Error::InvalidInput(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoints: Endpoints::new(&config.base_url),
        })
    }

    /// Route builder for this instance
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Fetch one page of a list endpoint and decode it
    pub async fn get_page<T: DeserializeOwned>(&self, url: &str) -> Result<Vec<T>> {
        debug!("GET {url}");
        let response = self
            .http
            .get(url)
            .timeout(LIST_TIMEOUT)
            .send()
            .await
            .map_err(|e| Error::network(url, e))?;

        if !response.status().is_success() {
            return Err(Error::status(url, response.status()));
        }

        let body = response.bytes().await.map_err(|e| Error::network(url, e))?;
        serde_json::from_slice(&body).map_err(|e| Error::Decode(format!("{url}: {e}")))
    }

    /// Request an archive; only a success status is returned as `Ok`
    pub async fn get_archive(&self, url: &Url) -> Result<Response> {
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::network(url.as_str(), e))?;

        if !response.status().is_success() {
            return Err(Error::status(url.as_str(), response.status()));
        }
        Ok(response)
    }
}
