//! HTTP transport over reqwest

use super::{ApiError, ApiRequest, ApiResponse, Method, Transport};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

/// Default request timeout when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP transport talking to a release server
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTransport {
    /// Create a new HTTP transport rooted at `base_url` (e.g. `http://localhost:8080/api`)
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid release server URL: {}", base_url))?;

        if base_url.cannot_be_a_base() {
            anyhow::bail!("Release server URL cannot be used as a base: {}", base_url);
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("chartdeck/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        tracing::debug!("Created HTTP transport for: {}", base_url);

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Join an endpoint path onto the base URL, keeping the base path prefix
    pub fn url_for(&self, path: &str) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{}/{}", base, path.trim_start_matches('/'))
    }

    fn builder(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        match method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Put => self.client.put(url),
            Method::Delete => self.client.delete(url),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = self.url_for(&request.path);

        let mut req = self.builder(request.method, &url);
        if !request.token.is_empty() {
            req = req.bearer_auth(&request.token);
        }
        if !request.query.is_empty() {
            req = req.query(&request.query);
        }
        if let Some(body) = &request.body {
            req = req.json(body);
        }

        let resp = req.send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;

        Ok(ApiResponse { status, body })
    }
}
