//! Thin HTTP client for the Webacy risk API.

use std::time::Duration;

use reqwest::{Client, Method};
use serde_json::Value;
use url::Url;
use webacy_mcp_core::ToolError;

/// Default API base URL.
pub const DEFAULT_API_URL: &str = "https://api.webacy.com";

/// Request timeout applied to every call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from the Webacy API.
#[derive(Debug, thiserror::Error)]
pub enum WebacyError {
    /// The API answered with a non-2xx status
    #[error("Webacy API error: {status} {status_text}")]
    Status { status: u16, status_text: String },

    #[error("Webacy API request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid Webacy API URL: {0}")]
    InvalidUrl(String),
}

impl WebacyError {
    /// Returns true if the API answered with an error status
    pub fn is_status(&self) -> bool {
        matches!(self, Self::Status { .. })
    }
}

impl From<WebacyError> for ToolError {
    fn from(err: WebacyError) -> Self {
        ToolError::Upstream(err.to_string())
    }
}

/// Connection settings for [`WebacyClient`].
#[derive(Debug, Clone)]
pub struct WebacyConfig {
    pub api_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl Default for WebacyConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: String::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl WebacyConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }
}

/// Per-request options.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: Vec::new(),
            query: Vec::new(),
            body: None,
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    /// A POST carrying `body` as JSON.
    pub fn post(body: Value) -> Self {
        Self {
            method: Method::POST,
            body: Some(body),
            ..Self::default()
        }
    }

    /// Append a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Append a query parameter only when `value` is present.
    pub fn query_opt<V: ToString>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(v) => self.query(key, v),
            None => self,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Client for the Webacy risk API.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct WebacyClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl WebacyClient {
    pub fn new(config: WebacyConfig) -> Result<Self, WebacyError> {
        Url::parse(&config.api_url)
            .map_err(|e| WebacyError::InvalidUrl(format!("{}: {}", config.api_url, e)))?;

        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Call `endpoint` (a path beginning with `/`) and decode the JSON reply.
    pub async fn request(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<Value, WebacyError> {
        let result = self.send(endpoint, options).await;
        if let Err(e) = &result {
            tracing::error!(endpoint, error = %e, "error calling Webacy API");
        }
        result
    }

    async fn send(&self, endpoint: &str, options: RequestOptions) -> Result<Value, WebacyError> {
        let url = format!("{}{}", self.base_url, endpoint);
        tracing::debug!(method = %options.method, %url, "calling Webacy API");

        let mut builder = self
            .client
            .request(options.method, &url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .header("X-API-Key", &self.api_key);

        for (name, value) in &options.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !options.query.is_empty() {
            builder = builder.query(&options.query);
        }
        if let Some(body) = &options.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(WebacyError::Status {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        Ok(response.json::<Value>().await?)
    }
}
