//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the engine, including:
//! - Building the shared HTTP client from configuration
//! - Validating that a link is an absolute address before any request
//! - GET requests to fetch page content
//! - Error classification

use crate::config::HttpConfig;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Reasons a page could not be retrieved
#[derive(Debug, Error)]
pub enum FetchError {
    /// The link is not a well-formed absolute http(s) address; no request was made
    #[error("Invalid address {link}: {reason}")]
    InvalidAddress { link: String, reason: String },

    /// The server answered with a non-success status
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// The request did not finish within the client timeout
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    /// Connection, DNS, TLS or body decoding failure
    #[error("Transport error for {url}: {source}")]
    Transport { url: String, source: reqwest::Error },
}

impl FetchError {
    /// Short category name used in log lines
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidAddress { .. } => "invalid-address",
            Self::Status { .. } => "http-status",
            Self::Timeout { .. } => "timeout",
            Self::Transport { .. } => "transport",
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use product_parser::config::HttpConfig;
/// use product_parser::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Checks that a link is an absolute http or https address
///
/// Relative references, bare words and other schemes are rejected before
/// any network activity happens.
pub fn validate_link(link: &str) -> Result<Url, FetchError> {
    let url = Url::parse(link).map_err(|e| FetchError::InvalidAddress {
        link: link.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(FetchError::InvalidAddress {
            link: link.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

/// Fetches a page and returns its body
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `link` - The address to fetch
///
/// # Returns
///
/// * `Ok(String)` - The page markup
/// * `Err(FetchError)` - The address was invalid or the request failed
pub async fn fetch_page(client: &Client, link: &str) -> Result<String, FetchError> {
    let url = validate_link(link)?;

    let response = client.get(url).send().await.map_err(|e| classify(link, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: link.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|e| classify(link, e))
}

/// Maps a reqwest error onto the fetch error categories
fn classify(link: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: link.to_string(),
        }
    } else {
        FetchError::Transport {
            url: link.to_string(),
            source: error,
        }
    }
}
