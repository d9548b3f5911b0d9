//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests made by the harvester:
//! - Building the HTTP client with the configured user agent and timeouts
//! - Classifying every response or error as success, transient, or permanent
//! - Driving the transient retry loop

use crate::config::HttpConfig;
use crate::crawler::retry::{retry_transient, Clock, RetryPolicy, TokioClock};
use crate::FetchError;
use reqwest::header::LOCATION;
use reqwest::{redirect::Policy, Client};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// A fully received response
#[derive(Debug, Clone)]
pub struct FetchedResponse {
    /// URL the body was served from
    pub final_url: Url,
    /// HTTP status code
    pub status_code: u16,
    /// Complete body
    pub body: Vec<u8>,
}

impl FetchedResponse {
    /// Body decoded as UTF-8, replacing invalid sequences
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are never followed: for this catalog a redirect means the book is
/// gone, so it has to be observed rather than silently resolved.
///
/// # Example
///
/// ```no_run
/// use tome_harvest::config::HttpConfig;
/// use tome_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .redirect(Policy::none())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Resilient GET with failure classification
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | Connect error, timeout | Retry forever, capped linear backoff |
/// | Body read failure (truncated transfer) | Retry forever, capped linear backoff |
/// | HTTP 3xx / final URL differs | Immediate → `Redirected` |
/// | Other non-success status | Immediate → `HttpStatus` |
/// | Deadline would be crossed | Immediate → `DeadlineExceeded` |
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    policy: RetryPolicy,
    clock: Arc<dyn Clock>,
}

impl Fetcher {
    pub fn new(client: Client, policy: RetryPolicy) -> Self {
        Self::with_clock(client, policy, Arc::new(TokioClock))
    }

    pub fn with_clock(client: Client, policy: RetryPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            client,
            policy,
            clock,
        }
    }

    /// Fetches a URL, retrying transient failures
    ///
    /// Each call starts its own backoff sequence at zero.
    pub async fn fetch(&self, url: &Url) -> Result<FetchedResponse, FetchError> {
        retry_transient(&self.policy, self.clock.as_ref(), url.as_str(), || {
            fetch_once(&self.client, url)
        })
        .await
    }
}

impl std::fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetcher")
            .field("client", &self.client)
            .field("policy", &self.policy)
            .finish()
    }
}

/// Performs a single GET attempt and classifies its outcome
pub async fn fetch_once(client: &Client, url: &Url) -> Result<FetchedResponse, FetchError> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| classify_error(url, e))?;

    let status = response.status();
    let final_url = response.url().clone();

    if status.is_redirection() {
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        return Err(FetchError::Redirected {
            url: url.to_string(),
            location,
        });
    }

    // Only reachable with a caller-supplied client that follows redirects
    if final_url != *url {
        return Err(FetchError::Redirected {
            url: url.to_string(),
            location: final_url.to_string(),
        });
    }

    if !status.is_success() {
        return Err(FetchError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    // Read the whole body here so a truncated transfer fails this attempt
    let body = response
        .bytes()
        .await
        .map_err(|e| classify_error(url, e))?;

    Ok(FetchedResponse {
        final_url,
        status_code: status.as_u16(),
        body: body.to_vec(),
    })
}

/// Maps a reqwest error onto the fetch taxonomy
///
/// Anything that happened on the wire (connect, timeout, request I/O, body
/// read, decoding of a cut-off compressed body) is transient. Errors reqwest
/// raises about the request itself cannot improve by waiting.
fn classify_error(url: &Url, error: reqwest::Error) -> FetchError {
    if error.is_builder() {
        return FetchError::InvalidRequest {
            url: url.to_string(),
            message: error.to_string(),
        };
    }

    if let Some(status) = error.status() {
        return FetchError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        };
    }

    let message = if error.is_timeout() {
        format!("request timeout: {}", error)
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else if error.is_body() || error.is_decode() {
        format!("truncated transfer: {}", error)
    } else {
        error.to_string()
    };

    FetchError::Network {
        url: url.to_string(),
        message,
    }
}
