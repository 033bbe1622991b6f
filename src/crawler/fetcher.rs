//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with browser-like headers
//! - GET requests that follow redirects
//! - Error classification into page states

use crate::config::HttpConfig;
use crate::state::PageState;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{redirect::Policy, Client, StatusCode};
use std::time::Duration;

/// Result of a fetch operation
#[derive(Debug, Clone)]
pub enum FetchResult {
    /// Successfully fetched an HTML page
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Content-Type header value
        content_type: String,
        /// Page body content
        body: String,
    },

    /// Page is not HTML (Content-Type mismatch)
    ContentMismatch {
        /// The actual Content-Type received
        content_type: String,
    },

    /// Non-2xx HTTP status
    HttpError {
        /// The HTTP status code
        status_code: u16,
        /// The page state this error maps to
        state: PageState,
    },

    /// Network error (connection refused, timeout, etc.)
    NetworkError {
        /// Error description
        error: String,
        /// The page state this error maps to
        state: PageState,
    },
}

impl FetchResult {
    /// Returns the page state this result leaves the URL in
    pub fn state(&self) -> PageState {
        match self {
            Self::Success { .. } => PageState::Processed,
            Self::ContentMismatch { .. } => PageState::ContentMismatch,
            Self::HttpError { state, .. } | Self::NetworkError { state, .. } => *state,
        }
    }

    /// Builds the result for a fetch that exceeded its time bound
    pub fn timed_out(timeout: Duration) -> Self {
        Self::NetworkError {
            error: format!("Request timed out after {:?}", timeout),
            state: PageState::TimedOut,
        }
    }

    /// Classifies a response status and content type
    ///
    /// Returns `None` when the response is a 2xx HTML page whose body should
    /// be read.
    pub fn classify(status_code: u16, content_type: &str) -> Option<Self> {
        if status_code == 404 || status_code == 410 {
            return Some(Self::HttpError {
                status_code,
                state: PageState::DeadLink,
            });
        }

        if !(200..300).contains(&status_code) {
            return Some(Self::HttpError {
                status_code,
                state: PageState::HttpError,
            });
        }

        if !is_html(content_type) {
            return Some(Self::ContentMismatch {
                content_type: content_type.to_string(),
            });
        }

        None
    }
}

/// The page-fetching collaborator of the crawl engine
///
/// Implementations never fail: every outcome, including transport errors,
/// is expressed as a `FetchResult`.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches a URL and classifies the outcome
    async fn fetch(&self, url: &str) -> FetchResult;
}

/// `PageFetcher` backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher from HTTP settings and a request timeout
    pub fn new(config: &HttpConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config, timeout)?,
        })
    }

    /// Wraps an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchResult {
        fetch_url(&self.client, url).await
    }
}

/// Builds an HTTP client with proper configuration
///
/// The client sends a browser-like `User-Agent` and `Accept` header, lets
/// reqwest advertise and decode gzip, deflate and brotli bodies, follows up
/// to `max_redirects` redirects and bounds every request by `timeout`.
///
/// # Example
///
/// ```no_run
/// use sitemapper::config::HttpConfig;
/// use sitemapper::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&HttpConfig::default(), Duration::from_secs(10)).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig, timeout: Duration) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    if let Ok(accept) = HeaderValue::from_str(&config.accept) {
        headers.insert(ACCEPT, accept);
    } else {
        tracing::warn!("Ignoring invalid Accept header value: {}", config.accept);
    }

    Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .timeout(timeout)
        .connect_timeout(timeout)
        .redirect(Policy::limited(config.max_redirects as usize))
        .gzip(true)
        .brotli(true)
        .deflate(true)
        .build()
}

/// Fetches a URL with error handling
///
/// # Outcomes
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx with `text/html` | Success |
/// | 2xx with other Content-Type | ContentMismatch |
/// | HTTP 404 / 410 | HttpError → DeadLink |
/// | Other non-2xx | HttpError → HttpError |
/// | Timeout | NetworkError → TimedOut |
/// | Connection refused, DNS, TLS | NetworkError → Unreachable |
/// | Anything else | NetworkError → Failed |
pub async fn fetch_url(client: &Client, url: &str) -> FetchResult {
    match client.get(url).send().await {
        Ok(response) => {
            let status = response.status();
            let final_url = response.url().to_string();

            let content_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string();

            if let Some(failure) = FetchResult::classify(status.as_u16(), &content_type) {
                return failure;
            }

            match response.text().await {
                Ok(body) => FetchResult::Success {
                    final_url,
                    status_code: status.as_u16(),
                    content_type,
                    body,
                },
                Err(e) => classify_error(&e),
            }
        }
        Err(e) => classify_error(&e),
    }
}

/// Returns true if a Content-Type header denotes an HTML document
fn is_html(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().contains("text/html")
}

fn classify_error(e: &reqwest::Error) -> FetchResult {
    if e.is_timeout() {
        FetchResult::NetworkError {
            error: "Request timeout".to_string(),
            state: PageState::TimedOut,
        }
    } else if e.is_connect() {
        FetchResult::NetworkError {
            error: format!("Connection failed: {}", e),
            state: PageState::Unreachable,
        }
    } else if e.is_status() {
        FetchResult::HttpError {
            status_code: e.status().map_or(0, |s: StatusCode| s.as_u16()),
            state: PageState::HttpError,
        }
    } else {
        FetchResult::NetworkError {
            error: e.to_string(),
            state: PageState::Failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&HttpConfig::default(), Duration::from_secs(10));
        assert!(client.is_ok());
    }

    #[test]
    fn test_build_client_with_invalid_accept() {
        let config = HttpConfig {
            accept: "bad\nvalue".to_string(),
            ..HttpConfig::default()
        };
        assert!(build_http_client(&config, Duration::from_secs(10)).is_ok());
    }

    #[test]
    fn test_classify_success() {
        assert!(FetchResult::classify(200, "text/html; charset=utf-8").is_none());
        assert!(FetchResult::classify(203, "TEXT/HTML").is_none());
    }

    #[test]
    fn test_classify_dead_link() {
        let result = FetchResult::classify(404, "text/html").unwrap();
        assert_eq!(result.state(), PageState::DeadLink);

        let result = FetchResult::classify(410, "text/html").unwrap();
        assert_eq!(result.state(), PageState::DeadLink);
    }

    #[test]
    fn test_classify_server_error() {
        let result = FetchResult::classify(500, "text/html").unwrap();
        assert!(matches!(
            result,
            FetchResult::HttpError {
                status_code: 500,
                state: PageState::HttpError
            }
        ));
    }

    #[test]
    fn test_classify_non_html() {
        let result = FetchResult::classify(200, "application/pdf").unwrap();
        assert_eq!(result.state(), PageState::ContentMismatch);

        let result = FetchResult::classify(200, "").unwrap();
        assert_eq!(result.state(), PageState::ContentMismatch);
    }

    #[test]
    fn test_timed_out_state() {
        let result = FetchResult::timed_out(Duration::from_secs(10));
        assert_eq!(result.state(), PageState::TimedOut);
    }

    // Network behavior is covered with wiremock in the integration tests
}
