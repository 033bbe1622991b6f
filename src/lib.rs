//! Sitemapper: a single-domain sitemap generator
//!
//! This crate crawls every reachable HTML page of one web domain, starting
//! from a seed URL, and writes the visited pages as a sitemaps.org XML file.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Sitemapper operations
#[derive(Debug, Error)]
pub enum SitemapperError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
///
/// Every variant means the same thing to the crawl: the link is malformed
/// and gets dropped.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("Malformed URL: {0}")]
    Malformed(String),

    #[error("Invalid percent-escape in URL: {0}")]
    InvalidEscape(String),

    #[error("Missing host in URL: {0}")]
    MissingHost(String),
}

/// Result type alias for Sitemapper operations
pub type Result<T> = std::result::Result<T, SitemapperError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use crate::url::{
    canonicalize, canonicalize_seed, ensure_scheme, in_scope, CanonicalUrl, Domain,
};
pub use config::Config;
pub use crawler::{Coordinator, CrawlResult, CrawlSettings};
pub use state::PageState;
