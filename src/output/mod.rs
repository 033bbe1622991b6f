//! Output module for the sitemap file and crawl statistics
//!
//! This module handles:
//! - Serializing the visited URL set as sitemaps.org XML
//! - Summarizing page outcomes after a crawl

mod sitemap;
pub mod stats;

pub use sitemap::{format_sitemap, write_sitemap, SITEMAP_NAMESPACE};
pub use stats::{print_statistics, CrawlStatistics};

use thiserror::Error;

/// Errors raised while writing output files
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write sitemap: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for output operations
pub type OutputResult<T> = std::result::Result<T, OutputError>;
