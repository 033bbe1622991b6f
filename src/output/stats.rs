//! Statistics generation from a finished crawl
//!
//! This module provides functionality for summarizing page outcomes and
//! displaying them after the sitemap is written.

use crate::crawler::CrawlResult;
use crate::state::PageState;
use std::collections::HashMap;
use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Domain the crawl was confined to
    pub domain: String,

    /// Total number of visited pages
    pub total_pages: u64,

    /// Count of pages by state
    pub pages_by_state: HashMap<PageState, u64>,

    /// Error states and their counts
    pub error_summary: HashMap<PageState, u64>,

    /// Wall-clock duration of the crawl
    pub elapsed: Duration,
}

impl CrawlStatistics {
    /// Counts the pages of a crawl result by state
    pub fn from_result(result: &CrawlResult) -> Self {
        let mut pages_by_state = HashMap::new();
        for state in result.pages().values() {
            *pages_by_state.entry(*state).or_insert(0) += 1;
        }

        let error_summary = pages_by_state
            .iter()
            .filter(|(state, _)| state.is_error())
            .map(|(state, count)| (*state, *count))
            .collect();

        Self {
            domain: result.domain().to_string(),
            total_pages: result.len() as u64,
            pages_by_state,
            error_summary,
            elapsed: result.elapsed(),
        }
    }

    /// Number of pages in the given state
    pub fn count(&self, state: PageState) -> u64 {
        self.pages_by_state.get(&state).copied().unwrap_or(0)
    }

    /// Percentage of visited pages that were processed
    pub fn success_rate(&self) -> f64 {
        if self.total_pages > 0 {
            (self.count(PageState::Processed) as f64 / self.total_pages as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Domain: {}", stats.domain);
    println!("  Total pages visited: {}", stats.total_pages);
    println!("  Elapsed: {:.1}s", stats.elapsed.as_secs_f64());
    println!();

    println!("Pages by State:");
    // Sort states by count (descending), then by name for stable output
    let mut state_counts: Vec<_> = stats.pages_by_state.iter().collect();
    state_counts.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));

    for (state, count) in state_counts {
        let percentage = if stats.total_pages > 0 {
            (*count as f64 / stats.total_pages as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", state, count, percentage);
    }
    println!();

    if !stats.error_summary.is_empty() {
        println!("Error Summary:");
        let mut error_counts: Vec<_> = stats.error_summary.iter().collect();
        error_counts.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));

        for (state, count) in error_counts {
            println!("  {}: {}", state, count);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} pages successfully processed)",
        stats.success_rate(),
        stats.count(PageState::Processed),
        stats.total_pages
    );
}
