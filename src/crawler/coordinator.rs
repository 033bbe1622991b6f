//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! the crawling process, including:
//! - Owning the frontier and visited set
//! - Dispatching fetches to a bounded pool of worker tasks
//! - Canonicalizing and scope-filtering discovered links
//! - Recording the outcome of every visited URL

use crate::config::Config;
use crate::crawler::fetcher::{FetchResult, HttpFetcher, PageFetcher};
use crate::crawler::frontier::Frontier;
use crate::crawler::parser::{HtmlLinkExtractor, LinkExtractor};
use crate::state::PageState;
use crate::url::{canonicalize, in_scope, CanonicalUrl, Domain};
use crate::{SitemapperError, UrlError};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use url::Url;

/// Tuning knobs of the traversal engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSettings {
    /// Maximum number of fetches in flight
    pub workers: usize,

    /// Hard bound on a single fetch
    pub request_timeout: Duration,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            workers: 1,
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl CrawlSettings {
    /// Builds settings from the crawler section of the configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            workers: config.crawler.workers as usize,
            request_timeout: Duration::from_secs(config.crawler.request_timeout_secs),
        }
    }
}

/// The visited set of a finished crawl with each page's outcome
#[derive(Debug, Clone)]
pub struct CrawlResult {
    domain: Domain,
    pages: BTreeMap<CanonicalUrl, PageState>,
    elapsed: Duration,
}

impl CrawlResult {
    /// The domain the crawl was confined to
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Every visited URL with its final state, sorted by URL
    pub fn pages(&self) -> &BTreeMap<CanonicalUrl, PageState> {
        &self.pages
    }

    /// Visited URLs in lexicographic order
    pub fn visited(&self) -> impl Iterator<Item = &CanonicalUrl> {
        self.pages.keys()
    }

    /// Returns the final state of a visited URL
    pub fn state_of(&self, url: &str) -> Option<PageState> {
        self.pages.get(url).copied()
    }

    /// Number of visited URLs
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Returns true if nothing was visited
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Wall-clock duration of the crawl
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// URLs to list in the sitemap
    ///
    /// With `include_failed`, every visited URL is listed, including pages
    /// whose fetch failed. Otherwise only successfully processed pages are.
    pub fn sitemap_urls(&self, include_failed: bool) -> Vec<&CanonicalUrl> {
        self.pages
            .iter()
            .filter(|(_, state)| include_failed || state.is_success())
            .map(|(url, _)| url)
            .collect()
    }
}

/// What a worker task reports back for one URL
#[derive(Debug)]
struct PageReport {
    url: CanonicalUrl,
    state: PageState,
    /// Final URL after redirects, present only for processed pages
    final_url: Option<String>,
    /// Raw hrefs extracted from the page
    links: Vec<String>,
    /// Failure description for logging
    detail: Option<String>,
}

/// Main crawler coordinator structure
///
/// The coordinator is the single owner of the frontier and visited set.
/// Workers only fetch and extract; every state change happens in `run`.
pub struct Coordinator {
    seed: CanonicalUrl,
    domain: Domain,
    frontier: Frontier,
    pages: BTreeMap<CanonicalUrl, PageState>,
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<dyn LinkExtractor>,
    settings: CrawlSettings,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `seed` - The canonical start URL; its authority becomes the domain
    /// * `fetcher` - Page-fetching collaborator
    /// * `extractor` - Link-extraction collaborator
    /// * `settings` - Worker count and fetch timeout
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(UrlError)` - The seed has no host
    pub fn new(
        seed: CanonicalUrl,
        fetcher: Arc<dyn PageFetcher>,
        extractor: Arc<dyn LinkExtractor>,
        settings: CrawlSettings,
    ) -> Result<Self, UrlError> {
        let domain = Domain::from_url(&seed)?;

        Ok(Self {
            frontier: Frontier::new(seed.clone()),
            seed,
            domain,
            pages: BTreeMap::new(),
            fetcher,
            extractor,
            settings,
        })
    }

    /// Creates a coordinator with the HTTP fetcher and HTML link extractor
    pub fn from_config(seed: CanonicalUrl, config: &Config) -> Result<Self, SitemapperError> {
        let settings = CrawlSettings::from_config(config);
        let fetcher = HttpFetcher::new(&config.http, settings.request_timeout)?;

        Ok(Self::new(
            seed,
            Arc::new(fetcher),
            Arc::new(HtmlLinkExtractor),
            settings,
        )?)
    }

    /// The domain this crawl is confined to
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Runs the main crawl loop until the frontier is exhausted
    ///
    /// Each iteration fills the worker pool from the frontier (claiming a URL
    /// marks it visited before its fetch is dispatched), then waits for one
    /// worker to report and feeds its in-scope links back into the frontier.
    /// The loop ends when nothing is pending and nothing is in flight.
    pub async fn run(mut self) -> CrawlResult {
        tracing::info!("Starting crawl of {} from {}", self.domain, self.seed);

        let start_time = Instant::now();
        let workers = self.settings.workers.max(1);
        let mut in_flight: JoinSet<PageReport> = JoinSet::new();
        let mut pages_crawled = 0usize;

        loop {
            while in_flight.len() < workers {
                let Some(url) = self.frontier.claim_next() else {
                    break;
                };

                tracing::info!("Crawling: {}", url);
                self.pages.insert(url.clone(), PageState::Fetching);
                in_flight.spawn(visit(
                    url,
                    Arc::clone(&self.fetcher),
                    Arc::clone(&self.extractor),
                    self.settings.request_timeout,
                ));
            }

            let joined = match in_flight.join_next().await {
                Some(joined) => joined,
                None => {
                    tracing::info!("Frontier is empty, crawl complete");
                    break;
                }
            };

            match joined {
                Ok(report) => self.handle_report(report),
                Err(e) => tracing::error!("Fetch worker failed: {}", e),
            }

            pages_crawled += 1;

            if pages_crawled % 10 == 0 {
                let rate = pages_crawled as f64 / start_time.elapsed().as_secs_f64();
                tracing::info!(
                    "Progress: {} pages crawled, {} in frontier, {:.2} pages/sec",
                    pages_crawled,
                    self.frontier.pending_len(),
                    rate
                );
            }
        }

        // A worker that panicked never reported; its URL stays visited
        for (url, state) in self.pages.iter_mut() {
            if !state.is_terminal() {
                tracing::warn!("No result recorded for {}, marking as failed", url);
                *state = PageState::Failed;
            }
        }

        let elapsed = start_time.elapsed();
        tracing::info!(
            "Crawl completed: {} pages crawled in {:?}",
            self.pages.len(),
            elapsed
        );

        CrawlResult {
            domain: self.domain,
            pages: self.pages,
            elapsed,
        }
    }

    /// Records a worker's outcome and queues the links it found
    fn handle_report(&mut self, report: PageReport) {
        self.pages.insert(report.url.clone(), report.state);

        let Some(final_url) = report.final_url else {
            tracing::warn!(
                "Skipping {} ({}): {}",
                report.url,
                report.state,
                report.detail.as_deref().unwrap_or("no detail")
            );
            return;
        };

        let base = match link_base(&final_url) {
            Some(base) => base,
            None => match report.url.to_url() {
                Ok(url) => origin_of(url),
                Err(e) => {
                    tracing::warn!("No usable base URL for {}: {}", report.url, e);
                    return;
                }
            },
        };

        let mut queued = 0usize;
        for link in &report.links {
            let canonical = match canonicalize(link, &base) {
                Ok(url) => url,
                Err(e) => {
                    tracing::debug!("Dropping link {} on {}: {}", link, report.url, e);
                    continue;
                }
            };

            if !in_scope(&canonical, &self.domain) {
                tracing::trace!("Out of scope: {}", canonical);
                continue;
            }

            if self.frontier.offer(canonical) {
                queued += 1;
            }
        }

        tracing::debug!(
            "Processed {}: {} links, {} new",
            report.url,
            report.links.len(),
            queued
        );
    }
}

/// Fetches one URL and extracts its links; runs on a worker task
async fn visit(
    url: CanonicalUrl,
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<dyn LinkExtractor>,
    timeout: Duration,
) -> PageReport {
    let result = match tokio::time::timeout(timeout, fetcher.fetch(url.as_str())).await {
        Ok(result) => result,
        Err(_) => FetchResult::timed_out(timeout),
    };

    let state = result.state();
    match result {
        FetchResult::Success {
            final_url, body, ..
        } => PageReport {
            url,
            state,
            links: extractor.extract(&body),
            final_url: Some(final_url),
            detail: None,
        },
        FetchResult::ContentMismatch { content_type } => PageReport {
            url,
            state,
            final_url: None,
            links: Vec::new(),
            detail: Some(format!("Expected HTML, got '{}'", content_type)),
        },
        FetchResult::HttpError { status_code, .. } => PageReport {
            url,
            state,
            final_url: None,
            links: Vec::new(),
            detail: Some(format!("HTTP {}", status_code)),
        },
        FetchResult::NetworkError { error, .. } => PageReport {
            url,
            state,
            final_url: None,
            links: Vec::new(),
            detail: Some(error),
        },
    }
}

/// Base for resolving links found on a page: `scheme://authority/` of the
/// response's final URL
fn link_base(final_url: &str) -> Option<Url> {
    Url::parse(final_url).ok().map(origin_of)
}

fn origin_of(mut url: Url) -> Url {
    url.set_path("/");
    url.set_query(None);
    url.set_fragment(None);
    url
}

/// Runs a complete crawl from a canonical seed with the HTTP collaborators
///
/// # Example
///
/// ```no_run
/// use sitemapper::config::Config;
/// use sitemapper::crawler::run_crawl;
/// use sitemapper::url::canonicalize_seed;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let seed = canonicalize_seed("http://example.com/")?;
/// let result = run_crawl(seed, &Config::default()).await?;
/// println!("{} pages", result.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    seed: CanonicalUrl,
    config: &Config,
) -> Result<CrawlResult, SitemapperError> {
    let coordinator = Coordinator::from_config(seed, config)?;
    Ok(coordinator.run().await)
}
