//! Crawl frontier and visited-set bookkeeping
//!
//! The frontier is owned by a single coordinator. Moving a URL from the
//! pending queue into the visited set happens in one `claim_next` call, so
//! a URL can be handed to a fetch worker at most once.

use crate::url::CanonicalUrl;
use std::collections::{HashSet, VecDeque};

/// Pending and visited URLs of one crawl run
///
/// Pending URLs are served first-in first-out, which makes the traversal
/// breadth-first. The visited set only grows.
#[derive(Debug, Default)]
pub struct Frontier {
    /// URLs waiting to be fetched, in discovery order
    queue: VecDeque<CanonicalUrl>,

    /// Membership index for `queue`
    pending: HashSet<CanonicalUrl>,

    /// URLs already claimed for fetching
    visited: HashSet<CanonicalUrl>,
}

impl Frontier {
    /// Creates a frontier holding only the seed
    pub fn new(seed: CanonicalUrl) -> Self {
        let mut frontier = Self::default();
        frontier.offer(seed);
        frontier
    }

    /// Pops the next pending URL and marks it visited
    ///
    /// Returns `None` once nothing is pending.
    pub fn claim_next(&mut self) -> Option<CanonicalUrl> {
        let url = self.queue.pop_front()?;
        self.pending.remove(&url);
        self.visited.insert(url.clone());
        Some(url)
    }

    /// Queues a URL unless it is already visited or pending
    ///
    /// Returns true if the URL was queued.
    pub fn offer(&mut self, url: CanonicalUrl) -> bool {
        if self.visited.contains(&url) || self.pending.contains(&url) {
            return false;
        }

        self.pending.insert(url.clone());
        self.queue.push_back(url);
        true
    }

    /// Returns true if the URL has been claimed
    pub fn is_visited(&self, url: &CanonicalUrl) -> bool {
        self.visited.contains(url)
    }

    /// Returns true if the URL is waiting to be claimed
    pub fn is_pending(&self, url: &CanonicalUrl) -> bool {
        self.pending.contains(url)
    }

    /// Returns true if nothing is pending
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of pending URLs
    pub fn pending_len(&self) -> usize {
        self.queue.len()
    }

    /// Number of visited URLs
    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }

    /// Consumes the frontier and returns the visited set
    pub fn into_visited(self) -> HashSet<CanonicalUrl> {
        self.visited
    }
}
