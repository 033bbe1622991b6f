/// Page state definitions for tracking crawl progress
///
/// Every visited URL ends the crawl in exactly one of these states.
use std::fmt;

/// Represents the current state of a page in the crawl process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PageState {
    // ===== Active States =====
    /// Page has been claimed from the frontier and is being fetched
    Fetching,

    // ===== Terminal Success States =====
    /// Page was fetched as HTML and its links were extracted
    Processed,

    // ===== Terminal Error States =====
    /// Page Content-Type is not HTML
    ContentMismatch,

    /// Page returned HTTP 404 or 410
    DeadLink,

    /// Page returned any other non-2xx status
    HttpError,

    /// Page could not be reached (connection refused, DNS failure, TLS error)
    Unreachable,

    /// Page fetch exceeded the request timeout
    TimedOut,

    /// Page fetch failed for other reasons (body decode error, crashed worker)
    Failed,
}

impl PageState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Fetching)
    }

    /// Returns true if this represents a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Processed)
    }

    /// Returns true if this represents an error state
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::ContentMismatch
                | Self::DeadLink
                | Self::HttpError
                | Self::Unreachable
                | Self::TimedOut
                | Self::Failed
        )
    }

    /// Returns the short name used in logs and statistics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetching => "fetching",
            Self::Processed => "processed",
            Self::ContentMismatch => "content_mismatch",
            Self::DeadLink => "dead_link",
            Self::HttpError => "http_error",
            Self::Unreachable => "unreachable",
            Self::TimedOut => "timed_out",
            Self::Failed => "failed",
        }
    }

    /// Returns all possible page states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Fetching,
            Self::Processed,
            Self::ContentMismatch,
            Self::DeadLink,
            Self::HttpError,
            Self::Unreachable,
            Self::TimedOut,
            Self::Failed,
        ]
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
