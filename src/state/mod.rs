//! State module for tracking crawl progress
//!
//! `PageState` records what happened to each visited URL.

mod page_state;

// Re-export main types
pub use page_state::PageState;
