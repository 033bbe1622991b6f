//! URL handling module for Sitemapper
//!
//! This module provides URL canonicalization, the crawl domain, and the
//! scope filter deciding which links are followed.

mod canonicalize;
mod domain;
mod scope;

// Re-export main functions
pub use canonicalize::{canonicalize, canonicalize_seed, ensure_scheme, CanonicalUrl};
pub use domain::Domain;
pub use scope::in_scope;
