use crate::url::{CanonicalUrl, Domain};

/// Decides whether a canonical URL should be followed
///
/// A URL is in scope when all of these hold:
/// - the scheme is `http` or `https`
/// - the authority equals `domain` exactly (no subdomains, no `www.` folding)
/// - there is no query string and no fragment
/// - the path ends with `.html` or `/`, or is empty
///
/// Anything else (`.php`, `.htm`, extensionless paths, other hosts) is
/// skipped.
///
/// # Examples
///
/// ```
/// use sitemapper::url::{canonicalize_seed, in_scope, Domain};
///
/// let seed = canonicalize_seed("http://example.com/").unwrap();
/// let domain = Domain::from_url(&seed).unwrap();
///
/// let page = canonicalize_seed("https://example.com/about.html").unwrap();
/// assert!(in_scope(&page, &domain));
///
/// let script = canonicalize_seed("http://example.com/index.php").unwrap();
/// assert!(!in_scope(&script, &domain));
/// ```
pub fn in_scope(url: &CanonicalUrl, domain: &Domain) -> bool {
    let Ok(parsed) = url.to_url() else {
        return false;
    };

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return false;
    }

    if !domain.matches(&parsed) {
        return false;
    }

    if parsed.query().is_some() || parsed.fragment().is_some() {
        return false;
    }

    let path = parsed.path();
    path.is_empty() || path.ends_with('/') || path.ends_with(".html")
}
