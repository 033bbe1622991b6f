use crate::url::CanonicalUrl;
use crate::UrlError;
use std::fmt;
use url::Url;

/// The authority a crawl is confined to
///
/// Holds the lowercase host plus the port when it is not the scheme
/// default. The scheme is not part of it, so `http://x` and
/// `https://x` belong to the same domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Domain(String);

impl Domain {
    /// Extracts the domain from a canonical URL
    ///
    /// # Examples
    ///
    /// ```
    /// use sitemapper::url::{canonicalize_seed, Domain};
    ///
    /// let seed = canonicalize_seed("https://Example.com:8443/index.html").unwrap();
    /// let domain = Domain::from_url(&seed).unwrap();
    /// assert_eq!(domain.as_str(), "example.com:8443");
    /// ```
    pub fn from_url(url: &CanonicalUrl) -> Result<Self, UrlError> {
        let parsed = url.to_url()?;
        authority(&parsed)
            .map(Self)
            .ok_or_else(|| UrlError::MissingHost(url.to_string()))
    }

    /// Returns the authority string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the URL's authority is exactly this domain
    pub fn matches(&self, url: &Url) -> bool {
        authority(url).as_deref() == Some(self.0.as_str())
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Returns `host[:port]` for a URL, omitting default ports
///
/// `Url` already lowercases hosts and drops the scheme's default port.
fn authority(url: &Url) -> Option<String> {
    let host = url.host_str().filter(|h| !h.is_empty())?;

    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}
