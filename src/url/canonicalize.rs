use crate::UrlError;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::borrow::Borrow;
use std::fmt;
use url::Url;

/// Bytes that get percent-encoded during canonicalization
///
/// Everything except the unreserved characters (`A-Z a-z 0-9 - . _ ~`) and
/// the reserved delimiters `: / ? # [ ] @ ! $ & ' ( ) * + , ; =`.
const ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b':')
    .remove(b'/')
    .remove(b'?')
    .remove(b'#')
    .remove(b'[')
    .remove(b']')
    .remove(b'@')
    .remove(b'!')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b';')
    .remove(b'=');

/// An absolute URL in canonical form
///
/// The canonical string is the identity used for visited/frontier
/// membership. Ordering and hashing follow the string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalUrl(String);

impl CanonicalUrl {
    /// Returns the canonical string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the canonical string back into a `Url`
    ///
    /// Canonical strings are produced by `Url` serialization, so this
    /// always succeeds for values built by `canonicalize`.
    pub fn to_url(&self) -> Result<Url, UrlError> {
        Url::parse(&self.0).map_err(|e| UrlError::Malformed(format!("{}: {}", self.0, e)))
    }

    /// Consumes the value and returns the canonical string
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for CanonicalUrl {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CanonicalUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Canonicalizes a raw hyperlink against the page it was found on
///
/// # Canonicalization Steps
///
/// 1. Resolve `raw` against `base` into an absolute URL
/// 2. Reject malformed percent-escapes (`%` not followed by two hex digits)
/// 3. Percent-decode, rejecting byte sequences that are not UTF-8
/// 4. Percent-encode everything outside the unreserved and reserved sets
/// 5. Parse the result as an absolute URL
///
/// Decoding before encoding keeps already-escaped URLs from being escaped
/// twice while still escaping spaces and non-ASCII text.
///
/// # Examples
///
/// ```
/// use sitemapper::url::canonicalize;
/// use url::Url;
///
/// let base = Url::parse("http://example.com/").unwrap();
/// let url = canonicalize("/my page.html", &base).unwrap();
/// assert_eq!(url.as_str(), "http://example.com/my%20page.html");
///
/// let again = canonicalize(url.as_str(), &base).unwrap();
/// assert_eq!(again, url);
/// ```
pub fn canonicalize(raw: &str, base: &Url) -> Result<CanonicalUrl, UrlError> {
    let joined = base
        .join(raw)
        .map_err(|e| UrlError::Malformed(format!("{}: {}", raw, e)))?;

    canonicalize_absolute(joined.as_str())
}

/// Canonicalizes an already-absolute URL such as the crawl seed
///
/// # Examples
///
/// ```
/// use sitemapper::url::canonicalize_seed;
///
/// let seed = canonicalize_seed("http://Example.com").unwrap();
/// assert_eq!(seed.as_str(), "http://example.com/");
/// ```
pub fn canonicalize_seed(raw: &str) -> Result<CanonicalUrl, UrlError> {
    canonicalize_absolute(raw.trim())
}

/// Prepends `http://` to user input that lacks an HTTP(S) scheme
///
/// # Examples
///
/// ```
/// use sitemapper::url::ensure_scheme;
///
/// assert_eq!(ensure_scheme("example.com"), "http://example.com");
/// assert_eq!(ensure_scheme("https://example.com"), "https://example.com");
/// ```
pub fn ensure_scheme(input: &str) -> String {
    let input = input.trim();
    if input.starts_with("http://") || input.starts_with("https://") {
        input.to_string()
    } else {
        format!("http://{}", input)
    }
}

fn canonicalize_absolute(url_str: &str) -> Result<CanonicalUrl, UrlError> {
    validate_escapes(url_str)?;

    let decoded = percent_decode_str(url_str)
        .decode_utf8()
        .map_err(|e| UrlError::Malformed(format!("{}: {}", url_str, e)))?;

    let encoded = utf8_percent_encode(&decoded, ENCODE_SET).to_string();

    let url =
        Url::parse(&encoded).map_err(|e| UrlError::Malformed(format!("{}: {}", url_str, e)))?;

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost(url_str.to_string()));
    }

    Ok(CanonicalUrl(url.into()))
}

/// Checks that every `%` starts a two-digit hex escape
fn validate_escapes(url_str: &str) -> Result<(), UrlError> {
    let bytes = url_str.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes.len() > i + 2
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !valid {
                return Err(UrlError::InvalidEscape(url_str.to_string()));
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    Ok(())
}
