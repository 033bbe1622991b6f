//! Sitemap XML serialization
//!
//! URLs are sorted and deduplicated before writing, so the same visited set
//! always produces the same bytes regardless of traversal order.

use crate::output::OutputResult;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// XML namespace of the sitemaps.org protocol
pub const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Renders the sitemap document for a set of URLs
pub fn format_sitemap<I, S>(urls: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail
    let _ = write_document(&mut buf, sorted(urls));
    String::from_utf8_lossy(&buf).into_owned()
}

/// Writes the sitemap document to `path`
///
/// Returns the number of `<url>` entries written.
///
/// # Example
///
/// ```no_run
/// use sitemapper::output::write_sitemap;
/// use std::path::Path;
///
/// let count = write_sitemap(["http://example.com/"], Path::new("sitemap.xml")).unwrap();
/// assert_eq!(count, 1);
/// ```
pub fn write_sitemap<I, S>(urls: I, path: &Path) -> OutputResult<usize>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    let count = write_document(&mut writer, sorted(urls))?;
    writer.flush()?;

    tracing::debug!("Wrote {} URLs to {}", count, path.display());
    Ok(count)
}

fn sorted<I, S>(urls: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    urls.into_iter().map(|u| u.as_ref().to_string()).collect()
}

fn write_document<W: Write>(writer: &mut W, urls: BTreeSet<String>) -> std::io::Result<usize> {
    writeln!(writer, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(writer, r#"<urlset xmlns="{}">"#, SITEMAP_NAMESPACE)?;

    for url in &urls {
        writeln!(writer, "  <url>")?;
        writeln!(writer, "    <loc>{}</loc>", escape_xml(url))?;
        writeln!(writer, "  </url>")?;
    }

    writeln!(writer, "</urlset>")?;
    Ok(urls.len())
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputError;
    use tempfile::TempDir;

    #[test]
    fn test_empty_sitemap() {
        let xml = format_sitemap(Vec::<String>::new());
        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n\
             </urlset>\n"
        );
    }

    #[test]
    fn test_urls_sorted_and_deduplicated() {
        let xml = format_sitemap([
            "http://example.com/b.html",
            "http://example.com/",
            "http://example.com/a/",
            "http://example.com/b.html",
        ]);

        let locs: Vec<&str> = xml
            .lines()
            .filter_map(|l| l.trim().strip_prefix("<loc>"))
            .filter_map(|l| l.strip_suffix("</loc>"))
            .collect();

        assert_eq!(
            locs,
            vec![
                "http://example.com/",
                "http://example.com/a/",
                "http://example.com/b.html",
            ]
        );
    }

    #[test]
    fn test_loc_is_escaped() {
        let xml = format_sitemap(["http://example.com/a&b'c.html"]);
        assert!(xml.contains("<loc>http://example.com/a&amp;b&apos;c.html</loc>"));
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a<b>\"c\""), "a&lt;b&gt;&quot;c&quot;");
        assert_eq!(escape_xml("plain"), "plain");
    }

    #[test]
    fn test_write_sitemap() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sitemap.xml");

        let count = write_sitemap(
            ["http://example.com/", "http://example.com/a/"],
            &path,
        )
        .unwrap();
        assert_eq!(count, 2);

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(content.contains(SITEMAP_NAMESPACE));
        assert!(content.contains("<loc>http://example.com/a/</loc>"));
        assert_eq!(content, format_sitemap(["http://example.com/a/", "http://example.com/"]));
    }

    #[test]
    fn test_output_independent_of_input_order() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("first.xml");
        let second = dir.path().join("second.xml");

        write_sitemap(["http://x.com/c", "http://x.com/a", "http://x.com/b"], &first).unwrap();
        write_sitemap(["http://x.com/b", "http://x.com/c", "http://x.com/a"], &second).unwrap();

        assert_eq!(std::fs::read(&first).unwrap(), std::fs::read(&second).unwrap());
    }

    #[test]
    fn test_unwritable_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("sitemap.xml");

        let result = write_sitemap(["http://example.com/"], &path);
        assert!(matches!(result, Err(OutputError::Io(_))));
    }
}
