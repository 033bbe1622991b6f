//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end, from seed to sitemap file.

use sitemapper::config::Config;
use sitemapper::crawler::run_crawl;
use sitemapper::output::{write_sitemap, CrawlStatistics};
use sitemapper::state::PageState;
use sitemapper::url::canonicalize_seed;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with a short timeout
fn create_test_config(workers: u32) -> Config {
    let mut config = Config::default();
    config.crawler.workers = workers;
    config.crawler.request_timeout_secs = 2;
    config
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/html; charset=utf-8")
}

/// Mounts a GET handler that must be hit exactly once
async fn mount_page(server: &MockServer, page: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

/// The example site: `/` links to `/about/`, `/blog.html`, an offsite page
/// and a PHP page; `/about/` links back to `/`.
async fn mount_example_site(server: &MockServer) {
    mount_page(
        server,
        "/",
        html(
            r#"<html><body>
            <a href="/about/">About</a>
            <a href="/blog.html">Blog</a>
            <a href="http://other.com/x">Elsewhere</a>
            <a href="/contact.php">Contact</a>
            </body></html>"#,
        ),
    )
    .await;

    mount_page(server, "/about/", html(r#"<a href="/">Home</a>"#)).await;
    mount_page(server, "/blog.html", html("<p>No links here</p>")).await;
}

#[tokio::test]
async fn test_full_crawl_single_domain() {
    let server = MockServer::start().await;
    mount_example_site(&server).await;

    let seed = canonicalize_seed(&server.uri()).unwrap();
    let result = run_crawl(seed, &create_test_config(1)).await.unwrap();

    let base = server.uri();
    let visited: Vec<&str> = result.visited().map(|u| u.as_str()).collect();
    assert_eq!(
        visited,
        vec![
            format!("{}/", base),
            format!("{}/about/", base),
            format!("{}/blog.html", base),
        ]
    );

    assert!(result
        .pages()
        .values()
        .all(|state| *state == PageState::Processed));
}

#[tokio::test]
async fn test_concurrent_crawl_matches_sequential() {
    let server = MockServer::start().await;
    mount_example_site(&server).await;

    let seed = canonicalize_seed(&server.uri()).unwrap();
    let result = run_crawl(seed, &create_test_config(8)).await.unwrap();

    assert_eq!(result.len(), 3);
    assert_eq!(result.domain().as_str(), server.address().to_string());
}

#[tokio::test]
async fn test_server_error_page_in_sitemap() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        html(r#"<a href="/broken.html">Broken</a> <a href="/ok.html">Ok</a>"#),
    )
    .await;
    mount_page(&server, "/broken.html", ResponseTemplate::new(500)).await;
    mount_page(&server, "/ok.html", html("fine")).await;

    let seed = canonicalize_seed(&server.uri()).unwrap();
    let result = run_crawl(seed, &create_test_config(2)).await.unwrap();

    let broken = format!("{}/broken.html", server.uri());
    assert_eq!(result.state_of(&broken), Some(PageState::HttpError));

    let included: Vec<&str> = result
        .sitemap_urls(true)
        .into_iter()
        .map(|u| u.as_str())
        .collect();
    assert!(included.contains(&broken.as_str()));

    let excluded: Vec<&str> = result
        .sitemap_urls(false)
        .into_iter()
        .map(|u| u.as_str())
        .collect();
    assert!(!excluded.contains(&broken.as_str()));
    assert_eq!(excluded.len(), 2);
}

#[tokio::test]
async fn test_dead_link_and_non_html() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        html(r#"<a href="/gone.html">Gone</a> <a href="/data/">Data</a>"#),
    )
    .await;
    mount_page(&server, "/gone.html", ResponseTemplate::new(404)).await;
    mount_page(
        &server,
        "/data/",
        ResponseTemplate::new(200)
            .set_body_raw(br#"{"href": "/hidden.html"}"#.to_vec(), "application/json"),
    )
    .await;

    let seed = canonicalize_seed(&server.uri()).unwrap();
    let result = run_crawl(seed, &create_test_config(1)).await.unwrap();

    let base = server.uri();
    assert_eq!(
        result.state_of(&format!("{}/gone.html", base)),
        Some(PageState::DeadLink)
    );
    assert_eq!(
        result.state_of(&format!("{}/data/", base)),
        Some(PageState::ContentMismatch)
    );
    assert_eq!(result.len(), 3);

    let stats = CrawlStatistics::from_result(&result);
    assert_eq!(stats.total_pages, 3);
    assert_eq!(stats.count(PageState::Processed), 1);
    assert_eq!(stats.error_summary.len(), 2);
}

#[tokio::test]
async fn test_malformed_link_does_not_abort_page() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        html(&format!(
            r#"<a href="{}/%zz">Bad</a> <a href="/good.html">Good</a>"#,
            server.uri()
        )),
    )
    .await;
    mount_page(&server, "/good.html", html("ok")).await;

    let seed = canonicalize_seed(&server.uri()).unwrap();
    let result = run_crawl(seed, &create_test_config(1)).await.unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(
        result.state_of(&format!("{}/good.html", server.uri())),
        Some(PageState::Processed)
    );
}

#[tokio::test]
async fn test_redirect_links_resolved_against_final_url() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        ResponseTemplate::new(301).insert_header("location", "/landing/"),
    )
    .await;
    mount_page(&server, "/landing/", html(r#"<a href="next.html">Next</a>"#)).await;
    mount_page(&server, "/next.html", html("end")).await;

    let seed = canonicalize_seed(&server.uri()).unwrap();
    let result = run_crawl(seed, &create_test_config(1)).await.unwrap();

    let base = server.uri();
    assert_eq!(result.state_of(&format!("{}/", base)), Some(PageState::Processed));
    assert_eq!(
        result.state_of(&format!("{}/next.html", base)),
        Some(PageState::Processed)
    );
    assert!(result.state_of(&format!("{}/landing/", base)).is_none());
}

#[tokio::test]
async fn test_slow_page_times_out() {
    let server = MockServer::start().await;

    mount_page(&server, "/", html(r#"<a href="/slow.html">Slow</a>"#)).await;
    Mock::given(method("GET"))
        .and(path("/slow.html"))
        .respond_with(html("late").set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let mut config = create_test_config(1);
    config.crawler.request_timeout_secs = 1;

    let seed = canonicalize_seed(&server.uri()).unwrap();
    let result = run_crawl(seed, &config).await.unwrap();

    assert_eq!(
        result.state_of(&format!("{}/slow.html", server.uri())),
        Some(PageState::TimedOut)
    );
}

#[tokio::test]
async fn test_sitemap_is_byte_identical_across_runs() {
    let server = MockServer::start().await;

    for (page, body) in [
        ("/", r#"<a href="/b.html">B</a> <a href="/a/">A</a>"#),
        ("/a/", r#"<a href="/c.html">C</a> <a href="/b.html">B</a>"#),
        ("/b.html", r#"<a href="/a/">A</a>"#),
        ("/c.html", r#"<a href="/">Home</a>"#),
    ] {
        Mock::given(method("GET"))
            .and(path(page))
            .respond_with(html(body))
            .expect(2)
            .mount(&server)
            .await;
    }

    let dir = TempDir::new().unwrap();
    let first = dir.path().join("first.xml");
    let second = dir.path().join("second.xml");

    let seed = canonicalize_seed(&server.uri()).unwrap();
    let run1 = run_crawl(seed.clone(), &create_test_config(1)).await.unwrap();
    let run2 = run_crawl(seed, &create_test_config(4)).await.unwrap();

    assert_eq!(write_sitemap(run1.sitemap_urls(true), &first).unwrap(), 4);
    assert_eq!(write_sitemap(run2.sitemap_urls(true), &second).unwrap(), 4);

    let content = std::fs::read(&first).unwrap();
    assert_eq!(content, std::fs::read(&second).unwrap());

    let text = String::from_utf8(content).unwrap();
    assert!(text.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
    assert!(text.contains(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#));
    assert!(text.contains(&format!("<loc>{}/c.html</loc>", server.uri())));
}

#[tokio::test]
async fn test_unreachable_seed_recorded() {
    // Bind then drop a listener so its port refuses connections
    let uri = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        format!("http://{}", listener.local_addr().unwrap())
    };

    let seed = canonicalize_seed(&uri).unwrap();
    let result = run_crawl(seed, &create_test_config(1)).await.unwrap();

    assert_eq!(result.len(), 1);
    let state = result.pages().values().next().copied().unwrap();
    assert_eq!(state, PageState::Unreachable);
}
