//! Integration tests for the harvester
//!
//! These tests use wiremock to serve a small fake catalog and run the full
//! listing → detail → asset cycle end-to-end.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tome_harvest::config::{Config, HttpConfig, ListingFailurePolicy};
use tome_harvest::crawler::{build_http_client, Coordinator, Fetcher, ManualClock, RetryPolicy};
use tome_harvest::output::{write_catalog, RunStatistics};
use tome_harvest::state::BookState;
use tome_harvest::{FetchError, HarvestError};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Listing page linking to the given book ids
fn listing_page(ids: &[u32]) -> String {
    let rows: String = ids
        .iter()
        .map(|id| {
            format!(
                r#"<table class="d_book"><tr><td>
                <div class="bookimage"><a href="/b{id}/"><img src="/shots/{id}.jpg"></a></div>
                </td></tr></table>"#
            )
        })
        .collect();
    format!("<html><body>{}</body></html>", rows)
}

/// Detail page for book `id`, optionally with a text download link
fn detail_page(id: u32, with_text: bool) -> String {
    let text_link = if with_text {
        format!(r#"<a href="/txt/{id}.txt">скачать txt</a>"#)
    } else {
        String::new()
    };
    format!(
        r#"<html><body>
        <h1>Книга {id} :: Автор {id}</h1>
        <div class="bookimage"><a href="/b{id}/"><img src="/shots/{id}.jpg"></a></div>
        <span class="d_book"><b>Жанр книги:</b> <a href="/l55/">Научная фантастика</a></span>
        <table><tr><td>{text_link}</td></tr></table>
        <div class="texts"><b>Reader</b><span class="black">Comment on {id}</span></div>
        </body></html>"#
    )
}

async fn mount_html(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8"))
        .mount(server)
        .await;
}

/// Mounts a detail page plus its cover and (optionally) its text
async fn mount_book(server: &MockServer, id: u32, with_text: bool) {
    mount_html(server, &format!("/b{id}/"), detail_page(id, with_text)).await;

    Mock::given(method("GET"))
        .and(path(format!("/shots/{id}.jpg")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xD8, id as u8]))
        .mount(server)
        .await;

    if with_text {
        Mock::given(method("GET"))
            .and(path(format!("/txt/{id}.txt")))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(format!("Text of book {id}\n")),
            )
            .mount(server)
            .await;
    }
}

/// Two listing pages of three books each:
/// - b3 redirects to the front page (book gone)
/// - b5 has no text link
///
/// `runs` is the number of harvests expected to hit b3; it is never retried.
async fn mount_catalog(server: &MockServer, runs: u64) {
    mount_html(server, "/l55/1/", listing_page(&[1, 2, 3])).await;
    mount_html(server, "/l55/2/", listing_page(&[4, 5, 6])).await;

    for id in [1, 2, 4, 6] {
        mount_book(server, id, true).await;
    }
    mount_book(server, 5, false).await;

    Mock::given(method("GET"))
        .and(path("/b3/"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/"))
        .expect(runs)
        .mount(server)
        .await;
}

fn create_test_config(server: &MockServer, dest: &Path) -> Config {
    let mut config = Config::default();
    config.catalog.category_url = format!("{}/l55/", server.uri());
    config.catalog.start_page = 1;
    config.catalog.end_page = 2;
    config.output.dest_folder = dest.to_path_buf();
    config.http = HttpConfig {
        timeout_secs: 5,
        connect_timeout_secs: 5,
        ..HttpConfig::default()
    };
    config
}

fn book_ids(books: &[tome_harvest::Book]) -> Vec<&str> {
    books.iter().map(|book| book.id.as_str()).collect()
}

#[tokio::test]
async fn test_full_harvest_two_pages() {
    let server = MockServer::start().await;
    mount_catalog(&server, 1).await;
    let dest = TempDir::new().unwrap();

    let coordinator = Coordinator::new(create_test_config(&server, dest.path())).unwrap();
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.candidates, 6);
    assert_eq!(book_ids(&report.books), vec!["1", "2", "4", "5", "6"]);
    assert_eq!(report.complete_count(), 4);
    assert_eq!(report.partial_count(), 1);

    let warnings: Vec<_> = report.log.warnings().collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].state, BookState::NotFound);
    assert!(warnings[0].url.ends_with("/b3/"));

    let partial = &report.books[3];
    assert!(partial.text_url.is_none());
    assert!(partial.book_path.is_none());
    assert!(partial.image_path.is_some());

    let first = &report.books[0];
    assert_eq!(first.title, "Книга 1");
    assert_eq!(first.author, "Автор 1");
    assert_eq!(first.genres, vec!["Научная фантастика"]);
    assert_eq!(first.comments, vec!["Comment on 1"]);

    let text_path = first.book_path.as_ref().unwrap();
    assert_eq!(
        text_path,
        &dest.path().join("books").join("1. Книга 1.txt")
    );
    assert_eq!(
        std::fs::read_to_string(text_path).unwrap(),
        "Text of book 1\n"
    );

    let image_path = first.image_path.as_ref().unwrap();
    assert_eq!(image_path, &dest.path().join("images").join("1.jpg"));
    assert_eq!(std::fs::read(image_path).unwrap(), vec![0xFF, 0xD8, 1]);

    let stats = RunStatistics::from_report(&report);
    assert_eq!(stats.books, 5);
    assert_eq!(stats.warnings.len(), 1);
}

#[tokio::test]
async fn test_catalog_written_after_harvest() {
    let server = MockServer::start().await;
    mount_catalog(&server, 1).await;
    let dest = TempDir::new().unwrap();
    let config = create_test_config(&server, dest.path());
    let catalog_path = config.output.catalog_path();

    let report = Coordinator::new(config).unwrap().run().await.unwrap();
    write_catalog(&report.books, &catalog_path).unwrap();

    let catalog: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&catalog_path).unwrap()).unwrap();
    let entries = catalog.as_array().unwrap();
    assert_eq!(entries.len(), 5);
    assert_eq!(entries[0]["title"], "Книга 1");
    assert!(entries[3]["book_path"].is_null());
    assert!(entries[3]["text_url"].is_null());
}

#[tokio::test]
async fn test_workers_keep_listing_order() {
    let server = MockServer::start().await;
    mount_catalog(&server, 1).await;
    let dest = TempDir::new().unwrap();

    let mut config = create_test_config(&server, dest.path());
    config.catalog.workers = 4;
    let report = Coordinator::new(config).unwrap().run().await.unwrap();

    assert_eq!(book_ids(&report.books), vec!["1", "2", "4", "5", "6"]);
    assert_eq!(report.complete_count(), 4);
    assert_eq!(report.partial_count(), 1);
    assert_eq!(report.warning_count(), 1);
}

#[tokio::test]
async fn test_skip_text_has_no_partial_books() {
    let server = MockServer::start().await;
    mount_catalog(&server, 1).await;
    let dest = TempDir::new().unwrap();

    let mut config = create_test_config(&server, dest.path());
    config.output.skip_text = true;
    let report = Coordinator::new(config).unwrap().run().await.unwrap();

    assert_eq!(report.books.len(), 5);
    assert_eq!(report.complete_count(), 5);
    assert_eq!(report.partial_count(), 0);
    assert!(report.books.iter().all(|book| book.book_path.is_none()));
    assert!(!dest.path().join("books").exists());
}

#[tokio::test]
async fn test_skip_images_leaves_no_image_paths() {
    let server = MockServer::start().await;
    mount_catalog(&server, 1).await;
    let dest = TempDir::new().unwrap();

    let mut config = create_test_config(&server, dest.path());
    config.output.skip_images = true;
    let report = Coordinator::new(config).unwrap().run().await.unwrap();

    assert_eq!(report.books.len(), 5);
    assert!(report.books.iter().all(|book| book.image_path.is_none()));
    assert!(!dest.path().join("images").exists());
}

#[tokio::test]
async fn test_listing_failure_skipped() {
    let server = MockServer::start().await;
    mount_html(&server, "/l55/1/", listing_page(&[1])).await;
    mount_book(&server, 1, true).await;
    Mock::given(method("GET"))
        .and(path("/l55/2/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let dest = TempDir::new().unwrap();

    let report = Coordinator::new(create_test_config(&server, dest.path()))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(book_ids(&report.books), vec!["1"]);
    assert_eq!(report.log.count(BookState::ListingSkipped), 1);
    assert_eq!(report.warning_count(), 1);
}

#[tokio::test]
async fn test_listing_failure_aborts() {
    let server = MockServer::start().await;
    mount_html(&server, "/l55/1/", listing_page(&[1])).await;
    mount_book(&server, 1, true).await;
    Mock::given(method("GET"))
        .and(path("/l55/2/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let dest = TempDir::new().unwrap();

    let mut config = create_test_config(&server, dest.path());
    config.catalog.on_listing_failure = ListingFailurePolicy::Abort;
    let result = Coordinator::new(config).unwrap().run().await;

    match result {
        Err(HarvestError::Listing { page, source }) => {
            assert_eq!(page, 2);
            assert!(matches!(source, FetchError::HttpStatus { status: 404, .. }));
        }
        other => panic!("expected listing abort, got {:?}", other.map(|r| r.books)),
    }
}

#[tokio::test]
async fn test_asset_failure_keeps_book() {
    let server = MockServer::start().await;
    mount_html(&server, "/l55/1/", listing_page(&[7])).await;
    mount_html(&server, "/b7/", detail_page(7, true)).await;
    Mock::given(method("GET"))
        .and(path("/txt/7.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("seven"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/shots/7.jpg"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let dest = TempDir::new().unwrap();

    let mut config = create_test_config(&server, dest.path());
    config.catalog.end_page = 1;
    let report = Coordinator::new(config).unwrap().run().await.unwrap();

    assert_eq!(report.books.len(), 1);
    let book = &report.books[0];
    assert!(book.image_path.is_none());
    assert!(book.book_path.is_some());
    assert_eq!(report.log.count(BookState::AssetFailed), 1);
    assert_eq!(report.complete_count(), 0);
    assert!(!dest.path().join("images").join("7.jpg").exists());
}

#[tokio::test]
async fn test_malformed_page_skipped() {
    let server = MockServer::start().await;
    mount_html(&server, "/l55/1/", listing_page(&[8, 9])).await;
    mount_html(
        &server,
        "/b8/",
        "<html><body><h1>No delimiter here</h1></body></html>".to_string(),
    )
    .await;
    mount_book(&server, 9, true).await;
    let dest = TempDir::new().unwrap();

    let mut config = create_test_config(&server, dest.path());
    config.catalog.end_page = 1;
    let report = Coordinator::new(config).unwrap().run().await.unwrap();

    assert_eq!(book_ids(&report.books), vec!["9"]);
    assert_eq!(report.log.count(BookState::Malformed), 1);
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let server = MockServer::start().await;
    mount_catalog(&server, 2).await;
    let dest = TempDir::new().unwrap();
    let config = create_test_config(&server, dest.path());
    let catalog_path = config.output.catalog_path();
    let coordinator = Coordinator::new(config).unwrap();

    let first = coordinator.run().await.unwrap();
    write_catalog(&first.books, &catalog_path).unwrap();
    let first_catalog = std::fs::read(&catalog_path).unwrap();
    let first_text = std::fs::read(first.books[0].book_path.as_ref().unwrap()).unwrap();

    let second = coordinator.run().await.unwrap();
    write_catalog(&second.books, &catalog_path).unwrap();

    assert_eq!(first.books, second.books);
    assert_eq!(std::fs::read(&catalog_path).unwrap(), first_catalog);
    assert_eq!(
        std::fs::read(second.books[0].book_path.as_ref().unwrap()).unwrap(),
        first_text
    );
}

fn test_fetcher() -> Fetcher {
    let client = build_http_client(&HttpConfig::default()).unwrap();
    Fetcher::new(client, RetryPolicy::default())
}

#[tokio::test]
async fn test_fetch_redirect_is_permanent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/b42/"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/"))
        .expect(1)
        .mount(&server)
        .await;

    let url = Url::parse(&format!("{}/b42/", server.uri())).unwrap();
    let error = test_fetcher().fetch(&url).await.unwrap_err();

    assert!(matches!(error, FetchError::Redirected { ref location, .. } if location == "/"));
    assert!(error.is_not_found());
    assert!(!error.is_transient());
}

#[tokio::test]
async fn test_fetch_error_status_is_permanent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = test_fetcher();
    let missing = Url::parse(&format!("{}/missing", server.uri())).unwrap();
    let broken = Url::parse(&format!("{}/broken", server.uri())).unwrap();

    assert!(matches!(
        fetcher.fetch(&missing).await,
        Err(FetchError::HttpStatus { status: 404, .. })
    ));
    assert!(matches!(
        fetcher.fetch(&broken).await,
        Err(FetchError::HttpStatus { status: 500, .. })
    ));
}

#[tokio::test]
async fn test_fetch_success_returns_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/l55/1/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Привет"))
        .mount(&server)
        .await;

    let url = Url::parse(&format!("{}/l55/1/", server.uri())).unwrap();
    let response = test_fetcher().fetch(&url).await.unwrap();

    assert_eq!(response.status_code, 200);
    assert_eq!(response.final_url, url);
    assert_eq!(response.text(), "Привет");
}

/// How the raw test server answers one connection
#[derive(Clone, Copy)]
enum Reply {
    /// Read the request, then abort the connection with a TCP reset
    Reset,
    /// Announce a longer body than is sent, then close
    Truncated,
    /// Answer 200 with the given body
    Body(&'static str),
}

async fn read_request(stream: &mut TcpStream) {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => request.extend_from_slice(&buf[..n]),
        }
    }
}

/// Serves one connection per reply, in order, and counts the connections
async fn serve_replies(replies: Vec<Reply>) -> (Url, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);

    tokio::spawn(async move {
        for reply in replies {
            let (mut stream, _) = listener.accept().await.unwrap();
            counter.fetch_add(1, Ordering::SeqCst);
            read_request(&mut stream).await;

            match reply {
                Reply::Reset => {
                    #[allow(deprecated)]
                    stream.set_linger(Some(Duration::ZERO)).unwrap();
                    drop(stream);
                }
                Reply::Truncated => {
                    let head = "HTTP/1.1 200 OK\r\nContent-Length: 100\r\nConnection: close\r\n\r\nhel";
                    let _ = stream.write_all(head.as_bytes()).await;
                    let _ = stream.shutdown().await;
                }
                Reply::Body(body) => {
                    let response = format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        body.len(),
                        body
                    );
                    let _ = stream.write_all(response.as_bytes()).await;
                    let _ = stream.shutdown().await;
                }
            }
        }
    });

    let url = Url::parse(&format!("http://{}/b1/", addr)).unwrap();
    (url, hits)
}

fn fetcher_with_clock(clock: &ManualClock) -> Fetcher {
    let client = build_http_client(&HttpConfig::default()).unwrap();
    Fetcher::with_clock(client, RetryPolicy::default(), Arc::new(clock.clone()))
}

#[tokio::test]
async fn test_fetch_retries_reset_and_truncated_transfer() {
    let (url, hits) =
        serve_replies(vec![Reply::Reset, Reply::Truncated, Reply::Body("hello")]).await;
    let clock = ManualClock::new();

    let response = fetcher_with_clock(&clock).fetch(&url).await.unwrap();

    assert_eq!(response.text(), "hello");
    assert_eq!(hits.load(Ordering::SeqCst), 3);
    assert_eq!(clock.sleeps(), vec![Duration::ZERO, Duration::from_secs(5)]);
}

#[tokio::test]
async fn test_fetch_retries_repeated_resets_with_growing_backoff() {
    let (url, hits) = serve_replies(vec![
        Reply::Reset,
        Reply::Reset,
        Reply::Reset,
        Reply::Body("back again"),
    ])
    .await;
    let clock = ManualClock::new();

    let response = fetcher_with_clock(&clock).fetch(&url).await.unwrap();

    assert_eq!(response.text(), "back again");
    assert_eq!(hits.load(Ordering::SeqCst), 4);
    assert_eq!(
        clock.sleeps(),
        vec![
            Duration::ZERO,
            Duration::from_secs(5),
            Duration::from_secs(10)
        ]
    );
}

#[tokio::test]
async fn test_fetch_flags_redirect_followed_by_custom_client() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/b42/"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("front page"))
        .mount(&server)
        .await;

    // reqwest's default client follows redirects on its own
    let fetcher = Fetcher::new(reqwest::Client::new(), RetryPolicy::default());
    let url = Url::parse(&format!("{}/b42/", server.uri())).unwrap();
    let error = fetcher.fetch(&url).await.unwrap_err();

    match error {
        FetchError::Redirected { location, .. } => {
            assert_eq!(location, format!("{}/", server.uri()));
        }
        other => panic!("expected a redirect, got {:?}", other),
    }
}
