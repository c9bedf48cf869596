//! Integration tests for the harvester
//!
//! These tests use wiremock to stand in for the art site and run the full
//! gallery -> artwork -> session store cycle end-to-end.

use artsweep::config::{Config, RatingConfig, ScraperConfig, StorageConfig, UserAgentConfig};
use artsweep::crawler::Coordinator;
use artsweep::page::PageError;
use artsweep::storage::{JsonFileStorage, SessionStorage, StorageError};
use artsweep::{SessionStore, SweepError};
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration writing its session store to `session_path`
fn create_test_config(session_path: &Path, ratings: RatingConfig) -> Config {
    Config {
        scraper: ScraperConfig {
            request_interval_ms: 0, // No throttling in tests
            request_timeout_secs: 5,
            connect_timeout_secs: 5,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        storage: StorageConfig {
            session_path: session_path.to_string_lossy().into_owned(),
        },
        ratings,
    }
}

fn everyone_only() -> RatingConfig {
    RatingConfig {
        everyone: true,
        ..RatingConfig::default()
    }
}

/// Host and port of the mock server, as it appears in protocol-relative links
fn server_host(server: &MockServer) -> String {
    server.address().to_string()
}

/// A gallery page whose manifest lists the given artwork paths
fn gallery_html(artist: &str, host: &str, art_paths: &[&str]) -> String {
    let anchors = art_paths
        .iter()
        .map(|p| format!(r#""<a href=\"//{}{}\" class=\"item\">""#, host, p))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"<html><head><title>{artist}</title></head><body>
        <div class="user-header">
            <span class="user-header-name"><a class="user-link" href="/">{artist}</a></span>
        </div>
        <div class="body-center">
            <script>var loaded = true;</script>
            <script>PHP.merge({{"years": {{"2020": [{anchors}]}}, "sort": "date"}});</script>
        </div>
        </body></html>"#,
        artist = artist,
        anchors = anchors
    )
}

/// An artwork page with a rating marker, a primary image, and comment images
fn artwork_html(rating_class: &str, image: &str, comment_images: &[&str]) -> String {
    let comments = comment_images
        .iter()
        .map(|src| format!(r#"<img data-smartload-src="{}">"#, src))
        .collect::<String>();

    format!(
        r#"<html><body>
        <div class="pod-head"><h2 class="{}">Artwork</h2></div>
        <div class="pod-body">
            <div class="image"><a href="{}"><img src="thumb.png"></a></div>
            <div id="author_comments"><p>Details</p>{}</div>
        </div>
        </body></html>"#,
        rating_class, image, comments
    )
}

fn html_response(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html")
}

/// Writes an initial session store and returns its path
fn seed_store(dir: &TempDir, store: &SessionStore) -> std::path::PathBuf {
    let session_path = dir.path().join("scraper_data.json");
    JsonFileStorage::new(&session_path)
        .save(store)
        .expect("Failed to seed store");
    session_path
}

fn load_store(session_path: &Path) -> SessionStore {
    JsonFileStorage::new(session_path)
        .load()
        .expect("Failed to load store")
}

#[tokio::test]
async fn test_full_run_collects_deep_links() {
    let mock_server = MockServer::start().await;
    let host = server_host(&mock_server);
    let gallery_url = format!("{}/alice", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/alice"))
        .respond_with(html_response(gallery_html(
            "Alice",
            &host,
            &["/art/view/1", "/art/view/2"],
        )))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/art/view/1"))
        .respond_with(html_response(artwork_html(
            "rated-e",
            "https://img.example.com/a.png",
            &["https://img.example.com/b.png"],
        )))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/art/view/2"))
        .respond_with(html_response(artwork_html(
            "rated-e",
            "https://img.example.com/c.png",
            &["https://img.example.com/a.png"],
        )))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut initial = SessionStore::new();
    initial.add_pending_url(&gallery_url);
    let session_path = seed_store(&dir, &initial);

    let config = create_test_config(&session_path, everyone_only());
    let mut coordinator = Coordinator::new(&config).expect("Failed to create coordinator");
    let report = coordinator.run().await.expect("Run failed");

    assert_eq!(
        report.messages(),
        vec!["Added Alice to the database.", "Added 3 new images for Alice"]
    );
    assert_eq!(report.galleries_processed, 1);
    assert_eq!(report.images_added, 3);

    let store = load_store(&session_path);
    assert_eq!(store.pending_gallery_urls, vec![gallery_url]);

    let alice = store.artist("Alice").expect("Alice should be stored");
    assert_eq!(
        alice.deep_links.as_slice(),
        [
            "https://img.example.com/a.png",
            "https://img.example.com/b.png",
            "https://img.example.com/c.png",
        ]
    );
    assert_eq!(
        alice.seen_source_links.as_slice(),
        [format!("{}/art/view/1", host), format!("{}/art/view/2", host)]
    );

    // Stored layout: sorted keys with the pending list under artist_urls
    let raw = std::fs::read_to_string(&session_path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert!(json["artist_urls"].is_array());
    assert!(json["Alice"]["to_links"].is_array());
    assert_eq!(json["Alice"]["deep_links"].as_array().unwrap().len(), 3);
    assert!(raw.find("\"Alice\"").unwrap() < raw.find("\"artist_urls\"").unwrap());
}

#[tokio::test]
async fn test_second_run_is_idempotent() {
    let mock_server = MockServer::start().await;
    let host = server_host(&mock_server);
    let gallery_url = format!("{}/alice", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/alice"))
        .respond_with(html_response(gallery_html("Alice", &host, &["/art/view/1"])))
        .expect(2)
        .mount(&mock_server)
        .await;

    // Known artwork pages are not fetched again
    Mock::given(method("GET"))
        .and(path("/art/view/1"))
        .respond_with(html_response(artwork_html(
            "rated-e",
            "https://img.example.com/a.png",
            &[],
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut initial = SessionStore::new();
    initial.add_pending_url(&gallery_url);
    let session_path = seed_store(&dir, &initial);

    let config = create_test_config(&session_path, everyone_only());
    let mut coordinator = Coordinator::new(&config).expect("Failed to create coordinator");

    let first = coordinator.run().await.expect("First run failed");
    assert_eq!(first.images_added, 1);
    let after_first = load_store(&session_path);

    let second = coordinator.run().await.expect("Second run failed");
    assert!(second.messages().is_empty());
    assert_eq!(second.images_added, 0);
    assert_eq!(load_store(&session_path), after_first);
}

#[tokio::test]
async fn test_server_error_keeps_gallery_pending() {
    let mock_server = MockServer::start().await;
    let gallery_url = format!("{}/alice", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/alice"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut initial = SessionStore::new();
    initial.add_pending_url(&gallery_url);
    let session_path = seed_store(&dir, &initial);

    let config = create_test_config(&session_path, everyone_only());
    let report = Coordinator::new(&config)
        .unwrap()
        .run()
        .await
        .expect("Run failed");

    assert_eq!(
        report.messages(),
        vec![format!(
            "Couldn't add {} this time. Will try again later.",
            gallery_url
        )]
    );
    assert_eq!(report.urls_deferred, 1);
    assert_eq!(load_store(&session_path), initial);
}

#[tokio::test]
async fn test_client_error_drops_gallery() {
    let mock_server = MockServer::start().await;
    let gallery_url = format!("{}/gone", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut initial = SessionStore::new();
    initial.add_pending_url(&gallery_url);
    let session_path = seed_store(&dir, &initial);

    let config = create_test_config(&session_path, everyone_only());
    let report = Coordinator::new(&config)
        .unwrap()
        .run()
        .await
        .expect("Run failed");

    assert_eq!(
        report.messages(),
        vec![format!("Couldn't add {}: Invalid URL", gallery_url)]
    );
    assert!(load_store(&session_path).pending_gallery_urls.is_empty());
}

#[tokio::test]
async fn test_page_without_artist_name_is_dropped() {
    let mock_server = MockServer::start().await;
    let gallery_url = format!("{}/search", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(html_response(
            "<html><body><h1>Search results</h1></body></html>".to_string(),
        ))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut initial = SessionStore::new();
    initial.add_pending_url(&gallery_url);
    let session_path = seed_store(&dir, &initial);

    let config = create_test_config(&session_path, everyone_only());
    let report = Coordinator::new(&config)
        .unwrap()
        .run()
        .await
        .expect("Run failed");

    assert_eq!(
        report.messages(),
        vec![format!(
            "Couldn't add {}: Couldn't find any art links (Invalid URL?)",
            gallery_url
        )]
    );
    let store = load_store(&session_path);
    assert!(store.pending_gallery_urls.is_empty());
    assert!(store.artists.is_empty());
}

#[tokio::test]
async fn test_empty_manifest_drops_gallery() {
    let mock_server = MockServer::start().await;
    let host = server_host(&mock_server);
    let gallery_url = format!("{}/newcomer", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/newcomer"))
        .respond_with(html_response(gallery_html("Newcomer", &host, &[])))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut initial = SessionStore::new();
    initial.add_pending_url(&gallery_url);
    let session_path = seed_store(&dir, &initial);

    let config = create_test_config(&session_path, everyone_only());
    let report = Coordinator::new(&config)
        .unwrap()
        .run()
        .await
        .expect("Run failed");

    assert_eq!(report.urls_dropped, 1);
    let store = load_store(&session_path);
    assert!(store.pending_gallery_urls.is_empty());
    assert!(store.artist("Newcomer").is_none());
}

#[tokio::test]
async fn test_disabled_rating_adds_no_images() {
    let mock_server = MockServer::start().await;
    let host = server_host(&mock_server);
    let gallery_url = format!("{}/alice", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/alice"))
        .respond_with(html_response(gallery_html("Alice", &host, &["/art/view/1"])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/art/view/1"))
        .respond_with(html_response(artwork_html(
            "rated-e",
            "https://img.example.com/a.png",
            &[],
        )))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut initial = SessionStore::new();
    initial.add_pending_url(&gallery_url);
    let session_path = seed_store(&dir, &initial);

    let ratings = RatingConfig {
        adult: true,
        ..RatingConfig::default()
    };
    let config = create_test_config(&session_path, ratings);
    let report = Coordinator::new(&config)
        .unwrap()
        .run()
        .await
        .expect("Run failed");

    assert_eq!(report.messages(), vec!["Added Alice to the database."]);
    assert_eq!(report.images_added, 0);

    let store = load_store(&session_path);
    let alice = store.artist("Alice").unwrap();
    assert!(alice.deep_links.is_empty());
    assert!(alice.has_seen(&format!("{}/art/view/1", host)));
    assert_eq!(store.pending_gallery_urls, vec![gallery_url]);
}

#[tokio::test]
async fn test_known_deep_link_is_not_recounted() {
    let mock_server = MockServer::start().await;
    let host = server_host(&mock_server);
    let gallery_url = format!("{}/alice", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/alice"))
        .respond_with(html_response(gallery_html("Alice", &host, &["/art/view/7"])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/art/view/7"))
        .respond_with(html_response(artwork_html("rated-e", "https://img/a.png", &[])))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut initial = SessionStore::new();
    initial.add_pending_url(&gallery_url);
    let (alice, _) = initial.ensure_artist("Alice");
    alice.add_deep_links(["https://img/a.png"]);
    let session_path = seed_store(&dir, &initial);

    let config = create_test_config(&session_path, everyone_only());
    let report = Coordinator::new(&config)
        .unwrap()
        .run()
        .await
        .expect("Run failed");

    assert!(report.messages().is_empty());
    assert_eq!(report.artists_added, 0);

    let store = load_store(&session_path);
    let alice = store.artist("Alice").unwrap();
    assert_eq!(alice.deep_links.as_slice(), ["https://img/a.png"]);
    assert_eq!(alice.seen_source_links.len(), 1);
}

#[tokio::test]
async fn test_artwork_failure_keeps_gallery() {
    let mock_server = MockServer::start().await;
    let host = server_host(&mock_server);
    let gallery_url = format!("{}/alice", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/alice"))
        .respond_with(html_response(gallery_html(
            "Alice",
            &host,
            &["/art/view/1", "/art/view/2"],
        )))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/art/view/1"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/art/view/2"))
        .respond_with(html_response(artwork_html(
            "rated-e",
            "https://img.example.com/two.png",
            &[],
        )))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut initial = SessionStore::new();
    initial.add_pending_url(&gallery_url);
    let session_path = seed_store(&dir, &initial);

    let config = create_test_config(&session_path, everyone_only());
    let report = Coordinator::new(&config)
        .unwrap()
        .run()
        .await
        .expect("Run failed");

    assert_eq!(
        report.messages(),
        vec!["Added Alice to the database.", "Added 1 new images for Alice"]
    );

    let store = load_store(&session_path);
    assert_eq!(store.pending_gallery_urls, vec![gallery_url]);
    assert_eq!(store.artist("Alice").unwrap().seen_source_links.len(), 2);
}

#[tokio::test]
async fn test_mixed_pending_list_keeps_order() {
    let mock_server = MockServer::start().await;
    let host = server_host(&mock_server);
    let busy_url = format!("{}/busy", mock_server.uri());
    let alice_url = format!("{}/alice", mock_server.uri());
    let schemeless = "artist.example.com/gallery".to_string();

    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/alice"))
        .respond_with(html_response(gallery_html("Alice", &host, &["/art/view/1"])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/art/view/1"))
        .respond_with(html_response(artwork_html("rated-e", "https://img/a.png", &[])))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut initial = SessionStore::new();
    initial.add_pending_url(&busy_url);
    initial.add_pending_url(&schemeless);
    initial.add_pending_url(&alice_url);
    let session_path = seed_store(&dir, &initial);

    let config = create_test_config(&session_path, everyone_only());
    let report = Coordinator::new(&config)
        .unwrap()
        .run()
        .await
        .expect("Run failed");

    assert_eq!(
        report.messages(),
        vec![
            format!("Couldn't add {} this time. Will try again later.", busy_url),
            format!("Couldn't add {}: Invalid URL", schemeless),
            "Added Alice to the database.".to_string(),
            "Added 1 new images for Alice".to_string(),
        ]
    );
    assert_eq!(report.galleries_processed, 3);
    assert_eq!(
        load_store(&session_path).pending_gallery_urls,
        vec![busy_url, alice_url]
    );
}

/// A gallery page whose manifest script is given verbatim
fn gallery_with_script(artist: &str, script: &str) -> String {
    format!(
        r#"<html><body>
        <span class="user-header-name"><a class="user-link">{}</a></span>
        <div class="body-center">
            <script>var loaded = true;</script>
            <script>{}</script>
        </div>
        </body></html>"#,
        artist, script
    )
}

/// Serves `body` as the only gallery, runs once, and expects the run to fail
/// without touching the store file
async fn run_expecting_abort(body: String) -> SweepError {
    let mock_server = MockServer::start().await;
    let gallery_url = format!("{}/alice", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/alice"))
        .respond_with(html_response(body))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut initial = SessionStore::new();
    initial.add_pending_url(&gallery_url);
    let session_path = seed_store(&dir, &initial);
    let before = std::fs::read(&session_path).unwrap();

    let config = create_test_config(&session_path, everyone_only());
    let result = Coordinator::new(&config).unwrap().run().await;

    assert_eq!(std::fs::read(&session_path).unwrap(), before);
    match result {
        Ok(report) => panic!("expected the run to abort, got {:?}", report.messages()),
        Err(e) => e,
    }
}

#[tokio::test]
async fn test_malformed_manifest_aborts_without_saving() {
    let error = run_expecting_abort(gallery_with_script(
        "Alice",
        r#"var cfg = {"years": {2020: []}};"#,
    ))
    .await;

    assert!(matches!(
        error,
        SweepError::Page {
            source: PageError::ManifestSyntax(_),
            ..
        }
    ));
}

#[tokio::test]
async fn test_non_anchor_manifest_entry_aborts_without_saving() {
    let error = run_expecting_abort(gallery_with_script(
        "Alice",
        r#"PHP.merge({"years": {"2020": ["<img src=\"//x\">"]}});"#,
    ))
    .await;

    assert!(matches!(
        error,
        SweepError::Page {
            source: PageError::ContractViolation(_),
            ..
        }
    ));
}

#[tokio::test]
async fn test_unquoted_years_key_drops_gallery() {
    let mock_server = MockServer::start().await;
    let gallery_url = format!("{}/alice", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/alice"))
        .respond_with(html_response(gallery_with_script(
            "Alice",
            "var cfg = {years: {2020: []}};",
        )))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut initial = SessionStore::new();
    initial.add_pending_url(&gallery_url);
    let session_path = seed_store(&dir, &initial);

    let config = create_test_config(&session_path, everyone_only());
    let report = Coordinator::new(&config)
        .unwrap()
        .run()
        .await
        .expect("Run failed");

    assert_eq!(
        report.messages(),
        vec![format!(
            "Couldn't add {}: Couldn't find any art links (Invalid URL?)",
            gallery_url
        )]
    );
    assert!(load_store(&session_path).pending_gallery_urls.is_empty());
}

#[tokio::test]
async fn test_years_variable_before_manifest_is_ignored() {
    let mock_server = MockServer::start().await;
    let host = server_host(&mock_server);
    let gallery_url = format!("{}/alice", mock_server.uri());

    let script = format!(
        r#"var years = Object.keys(data); PHP.merge({{"years": {{"2020": ["<a href=\"//{}/art/view/1\" >"]}}}});"#,
        host
    );
    Mock::given(method("GET"))
        .and(path("/alice"))
        .respond_with(html_response(gallery_with_script("Alice", &script)))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/art/view/1"))
        .respond_with(html_response(artwork_html("rated-e", "https://img/a.png", &[])))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut initial = SessionStore::new();
    initial.add_pending_url(&gallery_url);
    let session_path = seed_store(&dir, &initial);

    let config = create_test_config(&session_path, everyone_only());
    let report = Coordinator::new(&config)
        .unwrap()
        .run()
        .await
        .expect("Run failed");

    assert_eq!(
        report.messages(),
        vec!["Added Alice to the database.", "Added 1 new images for Alice"]
    );
}

#[tokio::test]
async fn test_malformed_store_file_aborts_run() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let session_path = dir.path().join("scraper_data.json");
    let corrupt = format!(r#"{{"artist_urls": ["{}/alice"], "Alice": "#, mock_server.uri());
    std::fs::write(&session_path, &corrupt).unwrap();

    let config = create_test_config(&session_path, everyone_only());
    let result = Coordinator::new(&config).unwrap().run().await;

    assert!(matches!(
        result,
        Err(SweepError::Storage(StorageError::Malformed { .. }))
    ));
    assert_eq!(std::fs::read_to_string(&session_path).unwrap(), corrupt);
}

#[tokio::test]
async fn test_missing_store_file_starts_empty() {
    let dir = TempDir::new().unwrap();
    let session_path = dir.path().join("fresh").join("scraper_data.json");

    let config = create_test_config(&session_path, everyone_only());
    let report = Coordinator::new(&config)
        .unwrap()
        .run()
        .await
        .expect("Run failed");

    assert!(report.messages().is_empty());
    assert!(session_path.exists());
    assert_eq!(load_store(&session_path), SessionStore::new());
}
