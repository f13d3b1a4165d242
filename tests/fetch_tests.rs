//! Page fetcher and PokeAPI client tests
//!
//! `fetch_page` runs against an in-memory provider; the HTTP client runs
//! against a wiremock server.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pokecards::api::{
    self, fetch_page, AlreadyInstalled, CatalogProvider, Cursor, FetchError, ItemRef, ListPage,
    PageFetcher, PokeApiClient,
};
use pokecards::pagination::PageRequest;
use pokecards::normalize::FALLBACK_IMAGE;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn record(id: u32, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "height": 7,
        "weight": 69,
        "types": [{ "slot": 1, "type": { "name": "grass" } }],
        "abilities": [{ "ability": { "name": "overgrow" } }],
        "stats": [{ "base_stat": 45, "stat": { "name": "hp" } }],
        "sprites": { "front_default": format!("https://img.example/{id}.png") }
    })
}

#[derive(Default)]
struct MemoryProvider {
    list: Option<Result<ListPage, FetchError>>,
    details: HashMap<String, Result<Value, FetchError>>,
    detail_calls: AtomicUsize,
}

impl MemoryProvider {
    fn with_list(names: &[&str], next: Option<&str>) -> Self {
        let results = names
            .iter()
            .map(|name| ItemRef {
                name: name.to_string(),
                url: format!("mem://{name}"),
            })
            .collect();
        Self {
            list: Some(Ok(ListPage {
                results,
                next: next.map(str::to_string),
            })),
            ..Self::default()
        }
    }

    fn detail(mut self, name: &str, result: Result<Value, FetchError>) -> Self {
        self.details.insert(format!("mem://{name}"), result);
        self
    }
}

#[async_trait]
impl CatalogProvider for MemoryProvider {
    async fn list_page(&self, _limit: usize, _offset: usize) -> Result<ListPage, FetchError> {
        self.list
            .clone()
            .unwrap_or_else(|| Err(FetchError::Transport("no list configured".into())))
    }

    async fn item_detail(&self, reference: &str) -> Result<Value, FetchError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        self.details
            .get(reference)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::NotFound(reference.to_string())))
    }
}

#[tokio::test]
async fn test_page_settles_sorted_with_next_cursor() {
    let provider = MemoryProvider::with_list(&["ivysaur", "bulbasaur"], Some("next-page"))
        .detail("ivysaur", Ok(record(2, "ivysaur")))
        .detail("bulbasaur", Ok(record(1, "bulbasaur")));

    let page = fetch_page(Arc::new(provider), 20, 0, 4).await;

    let ids: Vec<u32> = page.items.iter().map(|item| item.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(page.cursor, Cursor::More("next-page".into()));
    assert_eq!(page.items[0].types, vec!["grass".to_string()]);
}

#[tokio::test]
async fn test_missing_detail_shrinks_page() {
    let provider = MemoryProvider::with_list(&["bulbasaur", "missingno", "ivysaur"], None)
        .detail("bulbasaur", Ok(record(1, "bulbasaur")))
        .detail("ivysaur", Ok(record(2, "ivysaur")));

    let page = fetch_page(Arc::new(provider), 20, 0, 2).await;

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.cursor, Cursor::End);
}

#[tokio::test]
async fn test_malformed_and_failed_details_are_dropped() {
    let provider = MemoryProvider::with_list(&["bulbasaur", "broken", "flaky"], None)
        .detail("bulbasaur", Ok(record(1, "bulbasaur")))
        .detail("broken", Ok(json!({ "id": 0, "name": "broken" })))
        .detail("flaky", Err(FetchError::Status(502)));
    let provider = Arc::new(provider);

    let page = fetch_page(provider.clone(), 20, 0, 8).await;

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].name, "bulbasaur");
    assert_eq!(provider.detail_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_list_failure_yields_failed_cursor() {
    let provider = MemoryProvider {
        list: Some(Err(FetchError::Status(503))),
        ..MemoryProvider::default()
    };
    let provider = Arc::new(provider);

    let page = fetch_page(provider.clone(), 20, 40, 8).await;

    assert!(page.items.is_empty());
    assert_eq!(page.cursor, Cursor::Failed(FetchError::Status(503)));
    assert_eq!(provider.detail_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_client_reads_list_and_details() {
    let server = MockServer::start().await;
    let base = format!("{}/api/v2", server.uri());

    Mock::given(method("GET"))
        .and(path("/api/v2/pokemon"))
        .and(query_param("limit", "2"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1302,
            "next": format!("{base}/pokemon?offset=2&limit=2"),
            "previous": null,
            "results": [
                { "name": "bulbasaur", "url": format!("{base}/pokemon/1/") },
                { "name": "ivysaur", "url": format!("{base}/pokemon/2/") }
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/pokemon/1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(record(1, "bulbasaur")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/pokemon/2/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = PokeApiClient::new(&base, Duration::from_secs(5)).expect("client");
    let page = fetch_page(Arc::new(client), 2, 0, 2).await;

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].name, "bulbasaur");
    assert_eq!(page.items[0].image_ref, "https://img.example/1.png");
    assert!(page.cursor.has_more());
}

#[tokio::test]
async fn test_client_maps_http_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pokemon"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pokemon/pikachu"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = PokeApiClient::new(&server.uri(), Duration::from_secs(5)).expect("client");

    assert_eq!(client.list_page(20, 0).await, Err(FetchError::Status(500)));
    assert!(matches!(
        client.item_detail("Pikachu").await,
        Err(FetchError::MalformedData(_))
    ));
    assert!(matches!(
        client.item_detail("mew").await,
        Err(FetchError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_record_without_artwork_uses_fallback() {
    let mut raw = record(151, "mew");
    raw["sprites"] = json!({ "front_default": null });
    let provider = MemoryProvider::with_list(&["mew"], None).detail("mew", Ok(raw));

    let page = fetch_page(Arc::new(provider), 20, 0, 1).await;

    assert_eq!(page.items[0].image_ref, FALLBACK_IMAGE);
}

#[tokio::test]
async fn test_second_fetcher_install_is_rejected() {
    let first = MemoryProvider::with_list(&["bulbasaur"], None)
        .detail("bulbasaur", Ok(record(1, "bulbasaur")));
    let second = MemoryProvider::with_list(&["mew"], None).detail("mew", Ok(record(151, "mew")));

    assert_eq!(api::install_fetcher(PageFetcher::new(Arc::new(first), 4)), Ok(()));
    assert_eq!(
        api::install_fetcher(PageFetcher::new(Arc::new(second), 4)),
        Err(AlreadyInstalled)
    );

    let fetcher = api::installed_fetcher().expect("installed");
    let page = fetcher
        .fetch(PageRequest { generation: 0, limit: 20, offset: 0 })
        .await;
    assert_eq!(page.items[0].name, "bulbasaur");
}
