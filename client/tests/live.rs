//! Tests against an in-process HTTP server: configuration single-flight,
//! fallback behavior, and the search request/response cycle.

use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use mela_client::{ConfigClient, EventFilters, SearchClient, SearchFilterOptions};

async fn bind() -> (tokio::net::TcpListener, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

fn spawn(listener: tokio::net::TcpListener, router: Router) {
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
}

#[tokio::test]
async fn concurrent_config_fetches_share_one_request() {
    let (listener, addr) = bind().await;
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    let router = Router::new().route(
        "/api/config",
        get(move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Json(json!({"apiBaseUrl": format!("http://{addr}/api"), "version": "1.0.0"}))
            }
        }),
    );
    spawn(listener, router);

    let client = ConfigClient::new(format!("http://{addr}/api"));
    let (a, b) = tokio::join!(client.fetch_config(), client.fetch_config());
    assert_eq!(a.api_base_url, b.api_base_url);
    assert_eq!(hits.load(Ordering::SeqCst), 1, "both callers share one fetch");

    // Cached for the process lifetime: no further requests.
    let _ = client.fetch_config().await;
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    // Explicit invalidation is the only refresh path.
    client.clear().await;
    let _ = client.fetch_config().await;
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn unreachable_config_falls_back_without_failing() {
    let client = ConfigClient::new("http://127.0.0.1:9/api");
    let config = client.fetch_config().await;
    // The fallback keeps the injected origin so later requests stay
    // pointed at the right deployment.
    assert_eq!(config.api_base_url, "http://127.0.0.1:9/api");
    assert!(!config.event_categories.is_empty());
    assert!(client.get_config().await.is_some());
}

#[tokio::test]
async fn unreachable_search_degrades_to_empty_results() {
    let config = Arc::new(ConfigClient::new("http://127.0.0.1:9/api"));
    let search = SearchClient::new(config);

    let filters = EventFilters {
        search: Some("diwali".into()),
        limit: Some(25),
        ..Default::default()
    };

    // Typed channel: the failure is observable...
    assert!(search.search_events(&filters).await.is_err());

    // ...while the degrading variant resolves to the canonical empty page.
    let page = search.search_events_or_empty(&filters).await;
    assert!(page.data.is_empty());
    assert_eq!(page.meta.total, 0);
    assert_eq!(page.meta.page, 1);
    assert_eq!(page.meta.limit, 25);
    assert_eq!(page.meta.total_pages, 0);
}

#[tokio::test]
async fn server_error_also_degrades() {
    let (listener, addr) = bind().await;
    let router = Router::new()
        .route(
            "/api/config",
            get(move || async move {
                Json(json!({"apiBaseUrl": format!("http://{addr}/api")}))
            }),
        )
        .route(
            "/api/events/search",
            post(|| async {
                (
                    axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "Server error"})),
                )
            }),
        );
    spawn(listener, router);

    let search = SearchClient::new(Arc::new(ConfigClient::new(format!("http://{addr}/api"))));
    let page = search.search_events_or_empty(&EventFilters::default()).await;
    assert_eq!(page.meta.total, 0);
    assert_eq!(page.meta.limit, 10);
}

#[tokio::test]
async fn search_round_trip_translates_filters_and_parses_results() {
    let (listener, addr) = bind().await;
    let seen = Arc::new(tokio::sync::Mutex::new(None::<Value>));
    let record = Arc::clone(&seen);
    let router = Router::new()
        .route(
            "/api/config",
            get(move || async move {
                Json(json!({
                    "apiBaseUrl": format!("http://{addr}/api"),
                    "searchFilters": {
                        "fields": ["title", "description"],
                        "sortOptions": ["date", "price"]
                    }
                }))
            }),
        )
        .route(
            "/api/events/search",
            post(move |Json(body): Json<Value>| {
                let record = Arc::clone(&record);
                async move {
                    *record.lock().await = Some(body);
                    Json(json!({
                        "data": [{
                            "id": "8b16e354-62a1-4dbb-8c97-f4bbf1a4a8a6",
                            "title": "Diwali Festival",
                            "description": "Music, food and fireworks.",
                            "location": "Tempodrom, Berlin",
                            "date": "2024-11-01",
                            "startTime": "18:00",
                            "endTime": "23:30",
                            "category": "music",
                            "imageUrl": null,
                            "ticketsAvailable": 200,
                            "price": 12.5,
                            "status": "upcoming",
                            "organizer": {
                                "id": "52a3ef83-1336-4ae3-a0c2-2bf0d1a9a297",
                                "name": "Anjali"
                            },
                            "createdAt": "2024-10-15T10:00:00Z",
                            "updatedAt": "2024-10-15T10:00:00Z"
                        }],
                        "meta": {"total": 15, "page": 1, "limit": 10, "totalPages": 2}
                    }))
                }
            }),
        );
    spawn(listener, router);

    let config = Arc::new(ConfigClient::new(format!("http://{addr}/api")));
    let search = SearchClient::new(Arc::clone(&config));

    // Field/sort enumeration comes from the served configuration.
    let options = search.search_filters().await;
    assert_eq!(options.fields, vec!["title", "description"]);
    assert_eq!(options.sort_options, vec!["date", "price"]);

    let filters = EventFilters {
        search: Some("diwali".into()),
        date_range: Some(mela_client::DateRange {
            start: chrono::NaiveDate::from_ymd_opt(2024, 10, 1),
            end: None,
        }),
        page: Some(1),
        limit: Some(10),
        ..Default::default()
    };
    let page = search.search_events(&filters).await.unwrap();

    // Config resolved before the search fired.
    assert!(config.get_config().await.is_some());

    assert_eq!(page.meta.total, 15);
    assert_eq!(page.meta.total_pages, 2);
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].title, "Diwali Festival");
    assert_eq!(page.data[0].organizer.name, "Anjali");

    // The wire body uses the server's names: search -> query, the date
    // range decomposed, and no client-only keys.
    let body = seen.lock().await.clone().unwrap();
    assert_eq!(body["query"], "diwali");
    assert_eq!(body["startDate"], "2024-10-01");
    assert!(body.get("endDate").is_none());
    assert!(body.get("search").is_none());
    assert!(body.get("dateRange").is_none());
}

#[tokio::test]
async fn missing_filter_section_yields_default_options() {
    let (listener, addr) = bind().await;
    let router = Router::new().route(
        "/api/config",
        get(move || async move {
            Json(json!({"apiBaseUrl": format!("http://{addr}/api")}))
        }),
    );
    spawn(listener, router);

    let search = SearchClient::new(Arc::new(ConfigClient::new(format!("http://{addr}/api"))));
    assert_eq!(search.search_filters().await, SearchFilterOptions::default());
}

#[tokio::test]
async fn structurally_invalid_filter_section_yields_default_options() {
    let (listener, addr) = bind().await;
    let router = Router::new().route(
        "/api/config",
        get(move || async move {
            Json(json!({
                "apiBaseUrl": format!("http://{addr}/api"),
                "searchFilters": {"fields": "title", "sortOptions": 7}
            }))
        }),
    );
    spawn(listener, router);

    let search = SearchClient::new(Arc::new(ConfigClient::new(format!("http://{addr}/api"))));
    assert_eq!(search.search_filters().await, SearchFilterOptions::default());
}
