//! `PostgrestStore` against a stand-in PostgREST served from this process.
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use counter_service::{
    error::StoreError,
    store::{CounterStore, PostgrestStore, DEFAULT_PRESS_TABLE},
};
use serde::Deserialize;
use tokio::net::TcpListener;

const SERVICE_ROLE: &str = "service-role-key";

#[derive(Deserialize)]
struct Select {
    select: Option<String>,
}

fn authorized(headers: &HeaderMap) -> bool {
    let bearer = format!("Bearer {SERVICE_ROLE}");
    headers.get("apikey").and_then(|v| v.to_str().ok()) == Some(SERVICE_ROLE)
        && headers.get("authorization").and_then(|v| v.to_str().ok()) == Some(bearer.as_str())
}

fn prefers(headers: &HeaderMap, wanted: &str) -> bool {
    headers
        .get("prefer")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|prefer| prefer.split(',').any(|p| p.trim() == wanted))
}

async fn count_rows(
    State(rows): State<Arc<AtomicU64>>,
    Query(select): Query<Select>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, [("content-range", String::from("*/*"))]);
    }
    if select.select.as_deref() != Some("*") || !prefers(&headers, "count=exact") {
        return (StatusCode::BAD_REQUEST, [("content-range", String::from("*/*"))]);
    }
    let total = rows.load(Ordering::SeqCst);
    let range = if total == 0 {
        "*/0".to_string()
    } else {
        format!("0-{}/{total}", total - 1)
    };
    (StatusCode::OK, [("content-range", range)])
}

async fn insert_row(
    State(rows): State<Arc<AtomicU64>>,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, [("content-range", String::from("*/*"))]);
    }
    if body.trim() != "{}" || !prefers(&headers, "return=minimal") {
        return (StatusCode::BAD_REQUEST, [("content-range", String::from("*/*"))]);
    }
    rows.fetch_add(1, Ordering::SeqCst);
    (StatusCode::CREATED, [("content-range", String::from("*/1"))])
}

/// Serve a fake PostgREST on an ephemeral port, returning its base url and row counter.
async fn fake_postgrest(initial_rows: u64) -> (String, Arc<AtomicU64>) {
    let rows = Arc::new(AtomicU64::new(initial_rows));
    let app = Router::new()
        .route(
            &format!("/rest/v1/{DEFAULT_PRESS_TABLE}"),
            get(count_rows).post(insert_row),
        )
        .with_state(rows.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), rows)
}

fn store(endpoint: &str, key: &str, table: &str) -> PostgrestStore {
    PostgrestStore::new(
        reqwest::Client::new(),
        Some(endpoint.to_string()),
        Some(key.to_string()),
        table.to_string(),
    )
}

#[tokio::test]
async fn counts_and_inserts_through_postgrest() {
    let (endpoint, rows) = fake_postgrest(0).await;
    let store = store(&endpoint, SERVICE_ROLE, DEFAULT_PRESS_TABLE);

    assert_eq!(store.count().await.unwrap(), 0);
    assert_eq!(store.insert_press().await.unwrap(), 1);
    assert_eq!(store.insert_press().await.unwrap(), 1);
    assert_eq!(store.count().await.unwrap(), 2);
    assert_eq!(rows.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn trailing_slash_on_the_endpoint_is_tolerated() {
    let (endpoint, _) = fake_postgrest(25).await;
    let store = store(&format!("{endpoint}/"), SERVICE_ROLE, DEFAULT_PRESS_TABLE);

    assert_eq!(store.count().await.unwrap(), 25);
}

#[tokio::test]
async fn rejected_credentials_surface_the_status() {
    let (endpoint, rows) = fake_postgrest(3).await;
    let store = store(&endpoint, "anon", DEFAULT_PRESS_TABLE);

    assert!(matches!(
        store.count().await,
        Err(StoreError::Status { status: 401, .. })
    ));
    assert!(matches!(
        store.insert_press().await,
        Err(StoreError::Status { status: 401, .. })
    ));
    assert_eq!(rows.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn unknown_table_is_an_error() {
    let (endpoint, _) = fake_postgrest(0).await;
    let store = store(&endpoint, SERVICE_ROLE, "no_such_table");

    assert!(matches!(
        store.count().await,
        Err(StoreError::Status { status: 404, .. })
    ));
}

#[tokio::test]
async fn unreachable_endpoint_is_a_request_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let store = store(&format!("http://{addr}"), SERVICE_ROLE, DEFAULT_PRESS_TABLE);
    assert!(matches!(store.count().await, Err(StoreError::Request(_))));
}
