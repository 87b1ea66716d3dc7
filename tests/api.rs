mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use common::{closed_url, settings, Reply, StubStore};
use hawkular_datasource::{
    api::{router, AppState},
    ExecutorRegistry,
};

fn app(url: &str) -> Router {
    let executor = ExecutorRegistry::with_defaults()
        .create(&settings(url))
        .unwrap();

    router(AppState {
        executor,
        shutdown: CancellationToken::new(),
    })
}

async fn post_query(app: Router, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::post("/api/tsdb/query")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[test_log::test(tokio::test)]
async fn test_query_endpoint() {
    let store = StubStore::ok(r#"[{"id":"m1","data":[{"timestamp":1000,"value":2.5}]}]"#);
    let url = store.spawn().await;

    let (status, body) = post_query(
        app(&url),
        json!({
            "from": "1000",
            "to": "2000",
            "queries": [{ "refId": "A", "queryBy": "ids", "target": "m1", "type": "gauge" }]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "results": {
                "A": {
                    "refId": "A",
                    "series": [{ "name": "m1", "points": [[2.5, 1000]] }],
                    "meta": { "endpoints": ["gauges/raw/query"] }
                }
            }
        })
    );
}

#[test_log::test(tokio::test)]
async fn test_query_endpoint_maps_remote_failure() {
    let store = StubStore::new(vec![Reply::Json(
        StatusCode::INTERNAL_SERVER_ERROR,
        "boom".to_string(),
    )]);
    let url = store.spawn().await;

    let (status, body) = post_query(
        app(&url),
        json!({ "from": "1000", "to": "2000", "queries": [{ "refId": "A", "target": "m1" }] }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Request failed status: 500");
}

#[test_log::test(tokio::test)]
async fn test_query_endpoint_rejects_invalid_model() {
    let url = closed_url().await;

    let (status, body) = post_query(
        app(&url),
        json!({ "from": "now-1h", "to": "now", "queries": [{ "refId": "A", "queryBy": "regex" }] }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("queryBy"));
}

#[test_log::test(tokio::test)]
async fn test_health_endpoint() {
    let store = StubStore::ok("[]");
    let url = store.spawn().await;

    let response = app(&url)
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["message"], "STARTED");
    assert_eq!(body["datasource"], "hawkular-datasource");
}

#[test_log::test(tokio::test)]
async fn test_metrics_endpoint() {
    let store = StubStore::ok("[]");
    let url = store.spawn().await;

    let (status, _) = post_query(
        app(&url),
        json!({ "from": "1000", "to": "2000", "queries": [{ "refId": "A", "target": "m1" }] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let response = app(&url)
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("hawkular_remote_requests_total"));
}
