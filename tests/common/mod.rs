#![allow(dead_code)]

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use hawkular_datasource::datasource::DataSourceSettings;

/// A request the stub store received.
#[derive(Debug, Clone)]
pub struct Captured {
    pub path: String,
    pub tenant: Option<String>,
    pub authorization: Option<String>,
    pub body: Value,
}

/// How the stub store answers queries.
#[derive(Clone)]
pub enum Reply {
    Json(StatusCode, String),
    NoContent,
    Hang,
}

#[derive(Clone)]
pub struct StubStore {
    pub captured: Arc<Mutex<Vec<Captured>>>,
    replies: Arc<Mutex<Vec<Reply>>>,
}

impl StubStore {
    /// Replies are served in order; the last one repeats.
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            captured: Arc::new(Mutex::new(Vec::new())),
            replies: Arc::new(Mutex::new(replies)),
        }
    }

    pub fn ok(body: &str) -> Self {
        Self::new(vec![Reply::Json(StatusCode::OK, body.to_string())])
    }

    pub async fn requests(&self) -> Vec<Captured> {
        self.captured.lock().await.clone()
    }

    /// Serves the stub and returns the data source URL pointing at it.
    pub async fn spawn(&self) -> String {
        let app = Router::new()
            .route("/hawkular/metrics/status", get(status))
            .route("/hawkular/metrics/:collection/:kind/query", post(query))
            .with_state(self.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{}/hawkular/metrics", addr)
    }

    async fn next_reply(&self) -> Reply {
        let mut replies = self.replies.lock().await;
        if replies.len() > 1 {
            replies.remove(0)
        } else {
            replies[0].clone()
        }
    }
}

async fn query(
    State(store): State<StubStore>,
    Path((collection, kind)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    store.captured.lock().await.push(Captured {
        path: format!("{}/{}/query", collection, kind),
        tenant: header("hawkular-tenant"),
        authorization: header("authorization"),
        body,
    });

    match store.next_reply().await {
        Reply::Json(status, body) => (status, body).into_response(),
        Reply::NoContent => StatusCode::NO_CONTENT.into_response(),
        Reply::Hang => {
            tokio::time::sleep(Duration::from_secs(30)).await;
            StatusCode::OK.into_response()
        }
    }
}

async fn status() -> impl IntoResponse {
    Json(serde_json::json!({
        "MetricsService": "STARTED",
        "Implementation-Version": "0.21.0.Final"
    }))
}

pub fn settings(url: &str) -> DataSourceSettings {
    DataSourceSettings::new(url, "ops")
}

/// A URL nothing listens on.
pub async fn closed_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/hawkular/metrics", addr)
}
