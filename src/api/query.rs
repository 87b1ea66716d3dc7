use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::{
    api::AppState,
    metrics,
    models::{BatchResult, Query, QueryContext, TimeRange},
    Result,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct QueryRequest {
    pub from: String,
    pub to: String,
    pub queries: Vec<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    pub results: BatchResult,
}

pub async fn query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>> {
    info!(
        "Handling query request: {} queries from {} to {}",
        request.queries.len(),
        request.from,
        request.to
    );

    let queries: Vec<Query> = request
        .queries
        .into_iter()
        .map(|model| {
            let ref_id = model
                .get("refId")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            Query::new(ref_id, model)
        })
        .collect();

    let ctx = QueryContext::new(TimeRange::new(request.from, request.to));
    let cancel = state.shutdown.child_token();

    let results = state.executor.execute(&cancel, &queries, &ctx).await?;

    Ok(Json(QueryResponse { results }))
}

pub async fn health(State(state): State<AppState>) -> Result<Json<Value>> {
    let cancel = state.shutdown.child_token();
    let status = state.executor.check_health(&cancel).await?;

    Ok(Json(json!({
        "status": "OK",
        "datasource": state.executor.name(),
        "message": status,
    })))
}

pub async fn prometheus_metrics() -> Result<impl IntoResponse> {
    let body = metrics::render()?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    ))
}
