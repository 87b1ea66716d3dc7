pub mod query;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    config::ServerConfig,
    registry::{Executor, ExecutorRegistry},
    HawkularError, Result,
};

#[derive(Clone)]
pub struct AppState {
    pub executor: Arc<dyn Executor>,
    pub shutdown: CancellationToken,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/tsdb/query", post(query::query))
        .route("/api/health", get(query::health))
        .route("/metrics", get(query::prometheus_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(
    config: ServerConfig,
    registry: &ExecutorRegistry,
    shutdown: CancellationToken,
) -> Result<()> {
    let executor = registry.create(&config.datasource)?;
    info!(
        "Serving data source '{}' ({}) at {}",
        config.datasource.name,
        executor.name(),
        config.datasource.url
    );

    let app = router(AppState {
        executor,
        shutdown: shutdown.clone(),
    });

    let addr = format!("0.0.0.0:{}", config.port);
    info!("Starting query server on {}", addr);

    let listener = TcpListener::bind(&addr).await.map_err(|e|
        HawkularError::Internal(format!("Failed to bind to address: {}", e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| HawkularError::Internal(format!("Server error: {}", e)))?;

    Ok(())
}
