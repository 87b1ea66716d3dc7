//! Executor for the Hawkular Metrics REST API.
//!
//! Every query in a batch becomes one `POST <url>/<type>s/raw/query` call;
//! the JSON series that come back are mapped onto [`TimeSeries`].

pub mod query;
pub mod response;

use async_trait::async_trait;
use reqwest::{header, StatusCode, Url};
use serde::Deserialize;
use serde_json::json;
use std::fmt;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{
    datasource::{DataSourceSettings, HAWKULAR_DATASOURCE},
    metrics::{self, RequestTimer},
    models::{BatchResult, Query, QueryContext, QueryResult, TimeSeries},
    registry::Executor,
    HawkularError, Result,
};

pub use query::{HawkularQuery, MetricType, RawQueryRequest, Selection, Tag};
pub use response::parse_series;

pub const TENANT_HEADER: &str = "Hawkular-Tenant";

/// Result key used when a query carries no reference id.
pub const DEFAULT_REF_ID: &str = "A";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct HawkularExecutor {
    base_url: String,
    tenant: String,
    credentials: Option<(String, String)>,
    client: reqwest::Client,
}

impl fmt::Debug for HawkularExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HawkularExecutor")
            .field("base_url", &self.base_url)
            .field("tenant", &self.tenant)
            .field("user", &self.credentials.as_ref().map(|(user, _)| user))
            .finish_non_exhaustive()
    }
}

/// Answer of the store's `status` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreStatus {
    #[serde(rename = "MetricsService")]
    pub metrics_service: String,
    #[serde(rename = "Implementation-Version", default)]
    pub implementation_version: Option<String>,
}

impl HawkularExecutor {
    pub fn new(settings: &DataSourceSettings) -> Result<Self> {
        Self::with_timeout(settings, settings.timeout().unwrap_or(DEFAULT_TIMEOUT))
    }

    pub fn with_timeout(settings: &DataSourceSettings, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HawkularError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: settings.url.clone(),
            tenant: settings.tenant()?.to_string(),
            credentials: settings
                .credentials()
                .map(|(u, p)| (u.to_string(), p.to_string())),
            client,
        })
    }

    /// Runs every query of the batch in order.
    ///
    /// The first failing query aborts the batch; nothing gathered so far is
    /// returned.
    pub async fn execute(
        &self,
        cancel: &CancellationToken,
        queries: &[Query],
        ctx: &QueryContext,
    ) -> Result<BatchResult> {
        metrics::record_batch();
        info!("Executing hawkular batch with {} queries", queries.len());

        let result = self.execute_batch(cancel, queries, ctx).await;
        if let Err(e) = &result {
            metrics::record_failure(e);
            error!("Hawkular batch failed: {}", e);
        }
        result
    }

    async fn execute_batch(
        &self,
        cancel: &CancellationToken,
        queries: &[Query],
        ctx: &QueryContext,
    ) -> Result<BatchResult> {
        let start = ctx.time_range.from_ms_epoch()?;
        let end = ctx.time_range.to_ms_epoch()?;

        let validated = queries
            .iter()
            .map(|query| HawkularQuery::from_model(&resolve_ref_id(query), &query.model))
            .collect::<Result<Vec<_>>>()?;

        let mut results = BatchResult::new();
        for query in &validated {
            let series = self.run_query(cancel, query, start, end).await?;

            let result = results
                .entry(query.ref_id.clone())
                .or_insert_with(|| QueryResult::new(query.ref_id.clone()));
            result.series.extend(series);
            record_endpoint(result, &query.endpoint());
        }

        Ok(results)
    }

    async fn run_query(
        &self,
        cancel: &CancellationToken,
        query: &HawkularQuery,
        start: i64,
        end: i64,
    ) -> Result<Vec<TimeSeries>> {
        let body = query.to_request(start, end);
        let endpoint = query.endpoint();

        debug!(
            ref_id = %query.ref_id,
            time_agg_fn = ?query.time_agg_fn,
            series_agg_fn = ?query.series_agg_fn,
            raw_query = ?query.raw_query,
            "Hawkular query metric"
        );
        debug!(ref_id = %query.ref_id, params = ?body, "Hawkular request");

        let request = self.create_request(&endpoint, &body)?;

        let _timer = RequestTimer::new(&endpoint);
        let (status, bytes) = self.send(cancel, request).await?;

        if !status.is_success() {
            let body = String::from_utf8_lossy(&bytes).into_owned();
            warn!("Request failed status: {} body: {}", status, body);
            return Err(HawkularError::RemoteStatus {
                status: status.as_u16(),
                body,
            });
        }

        response::parse_series(&bytes).map_err(|e| {
            warn!(
                "Failed to unmarshal hawkular response: {} status: {} body: {}",
                e,
                status,
                String::from_utf8_lossy(&bytes)
            );
            e
        })
    }

    /// Queries the store's `status` endpoint.
    pub async fn check_health(&self, cancel: &CancellationToken) -> Result<StoreStatus> {
        let url = self.endpoint_url("status")?;
        let request = self
            .authorize(self.client.get(url))
            .build()
            .map_err(|e| HawkularError::RequestBuild(e.to_string()))?;

        let (status, bytes) = self.send(cancel, request).await?;
        if !status.is_success() {
            return Err(HawkularError::RemoteStatus {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        Ok(serde_json::from_slice(&bytes)?)
    }

    fn create_request(&self, endpoint: &str, body: &RawQueryRequest) -> Result<reqwest::Request> {
        let url = self.endpoint_url(endpoint)?;
        let payload = serde_json::to_vec(body)
            .map_err(|e| HawkularError::RequestBuild(format!("Failed to encode body: {}", e)))?;

        self.authorize(self.client.post(url))
            .header(header::CONTENT_TYPE, "application/json")
            .body(payload)
            .build()
            .map_err(|e| HawkularError::RequestBuild(e.to_string()))
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let builder = builder.header(TENANT_HEADER, &self.tenant);
        match &self.credentials {
            Some((user, password)) => builder.basic_auth(user, Some(password)),
            None => builder,
        }
    }

    /// Appends `path` to the configured URL, keeping any base path.
    fn endpoint_url(&self, path: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| HawkularError::RequestBuild(format!("invalid url '{}': {}", self.base_url, e)))?;

        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                HawkularError::RequestBuild(format!("url '{}' cannot be a base", self.base_url))
            })?;
            segments.pop_if_empty().extend(path.split('/'));
        }

        Ok(url)
    }

    async fn send(
        &self,
        cancel: &CancellationToken,
        request: reqwest::Request,
    ) -> Result<(StatusCode, Vec<u8>)> {
        let call = async move {
            let response = self.client.execute(request).await?;
            let status = response.status();
            let body = response.bytes().await?;
            Ok::<_, HawkularError>((status, body.to_vec()))
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(HawkularError::Cancelled),
            res = call => res,
        }
    }
}

/// Lists the store endpoints a result was read from under `meta.endpoints`.
fn record_endpoint(result: &mut QueryResult, endpoint: &str) {
    let meta = result
        .meta
        .get_or_insert_with(|| json!({ "endpoints": [] }));
    if let Some(endpoints) = meta["endpoints"].as_array_mut() {
        if !endpoints.iter().any(|e| e == endpoint) {
            endpoints.push(json!(endpoint));
        }
    }
}

fn resolve_ref_id(query: &Query) -> String {
    if !query.ref_id.is_empty() {
        return query.ref_id.clone();
    }

    query
        .model
        .get("refId")
        .and_then(|r| r.as_str())
        .filter(|r| !r.is_empty())
        .unwrap_or(DEFAULT_REF_ID)
        .to_string()
}

#[async_trait]
impl Executor for HawkularExecutor {
    fn name(&self) -> &'static str {
        HAWKULAR_DATASOURCE
    }

    async fn execute(
        &self,
        cancel: &CancellationToken,
        queries: &[Query],
        ctx: &QueryContext,
    ) -> Result<BatchResult> {
        HawkularExecutor::execute(self, cancel, queries, ctx).await
    }

    async fn check_health(&self, cancel: &CancellationToken) -> Result<String> {
        let status = HawkularExecutor::check_health(self, cancel).await?;
        Ok(status.metrics_service)
    }
}
