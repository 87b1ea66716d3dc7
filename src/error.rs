use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HawkularError {
    #[error("Invalid query: {0}")]
    Validation(String),

    #[error("Failed to create request: {0}")]
    RequestBuild(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request failed status: {status}")]
    RemoteStatus { status: u16, body: String },

    #[error("Failed to decode hawkular response: {0}")]
    Decode(String),

    #[error("Query cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown data source type: {0}")]
    UnknownDataSource(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for HawkularError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            HawkularError::RequestBuild(err.to_string())
        } else if err.is_decode() {
            HawkularError::Decode(err.to_string())
        } else {
            HawkularError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for HawkularError {
    fn from(err: serde_json::Error) -> Self {
        HawkularError::Decode(err.to_string())
    }
}

impl HawkularError {
    /// Short label used for the failure counter.
    pub fn kind(&self) -> &'static str {
        match self {
            HawkularError::Validation(_) => "validation",
            HawkularError::RequestBuild(_) => "request_build",
            HawkularError::Transport(_) => "transport",
            HawkularError::RemoteStatus { .. } => "remote_status",
            HawkularError::Decode(_) => "decode",
            HawkularError::Cancelled => "cancelled",
            HawkularError::Config(_) => "config",
            HawkularError::UnknownDataSource(_) => "unknown_datasource",
            HawkularError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for HawkularError {
    fn into_response(self) -> Response {
        let status = match self {
            HawkularError::Validation(_) | HawkularError::UnknownDataSource(_) => {
                StatusCode::BAD_REQUEST
            }
            HawkularError::RemoteStatus { .. }
            | HawkularError::Transport(_)
            | HawkularError::Decode(_) => StatusCode::BAD_GATEWAY,
            HawkularError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            HawkularError::RequestBuild(_)
            | HawkularError::Config(_)
            | HawkularError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, HawkularError>;
