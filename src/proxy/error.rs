use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::news::UpstreamError;

/// Failures reported to proxy clients.
///
/// The upstream cause is logged but never sent to the client, which only
/// sees a fixed message.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Failed to load news")]
    Headlines(#[source] UpstreamError),

    #[error("Failed to search news")]
    Search(#[source] UpstreamError),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let cause = match &self {
            ProxyError::Headlines(e) | ProxyError::Search(e) => e.to_string(),
        };
        tracing::error!(error = %self, cause = %cause, "Proxy request failed");

        let payload = Json(json!({ "error": self.to_string() }));
        (StatusCode::INTERNAL_SERVER_ERROR, payload).into_response()
    }
}
