//! Error types for the HTTP API.
//!
//! [`ApiError`] unifies all failure modes into a single enum that
//! can be converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pulse_db::DbError;
use pulse_providers::ProviderError;
use pulse_risk::RiskError;

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A malformed request parameter.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A well-formed request that cannot be processed.
    #[error("unprocessable: {0}")]
    Unprocessable(String),

    /// The directions service failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The event store failed.
    #[error(transparent)]
    Store(#[from] DbError),

    /// Route selection failed.
    #[error(transparent)]
    Risk(#[from] RiskError),
}

impl ApiError {
    /// HTTP status for this error.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Provider(ProviderError::NoRoutes) | Self::Risk(RiskError::NoCandidates) => {
                StatusCode::NOT_FOUND
            }
            Self::Provider(ProviderError::Config(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Provider(_) => StatusCode::BAD_GATEWAY,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Request failed");
        }

        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses() {
        assert_eq!(ApiError::InvalidRequest(String::new()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Unprocessable(String::new()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(ApiError::from(ProviderError::NoRoutes).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::from(ProviderError::Status("OVER_QUERY_LIMIT".to_owned())).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::from(ProviderError::Config(String::new())).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(DbError::Config(String::new())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
