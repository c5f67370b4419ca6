//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use folio_core::Error;

/// Wrapper turning domain errors into JSON responses with the right
/// status code. Handlers return `ApiResult<T>` and use `?` freely.
pub struct ApiError(pub Error);

pub type ApiResult<T> = Result<T, ApiError>;

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            Error::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Error::NotFound(what) => (StatusCode::NOT_FOUND, format!("{} not found", what)),
            Error::ManuscriptNotFound(id) => {
                (StatusCode::NOT_FOUND, format!("manuscript {} not found", id))
            }
            Error::PartitionUnavailable { .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, self.0.to_string())
            }
            other => {
                error!(
                    subsystem = "api",
                    error = %other,
                    "Internal error"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
