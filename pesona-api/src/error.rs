use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use pesona_core::CoreError;

/// Boundary error: maps the core taxonomy onto HTTP statuses. 4xx carries
/// the business message; 5xx logs the cause and stays generic.
#[derive(Debug)]
pub struct ApiError(pub CoreError);

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            CoreError::InvalidTransition(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            CoreError::NotFound(_) => (StatusCode::NOT_FOUND, self.0.to_string()),
            CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            CoreError::AccountDisabled => (StatusCode::FORBIDDEN, self.0.to_string()),
            CoreError::NotEligible(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            CoreError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            CoreError::Persistence(msg) => {
                tracing::error!("persistence failure: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}
