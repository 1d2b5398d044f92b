use axum::{
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson, Response},
};
use db::store::StoreError;
use services::services::database_health::DatabaseHealthError;
use thiserror::Error;
use tracing::error;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    DatabaseHealth(#[from] DatabaseHealthError),
    #[error("{0}")]
    NotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::Store(e) if e.is_network() => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Data store unavailable".to_string(),
            ),
            ApiError::Store(_) | ApiError::DatabaseHealth(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        let body = ApiResponse::<()>::error(&message);
        (status, ResponseJson(body)).into_response()
    }
}
