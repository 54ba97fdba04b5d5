use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use smartcycle_chat::ChatError;
use smartcycle_db::Database;
use thiserror::Error;
use tracing::error;

use crate::auth::AppState;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Invalid credentials")]
    Unauthorized,

    #[error("Access to this chatroom is not allowed")]
    Forbidden,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::Validation(msg) => ApiError::BadRequest(msg),
            ChatError::Forbidden => ApiError::Forbidden,
            ChatError::Conflict(msg) => ApiError::Conflict(msg),
            ChatError::NotFound(what) => ApiError::NotFound(what),
            ChatError::Storage(e) => ApiError::Internal(e.to_string()),
        }
    }
}

/// Errors from reading or writing a specific room. An unknown room id is
/// reported as forbidden so outsiders cannot probe which private rooms exist.
pub fn room_access_error(err: ChatError) -> ApiError {
    match err {
        ChatError::NotFound(_) => ApiError::Forbidden,
        other => other.into(),
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, self.to_string()),
            ApiError::Internal(detail) => {
                error!("{}", detail);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Run blocking database work off the async runtime.
pub async fn blocking<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| ApiError::Internal(format!("spawn_blocking join error: {}", e)))?
}
