use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use smartcycle_chat::MessageLog;
use smartcycle_types::api::{MessageResponse, SearchHit, SendMessageRequest};
use smartcycle_types::models::Claims;

use crate::auth::AppState;
use crate::convert;
use crate::error::{ApiError, blocking, room_access_error};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// POST /chatrooms/{room_id}/messages
pub async fn send_message(
    State(state): State<AppState>,
    Path(room_id): Path<i64>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let row = blocking(&state, move |db| {
        MessageLog::new(db)
            .send(room_id, &claims.email, &req.body)
            .map_err(room_access_error)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(convert::message(row))))
}

/// GET /chatrooms/{room_id}/messages — the full history, oldest first.
pub async fn get_messages(
    State(state): State<AppState>,
    Path(room_id): Path<i64>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = blocking(&state, move |db| {
        MessageLog::new(db)
            .list(room_id, &claims.email)
            .map_err(room_access_error)
    })
    .await?;

    let messages: Vec<MessageResponse> = rows.into_iter().map(convert::message).collect();
    Ok(Json(messages))
}

/// GET /messages/search?q=
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = blocking(&state, move |db| {
        Ok(MessageLog::new(db).search(&query.q, &claims.email)?)
    })
    .await?;

    let hits: Vec<SearchHit> = rows.into_iter().map(convert::search_hit).collect();
    Ok(Json(hits))
}
