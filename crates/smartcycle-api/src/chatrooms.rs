use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use smartcycle_chat::{AccessGate, Directory};
use smartcycle_types::api::{CreateRoomRequest, PrivateRoomRequest, RoomSummary};
use smartcycle_types::models::Claims;

use crate::auth::AppState;
use crate::convert;
use crate::error::{ApiError, blocking, room_access_error};

/// GET /chatrooms — public rooms plus the caller's private rooms.
pub async fn list_rooms(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let rooms = blocking(&state, move |db| {
        Ok(Directory::new(db).list_visible_rooms(&claims.email)?)
    })
    .await?;

    let rooms: Vec<RoomSummary> = rooms.into_iter().map(convert::room_summary).collect();
    Ok(Json(rooms))
}

/// POST /chatrooms — create a public room.
pub async fn create_room(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
    Json(req): Json<CreateRoomRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let room = blocking(&state, move |db| {
        let dir = Directory::new(db);
        let id = dir.create_public_room(&req.name)?;
        Ok(dir.room(id)?)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(convert::room(room, Vec::new()))))
}

/// POST /chatrooms/private — open (or reopen) the private room with another user.
pub async fn open_private_room(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<PrivateRoomRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let peer = req.email.trim().to_string();
    if peer.is_empty() {
        return Err(ApiError::BadRequest("email is required".into()));
    }

    let (room, participants) = blocking(&state, move |db| {
        if peer != claims.email && db.get_user_by_email(&peer)?.is_none() {
            return Err(ApiError::NotFound(format!("user {}", peer)));
        }

        let dir = Directory::new(db);
        let id = dir.get_or_create_private_room(&claims.email, &peer)?;
        Ok((dir.room(id)?, dir.participants(id)?))
    })
    .await?;

    Ok(Json(convert::room(room, participants)))
}

/// GET /chatrooms/{room_id}
pub async fn get_room(
    State(state): State<AppState>,
    Path(room_id): Path<i64>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let (room, participants) = blocking(&state, move |db| {
        let room = AccessGate::new(db)
            .ensure_access(room_id, &claims.email)
            .map_err(room_access_error)?;
        let participants = Directory::new(db).participants(room.id)?;
        Ok((room, participants))
    })
    .await?;

    Ok(Json(convert::room(room, participants)))
}
