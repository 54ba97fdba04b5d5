use axum::{Extension, Json, extract::State, response::IntoResponse};

use smartcycle_types::api::{ProfileResponse, UpdateProfileRequest};
use smartcycle_types::models::Claims;

use crate::auth::AppState;
use crate::convert::parse_timestamp;
use crate::error::{ApiError, blocking};

/// GET /users/me
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let user = blocking(&state, move |db| {
        db.get_user_by_email(&claims.email)?
            .ok_or_else(|| ApiError::NotFound(format!("user {}", claims.email)))
    })
    .await?;

    Ok(Json(ProfileResponse {
        id: user.id,
        created_at: parse_timestamp(&user.created_at),
        last_login: user.last_login.as_deref().map(parse_timestamp),
        name: user.name,
        email: user.email,
        location: user.location,
    }))
}

/// PUT /users/me. Email is the account identity and cannot change.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = req.name.trim().to_string();
    let location = req.location.trim().to_string();
    if name.is_empty() || location.is_empty() {
        return Err(ApiError::BadRequest("name and location are required".into()));
    }

    let email = claims.email.clone();
    let updated = blocking(&state, move |db| Ok(db.update_profile(&email, &name, &location)?)).await?;
    if !updated {
        return Err(ApiError::NotFound(format!("user {}", claims.email)));
    }

    get_profile(State(state), Extension(claims)).await
}
