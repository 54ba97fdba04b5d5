use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::info;

use smartcycle_types::api::ListingResponse;
use smartcycle_types::models::Claims;

use crate::auth::AppState;
use crate::convert;
use crate::error::{ApiError, blocking};

const MAX_FEED_LIMIT: u32 = 500;

/// Listing payloads carry the item photo inline, so uploads need more room
/// than axum's 2 MB default.
pub const MAX_LISTING_BODY: usize = 16 * 1024 * 1024;

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    100
}

/// POST /listings — stores the JSON object verbatim under the caller's email.
pub async fn create_listing(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<serde_json::Value>,
) -> Result<impl IntoResponse, ApiError> {
    if !payload.is_object() {
        return Err(ApiError::BadRequest("listing payload must be a JSON object".into()));
    }

    let payload_json = payload.to_string();
    let row = blocking(&state, move |db| Ok(db.insert_listing(&claims.email, &payload_json)?)).await?;
    info!("Listing {} published by {}", row.id, row.owner_email);

    Ok((StatusCode::CREATED, Json(convert::listing(row))))
}

/// GET /listings — the caller's own listings, newest first.
pub async fn my_listings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = blocking(&state, move |db| Ok(db.listings_for_owner(&claims.email)?)).await?;
    let listings: Vec<ListingResponse> = rows.into_iter().map(convert::listing).collect();
    Ok(Json(listings))
}

/// GET /feed — listings from every user, newest first.
pub async fn feed(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = query.limit.min(MAX_FEED_LIMIT);
    let rows = blocking(&state, move |db| Ok(db.feed(limit)?)).await?;
    let listings: Vec<ListingResponse> = rows.into_iter().map(convert::listing).collect();
    Ok(Json(listings))
}
