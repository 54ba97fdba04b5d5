pub mod auth;
pub mod chatrooms;
pub mod convert;
pub mod error;
pub mod listings;
pub mod messages;
pub mod middleware;
pub mod profile;
pub mod repair;

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    response::IntoResponse,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::AppState;
use crate::middleware::require_auth;

pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/users/me", get(profile::get_profile).put(profile::update_profile))
        .route(
            "/listings",
            get(listings::my_listings)
                .post(listings::create_listing)
                .layer(DefaultBodyLimit::max(listings::MAX_LISTING_BODY)),
        )
        .route("/feed", get(listings::feed))
        .route("/chatrooms", get(chatrooms::list_rooms).post(chatrooms::create_room))
        .route("/chatrooms/private", post(chatrooms::open_private_room))
        .route("/chatrooms/{room_id}", get(chatrooms::get_room))
        .route(
            "/chatrooms/{room_id}/messages",
            get(messages::get_messages).post(messages::send_message),
        )
        .route("/messages/search", get(messages::search))
        .route("/repair-shops", get(repair::recommend))
        .layer(axum::middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
