use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::RoomKind;

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub location: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user_id: i64,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub location: String,
    pub token: String,
}

// -- Profile --

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub location: String,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub name: String,
    pub location: String,
}

// -- Listings --

#[derive(Debug, Serialize, Deserialize)]
pub struct ListingResponse {
    pub id: i64,
    pub owner_email: String,
    /// Stored verbatim; never inspected by the server.
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

// -- Chatrooms --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateRoomRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrivateRoomRequest {
    /// The other participant.
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RoomSummary {
    pub id: i64,
    pub name: String,
    pub kind: RoomKind,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RoomResponse {
    pub id: i64,
    pub name: String,
    pub kind: RoomKind,
    pub participants: Vec<String>,
    pub created_at: DateTime<Utc>,
}

// -- Messages --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendMessageRequest {
    pub body: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub id: i64,
    pub chatroom_id: i64,
    pub sender_email: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchHit {
    pub message_id: i64,
    pub chatroom_id: i64,
    pub chatroom_name: String,
    pub sender_email: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

// -- Repair shops --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepairShop {
    pub id: u32,
    pub name: String,
    pub distance_km: f64,
    pub rating: f64,
    pub reviews: u32,
    pub eta_days: u32,
    pub repair_cost_estimate: f64,
    pub services: Vec<String>,
}
