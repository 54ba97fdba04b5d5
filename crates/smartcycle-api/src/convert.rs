//! Row-to-response conversions.

use chrono::{DateTime, NaiveDateTime, Utc};
use smartcycle_chat::Room;
use smartcycle_db::models::{ListingRow, MatchRow, MessageRow};
use smartcycle_types::api::{ListingResponse, MessageResponse, RoomResponse, RoomSummary, SearchHit};
use tracing::warn;

/// SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without timezone; they are UTC.
pub fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc()))
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}': {}", raw, e);
            DateTime::default()
        })
}

pub fn message(row: MessageRow) -> MessageResponse {
    MessageResponse {
        created_at: parse_timestamp(&row.created_at),
        id: row.id,
        chatroom_id: row.chatroom_id,
        sender_email: row.sender_email,
        body: row.body,
    }
}

pub fn search_hit(row: MatchRow) -> SearchHit {
    SearchHit {
        created_at: parse_timestamp(&row.message.created_at),
        message_id: row.message.id,
        chatroom_id: row.message.chatroom_id,
        chatroom_name: row.chatroom_name,
        sender_email: row.message.sender_email,
        body: row.message.body,
    }
}

pub fn room_summary(room: Room) -> RoomSummary {
    RoomSummary {
        id: room.id,
        name: room.name,
        kind: room.kind,
    }
}

pub fn room(room: Room, participants: Vec<String>) -> RoomResponse {
    RoomResponse {
        created_at: parse_timestamp(&room.created_at),
        id: room.id,
        name: room.name,
        kind: room.kind,
        participants,
    }
}

pub fn listing(row: ListingRow) -> ListingResponse {
    let payload = serde_json::from_str(&row.payload_json).unwrap_or_else(|e| {
        warn!("Corrupt payload on listing {}: {}", row.id, e);
        serde_json::Value::Null
    });

    ListingResponse {
        created_at: parse_timestamp(&row.created_at),
        id: row.id,
        owner_email: row.owner_email,
        payload,
    }
}
