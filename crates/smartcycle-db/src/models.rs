/// Database row types. These map directly to SQLite rows and stay
/// independent of the API models in smartcycle-types.

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub location: String,
    pub created_at: String,
    pub last_login: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ListingRow {
    pub id: i64,
    pub owner_email: String,
    pub payload_json: String,
    pub created_at: String,
}

/// A chatroom together with the number of participant rows it has.
/// Kind is derived from `participant_count`, never stored.
#[derive(Debug, Clone)]
pub struct ChatroomRow {
    pub id: i64,
    pub name: String,
    pub created_at: String,
    pub participant_count: i64,
    /// Latest message timestamp, or `created_at` for rooms without messages.
    pub last_activity: String,
}

#[derive(Debug, Clone)]
pub struct MessageRow {
    pub id: i64,
    pub chatroom_id: i64,
    pub sender_email: String,
    pub body: String,
    pub created_at: String,
}

/// A search hit: the message plus the name of the room it lives in.
#[derive(Debug, Clone)]
pub struct MatchRow {
    pub message: MessageRow,
    pub chatroom_name: String,
}
