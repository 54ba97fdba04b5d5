use serde::{Deserialize, Serialize};

/// JWT claims shared by the auth handlers and the request middleware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub email: String,
    pub exp: usize,
}

/// Whether a chatroom is open to everyone or bound to two participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomKind {
    Public,
    Private,
}

impl RoomKind {
    /// Rooms without participant rows are public; any participant row makes
    /// a room private. Every reader derives kind through this function.
    pub fn from_participant_count(count: i64) -> Self {
        if count == 0 { Self::Public } else { Self::Private }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_follows_participant_rows() {
        assert_eq!(RoomKind::from_participant_count(0), RoomKind::Public);
        assert_eq!(RoomKind::from_participant_count(2), RoomKind::Private);
        // Anything else is a broken invariant; fail closed.
        assert_eq!(RoomKind::from_participant_count(1), RoomKind::Private);
    }

    #[test]
    fn kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&RoomKind::Private).unwrap(), "\"private\"");
    }
}
