use smartcycle_db::Database;
use smartcycle_db::models::ChatroomRow;
use smartcycle_types::models::RoomKind;
use tracing::{info, warn};

use crate::error::{ChatError, Result};

/// Name of the public room created on first start.
pub const DEFAULT_ROOM_NAME: &str = "General Support";

#[derive(Debug, Clone)]
pub struct Room {
    pub id: i64,
    pub name: String,
    pub kind: RoomKind,
    pub created_at: String,
    pub last_activity: String,
}

impl From<ChatroomRow> for Room {
    fn from(row: ChatroomRow) -> Self {
        if row.participant_count != 0 && row.participant_count != 2 {
            warn!(
                "Chatroom {} has {} participant rows; treating as private",
                row.id, row.participant_count
            );
        }

        Self {
            kind: RoomKind::from_participant_count(row.participant_count),
            id: row.id,
            name: row.name,
            created_at: row.created_at,
            last_activity: row.last_activity,
        }
    }
}

/// Chatroom identity: public room creation, private room deduplication and
/// per-user room listings.
pub struct Directory<'a> {
    db: &'a Database,
}

impl<'a> Directory<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }
}

impl Directory<'_> {
    /// Names need not be unique; every call creates a distinct room.
    pub fn create_public_room(&self, name: &str) -> Result<i64> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ChatError::Validation("room name must not be empty".into()));
        }

        let id = self.db.insert_chatroom(name)?;
        info!("Created public chatroom {} ({})", id, name);
        Ok(id)
    }

    /// Returns the one private room shared by `a` and `b`, creating it on the
    /// first request. Argument order does not matter.
    pub fn get_or_create_private_room(&self, a: &str, b: &str) -> Result<i64> {
        if a.is_empty() || b.is_empty() {
            return Err(ChatError::Validation("participant email must not be empty".into()));
        }
        if a == b {
            return Err(ChatError::Conflict("cannot open a private chat with yourself".into()));
        }

        // The name is cosmetic; identity is the participant set.
        let name = format!("Private: {} ↔ {}", a, b);
        let (id, created) = self.db.find_or_create_private_room(a, b, &name)?;
        if created {
            info!("Created private chatroom {} for {} and {}", id, a, b);
        }
        Ok(id)
    }

    /// Public rooms plus the private rooms `email` participates in,
    /// most recently active first.
    pub fn list_visible_rooms(&self, email: &str) -> Result<Vec<Room>> {
        let rows = self.db.visible_chatrooms(email)?;
        Ok(rows.into_iter().map(Room::from).collect())
    }

    pub fn room(&self, id: i64) -> Result<Room> {
        self.db
            .get_chatroom(id)?
            .map(Room::from)
            .ok_or_else(|| ChatError::NotFound(format!("chatroom {}", id)))
    }

    /// Empty for public rooms.
    pub fn participants(&self, id: i64) -> Result<Vec<String>> {
        Ok(self.db.get_participants(id)?)
    }

    /// Seed the default public room when no chatroom exists yet.
    pub fn ensure_default_room(&self) -> Result<Option<i64>> {
        let id = self.db.insert_chatroom_if_none(DEFAULT_ROOM_NAME)?;
        if let Some(id) = id {
            info!("Seeded default chatroom {} ({})", id, DEFAULT_ROOM_NAME);
        }
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_rooms_allow_duplicate_names() {
        let db = Database::open_in_memory().unwrap();
        let dir = Directory::new(&db);

        let first = dir.create_public_room("Laptop Repair Help").unwrap();
        let second = dir.create_public_room("Laptop Repair Help").unwrap();
        assert_ne!(first, second);

        let room = dir.room(first).unwrap();
        assert_eq!(room.kind, RoomKind::Public);
        assert!(dir.participants(first).unwrap().is_empty());
    }

    #[test]
    fn blank_room_name_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        let dir = Directory::new(&db);

        assert!(matches!(dir.create_public_room("   "), Err(ChatError::Validation(_))));
    }

    #[test]
    fn room_names_are_trimmed() {
        let db = Database::open_in_memory().unwrap();
        let dir = Directory::new(&db);

        let id = dir.create_public_room("  Bikes  ").unwrap();
        assert_eq!(dir.room(id).unwrap().name, "Bikes");
    }

    #[test]
    fn private_room_is_idempotent_and_order_independent() {
        let db = Database::open_in_memory().unwrap();
        let dir = Directory::new(&db);

        let ab = dir.get_or_create_private_room("a@x.com", "b@x.com").unwrap();
        let ba = dir.get_or_create_private_room("b@x.com", "a@x.com").unwrap();
        let again = dir.get_or_create_private_room("a@x.com", "b@x.com").unwrap();

        assert_eq!(ab, ba);
        assert_eq!(ab, again);
        assert_eq!(dir.room(ab).unwrap().kind, RoomKind::Private);
        assert_eq!(dir.participants(ab).unwrap(), vec!["a@x.com", "b@x.com"]);
    }

    #[test]
    fn self_chat_is_a_conflict() {
        let db = Database::open_in_memory().unwrap();
        let dir = Directory::new(&db);

        let err = dir.get_or_create_private_room("a@x.com", "a@x.com").unwrap_err();
        assert!(matches!(err, ChatError::Conflict(_)));
    }

    #[test]
    fn private_room_identity_does_not_depend_on_its_name() {
        let db = Database::open_in_memory().unwrap();
        let dir = Directory::new(&db);

        // A public room that happens to carry the display name of a private one.
        let decoy = dir.create_public_room("Private: a@x.com ↔ b@x.com").unwrap();
        let private = dir.get_or_create_private_room("a@x.com", "b@x.com").unwrap();

        assert_ne!(decoy, private);
        assert_eq!(dir.room(decoy).unwrap().kind, RoomKind::Public);
    }

    #[test]
    fn visible_rooms_include_public_and_own_private_rooms() {
        let db = Database::open_in_memory().unwrap();
        let dir = Directory::new(&db);

        let public = dir.create_public_room("Open").unwrap();
        let ab = dir.get_or_create_private_room("a@x.com", "b@x.com").unwrap();
        let bc = dir.get_or_create_private_room("b@x.com", "c@x.com").unwrap();

        let ids = |email: &str| -> Vec<i64> {
            let mut ids: Vec<i64> = dir.list_visible_rooms(email).unwrap().iter().map(|r| r.id).collect();
            ids.sort();
            ids
        };

        assert_eq!(ids("a@x.com"), vec![public, ab]);
        assert_eq!(ids("b@x.com"), vec![public, ab, bc]);
        assert_eq!(ids("z@x.com"), vec![public]);
    }

    #[test]
    fn visible_rooms_prefer_recent_activity() {
        let db = Database::open_in_memory().unwrap();
        let dir = Directory::new(&db);

        let older = dir.create_public_room("Older").unwrap();
        let newer = dir.create_public_room("Newer").unwrap();

        let order: Vec<i64> = dir.list_visible_rooms("a@x.com").unwrap().iter().map(|r| r.id).collect();
        assert_eq!(order, vec![newer, older]);
    }

    #[test]
    fn missing_room_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        let dir = Directory::new(&db);

        assert!(matches!(dir.room(42), Err(ChatError::NotFound(_))));
    }

    #[test]
    fn default_room_is_seeded_once() {
        let db = Database::open_in_memory().unwrap();
        let dir = Directory::new(&db);

        let seeded = dir.ensure_default_room().unwrap();
        assert!(seeded.is_some());
        assert!(dir.ensure_default_room().unwrap().is_none());

        let rooms = dir.list_visible_rooms("a@x.com").unwrap();
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].name, DEFAULT_ROOM_NAME);
    }
}
