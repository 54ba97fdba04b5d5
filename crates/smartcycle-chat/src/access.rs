use smartcycle_db::Database;
use smartcycle_types::models::RoomKind;
use tracing::debug;

use crate::directory::{Directory, Room};
use crate::error::{ChatError, Result};

/// Single authority on who may read or write a chatroom.
pub struct AccessGate<'a> {
    directory: Directory<'a>,
}

impl<'a> AccessGate<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self {
            directory: Directory::new(db),
        }
    }
}

impl AccessGate<'_> {
    /// Public rooms admit everyone; private rooms admit their participants.
    /// Fails with `NotFound` for an unknown room.
    pub fn can_access(&self, room_id: i64, email: &str) -> Result<bool> {
        let room = self.directory.room(room_id)?;
        self.allows(&room, email)
    }

    /// Like `can_access`, but turns a denial into `Forbidden` and hands back
    /// the room on success.
    pub fn ensure_access(&self, room_id: i64, email: &str) -> Result<Room> {
        let room = self.directory.room(room_id)?;
        if !self.allows(&room, email)? {
            debug!("Denied {} access to chatroom {}", email, room_id);
            return Err(ChatError::Forbidden);
        }
        Ok(room)
    }

    fn allows(&self, room: &Room, email: &str) -> Result<bool> {
        match room.kind {
            RoomKind::Public => Ok(true),
            RoomKind::Private => {
                let participants = self.directory.participants(room.id)?;
                Ok(participants.iter().any(|p| p == email))
            }
        }
    }
}
