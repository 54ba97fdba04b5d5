use std::collections::HashMap;

use smartcycle_db::Database;
use smartcycle_db::models::{MatchRow, MessageRow};
use tracing::warn;

use crate::access::AccessGate;
use crate::error::{ChatError, Result};

/// Append-only, per-room ordered message log. Every read and write passes
/// through the access gate.
pub struct MessageLog<'a> {
    db: &'a Database,
    gate: AccessGate<'a>,
}

impl<'a> MessageLog<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self {
            db,
            gate: AccessGate::new(db),
        }
    }
}

impl MessageLog<'_> {
    pub fn send(&self, room_id: i64, sender_email: &str, body: &str) -> Result<MessageRow> {
        if body.trim().is_empty() {
            return Err(ChatError::Validation("message body must not be empty".into()));
        }

        self.gate.ensure_access(room_id, sender_email)?;
        Ok(self.db.insert_message(room_id, sender_email, body)?)
    }

    /// All messages of the room, oldest first.
    pub fn list(&self, room_id: i64, requester_email: &str) -> Result<Vec<MessageRow>> {
        self.gate.ensure_access(room_id, requester_email)?;
        Ok(self.db.get_messages(room_id)?)
    }

    /// Case-insensitive substring search over sender, body and room name,
    /// limited to rooms the requester can access. Newest first. A blank
    /// query matches nothing. Case folding is ASCII-only: "ÉCRAN" does not
    /// match "écran".
    pub fn search(&self, query: &str, requester_email: &str) -> Result<Vec<MatchRow>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let rows = self.db.search_visible_messages(query, requester_email)?;

        // Re-check each distinct room against the gate before returning hits.
        let mut allowed: HashMap<i64, bool> = HashMap::new();
        let mut hits = Vec::with_capacity(rows.len());
        for row in rows {
            let room_id = row.message.chatroom_id;
            let ok = match allowed.get(&room_id).copied() {
                Some(ok) => ok,
                None => {
                    let ok = self.gate.can_access(room_id, requester_email)?;
                    allowed.insert(room_id, ok);
                    ok
                }
            };

            if ok {
                hits.push(row);
            } else {
                warn!(
                    "Search returned message {} from chatroom {} not visible to {}",
                    row.message.id, room_id, requester_email
                );
            }
        }

        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::Directory;

    #[test]
    fn blank_body_is_rejected_and_not_stored() {
        let db = Database::open_in_memory().unwrap();
        let room = Directory::new(&db).create_public_room("Open").unwrap();
        let log = MessageLog::new(&db);

        for body in ["", "   ", "\n\t"] {
            assert!(matches!(log.send(room, "a@x.com", body), Err(ChatError::Validation(_))));
        }
        assert!(log.list(room, "a@x.com").unwrap().is_empty());
    }

    #[test]
    fn outsider_cannot_send_to_private_room() {
        let db = Database::open_in_memory().unwrap();
        let room = Directory::new(&db)
            .get_or_create_private_room("a@x.com", "b@x.com")
            .unwrap();
        let log = MessageLog::new(&db);

        let err = log.send(room, "c@x.com", "let me in").unwrap_err();
        assert!(matches!(err, ChatError::Forbidden));
        assert!(log.list(room, "a@x.com").unwrap().is_empty());
    }

    #[test]
    fn outsider_cannot_read_private_room() {
        let db = Database::open_in_memory().unwrap();
        let room = Directory::new(&db)
            .get_or_create_private_room("a@x.com", "b@x.com")
            .unwrap();
        let log = MessageLog::new(&db);
        log.send(room, "a@x.com", "secret").unwrap();

        assert!(matches!(log.list(room, "c@x.com"), Err(ChatError::Forbidden)));
    }

    #[test]
    fn sending_to_unknown_room_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        let log = MessageLog::new(&db);

        assert!(matches!(log.send(99, "a@x.com", "hello"), Err(ChatError::NotFound(_))));
    }

    #[test]
    fn list_is_in_send_order() {
        let db = Database::open_in_memory().unwrap();
        let room = Directory::new(&db).create_public_room("Open").unwrap();
        let log = MessageLog::new(&db);

        let first = log.send(room, "a@x.com", "one").unwrap();
        let second = log.send(room, "b@x.com", "two").unwrap();
        assert!(second.id > first.id);

        let bodies: Vec<String> = log.list(room, "z@x.com").unwrap().into_iter().map(|m| m.body).collect();
        assert_eq!(bodies, vec!["one", "two"]);
    }

    #[test]
    fn blank_query_returns_nothing() {
        let db = Database::open_in_memory().unwrap();
        let room = Directory::new(&db).create_public_room("Open").unwrap();
        let log = MessageLog::new(&db);
        log.send(room, "a@x.com", "hello").unwrap();

        assert!(log.search("", "a@x.com").unwrap().is_empty());
        assert!(log.search("   ", "a@x.com").unwrap().is_empty());
    }

    #[test]
    fn search_matches_sender_body_and_room_name_case_insensitively() {
        let db = Database::open_in_memory().unwrap();
        let dir = Directory::new(&db);
        let repair = dir.create_public_room("Laptop Repair").unwrap();
        let bikes = dir.create_public_room("Bikes").unwrap();
        let log = MessageLog::new(&db);

        log.send(repair, "seller@shop.com", "screen cracked").unwrap();
        log.send(bikes, "rider@x.com", "Need a LAPTOP too").unwrap();
        log.send(bikes, "rider@x.com", "gears slip").unwrap();

        assert_eq!(log.search("SHOP.com", "z@x.com").unwrap().len(), 1);
        assert_eq!(log.search("gears", "z@x.com").unwrap().len(), 1);

        // Room name "Laptop Repair" and body "Need a LAPTOP too", newest first.
        let hits = log.search("laptop", "z@x.com").unwrap();
        let bodies: Vec<&str> = hits.iter().map(|h| h.message.body.as_str()).collect();
        assert_eq!(bodies, vec!["Need a LAPTOP too", "screen cracked"]);
        assert_eq!(hits[1].chatroom_name, "Laptop Repair");
    }

    #[test]
    fn search_folds_ascii_case_only() {
        let db = Database::open_in_memory().unwrap();
        let room = Directory::new(&db).create_public_room("Phones").unwrap();
        let log = MessageLog::new(&db);
        log.send(room, "a@x.com", "écran cassé, Screen broken").unwrap();

        assert_eq!(log.search("SCREEN", "z@x.com").unwrap().len(), 1);
        assert_eq!(log.search("écran", "z@x.com").unwrap().len(), 1);
        assert!(log.search("ÉCRAN", "z@x.com").unwrap().is_empty());
    }

    #[test]
    fn search_hides_private_rooms_from_outsiders() {
        let db = Database::open_in_memory().unwrap();
        let room = Directory::new(&db)
            .get_or_create_private_room("a@x.com", "b@x.com")
            .unwrap();
        let log = MessageLog::new(&db);
        log.send(room, "a@x.com", "the safe code is 1234").unwrap();

        assert!(log.search("the safe code is 1234", "c@x.com").unwrap().is_empty());
        // Matching on the private room's name or a participant's email leaks nothing either.
        assert!(log.search("Private", "c@x.com").unwrap().is_empty());
        assert!(log.search("a@x.com", "c@x.com").unwrap().is_empty());

        assert_eq!(log.search("1234", "b@x.com").unwrap().len(), 1);
    }
}
