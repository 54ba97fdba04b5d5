use crate::Database;
use crate::models::{ChatroomRow, MatchRow, MessageRow};
use anyhow::Result;
use rusqlite::{OptionalExtension, Row, TransactionBehavior};

/// Room visibility for the viewer bound at `?1`: the room has no
/// participants (public), or the viewer is one of them. Expects the
/// chatrooms table aliased as `c`.
const VISIBLE_TO_VIEWER: &str = "(NOT EXISTS (SELECT 1 FROM chat_participants vp WHERE vp.chatroom_id = c.id)
      OR EXISTS (SELECT 1 FROM chat_participants vp WHERE vp.chatroom_id = c.id AND vp.user_email = ?1))";

const CHATROOM_COLUMNS: &str = "c.id, c.name, c.created_at,
       (SELECT COUNT(*) FROM chat_participants p WHERE p.chatroom_id = c.id),
       COALESCE((SELECT MAX(m.created_at) FROM messages m WHERE m.chatroom_id = c.id), c.created_at)
           AS last_activity";

impl Database {
    // -- Chatrooms --

    pub fn insert_chatroom(&self, name: &str) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute("INSERT INTO chatrooms (name) VALUES (?1)", [name])?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Insert a room only when the table is empty. Returns the new id, if any.
    pub fn insert_chatroom_if_none(&self, name: &str) -> Result<Option<i64>> {
        self.with_conn_mut(|conn| {
            let inserted = conn.execute(
                "INSERT INTO chatrooms (name)
                 SELECT ?1 WHERE NOT EXISTS (SELECT 1 FROM chatrooms)",
                [name],
            )?;
            Ok((inserted == 1).then(|| conn.last_insert_rowid()))
        })
    }

    pub fn get_chatroom(&self, id: i64) -> Result<Option<ChatroomRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {CHATROOM_COLUMNS} FROM chatrooms c WHERE c.id = ?1");
            let row = conn.query_row(&sql, [id], chatroom_from_row).optional()?;
            Ok(row)
        })
    }

    pub fn get_participants(&self, chatroom_id: i64) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT user_email FROM chat_participants
                 WHERE chatroom_id = ?1
                 ORDER BY user_email",
            )?;

            let rows = stmt
                .query_map([chatroom_id], |row| row.get(0))?
                .collect::<std::result::Result<Vec<String>, _>>()?;

            Ok(rows)
        })
    }

    /// Find the room whose participant set is exactly {a, b}, or create it.
    ///
    /// Lookup and insert share one IMMEDIATE transaction so two callers racing
    /// on the same pair cannot both miss and both insert. Returns the room id
    /// and whether it was created by this call.
    pub fn find_or_create_private_room(&self, a: &str, b: &str, name: &str) -> Result<(i64, bool)> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let existing: Option<i64> = tx
                .query_row(
                    "SELECT chatroom_id FROM chat_participants
                     GROUP BY chatroom_id
                     HAVING COUNT(*) = 2
                        AND SUM(user_email = ?1) = 1
                        AND SUM(user_email = ?2) = 1
                     ORDER BY chatroom_id
                     LIMIT 1",
                    (a, b),
                    |row| row.get(0),
                )
                .optional()?;

            if let Some(id) = existing {
                return Ok((id, false));
            }

            tx.execute("INSERT INTO chatrooms (name) VALUES (?1)", [name])?;
            let id = tx.last_insert_rowid();
            tx.execute(
                "INSERT INTO chat_participants (chatroom_id, user_email) VALUES (?1, ?2), (?1, ?3)",
                (id, a, b),
            )?;
            tx.commit()?;

            Ok((id, true))
        })
    }

    /// Public rooms plus private rooms `viewer` belongs to, most recent activity first.
    pub fn visible_chatrooms(&self, viewer: &str) -> Result<Vec<ChatroomRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {CHATROOM_COLUMNS}
                 FROM chatrooms c
                 WHERE {VISIBLE_TO_VIEWER}
                 ORDER BY last_activity DESC, c.id DESC"
            );
            let mut stmt = conn.prepare(&sql)?;

            let rows = stmt
                .query_map([viewer], chatroom_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    // -- Messages --

    pub fn insert_message(&self, chatroom_id: i64, sender_email: &str, body: &str) -> Result<MessageRow> {
        self.with_conn_mut(|conn| {
            let row = conn.query_row(
                "INSERT INTO messages (chatroom_id, sender_email, body) VALUES (?1, ?2, ?3)
                 RETURNING id, chatroom_id, sender_email, body, created_at",
                (chatroom_id, sender_email, body),
                message_from_row,
            )?;
            Ok(row)
        })
    }

    /// All messages of a room in insertion order.
    pub fn get_messages(&self, chatroom_id: i64) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, chatroom_id, sender_email, body, created_at
                 FROM messages
                 WHERE chatroom_id = ?1
                 ORDER BY id ASC",
            )?;

            let rows = stmt
                .query_map([chatroom_id], message_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Messages visible to `viewer` whose sender, body or room name contains
    /// `needle` (literal, ASCII case-insensitive), newest first.
    pub fn search_visible_messages(&self, needle: &str, viewer: &str) -> Result<Vec<MatchRow>> {
        let pattern = like_pattern(needle);

        self.with_conn(|conn| {
            let sql = format!(
                "SELECT m.id, m.chatroom_id, m.sender_email, m.body, m.created_at, c.name
                 FROM messages m
                 JOIN chatrooms c ON c.id = m.chatroom_id
                 WHERE {VISIBLE_TO_VIEWER}
                   AND (m.sender_email LIKE ?2 ESCAPE '\\'
                        OR m.body LIKE ?2 ESCAPE '\\'
                        OR c.name LIKE ?2 ESCAPE '\\')
                 ORDER BY m.id DESC"
            );
            let mut stmt = conn.prepare(&sql)?;

            let rows = stmt
                .query_map((viewer, &pattern), |row| {
                    Ok(MatchRow {
                        message: message_from_row(row)?,
                        chatroom_name: row.get(5)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

/// Wrap `needle` for a substring LIKE match, escaping LIKE metacharacters.
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn chatroom_from_row(row: &Row<'_>) -> rusqlite::Result<ChatroomRow> {
    Ok(ChatroomRow {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: row.get(2)?,
        participant_count: row.get(3)?,
        last_activity: row.get(4)?,
    })
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        chatroom_id: row.get(1)?,
        sender_email: row.get(2)?,
        body: row.get(3)?,
        created_at: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("hi"), "%hi%");
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }

    #[test]
    fn private_room_lookup_ignores_argument_order() {
        let db = Database::open_in_memory().unwrap();

        let (first, created) = db.find_or_create_private_room("a@x.com", "b@x.com", "ab").unwrap();
        assert!(created);

        let (second, created) = db.find_or_create_private_room("b@x.com", "a@x.com", "ba").unwrap();
        assert!(!created);
        assert_eq!(first, second);

        assert_eq!(db.get_participants(first).unwrap(), vec!["a@x.com", "b@x.com"]);
    }

    #[test]
    fn private_room_lookup_requires_exact_pair() {
        let db = Database::open_in_memory().unwrap();

        let (ab, _) = db.find_or_create_private_room("a@x.com", "b@x.com", "ab").unwrap();
        let (ac, created) = db.find_or_create_private_room("a@x.com", "c@x.com", "ac").unwrap();

        assert!(created);
        assert_ne!(ab, ac);
    }

    #[test]
    fn search_treats_wildcards_literally() {
        let db = Database::open_in_memory().unwrap();
        let room = db.insert_chatroom("Deals").unwrap();
        db.insert_message(room, "a@x.com", "100% genuine").unwrap();
        db.insert_message(room, "a@x.com", "1000 genuine").unwrap();

        let hits = db.search_visible_messages("0%", "z@x.com").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].message.body, "100% genuine");
    }

    #[test]
    fn default_room_is_only_inserted_into_an_empty_table() {
        let db = Database::open_in_memory().unwrap();

        assert!(db.insert_chatroom_if_none("General Support").unwrap().is_some());
        assert!(db.insert_chatroom_if_none("General Support").unwrap().is_none());
    }

    #[test]
    fn room_rows_carry_participant_counts() {
        let db = Database::open_in_memory().unwrap();
        let public = db.insert_chatroom("Open").unwrap();
        let (private, _) = db.find_or_create_private_room("a@x.com", "b@x.com", "ab").unwrap();

        assert_eq!(db.get_chatroom(public).unwrap().unwrap().participant_count, 0);
        assert_eq!(db.get_chatroom(private).unwrap().unwrap().participant_count, 2);
        assert!(db.get_chatroom(9999).unwrap().is_none());
    }
}
