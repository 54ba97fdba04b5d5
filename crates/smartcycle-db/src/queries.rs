use crate::Database;
use crate::models::{ListingRow, UserRow};
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row, ffi};

impl Database {
    // -- Users --

    /// Insert a user. Returns `None` when the email is already registered.
    pub fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        location: &str,
    ) -> Result<Option<i64>> {
        self.with_conn_mut(|conn| {
            let inserted = conn.execute(
                "INSERT INTO users (name, email, password_hash, location) VALUES (?1, ?2, ?3, ?4)",
                (name, email, password_hash, location),
            );

            match inserted {
                Ok(_) => Ok(Some(conn.last_insert_rowid())),
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE =>
                {
                    Ok(None)
                }
                Err(e) => Err(e.into()),
            }
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_email(conn, email))
    }

    pub fn touch_last_login(&self, email: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE users SET last_login = datetime('now') WHERE email = ?1",
                [email],
            )?;
            Ok(())
        })
    }

    /// Returns false when no user has this email.
    pub fn update_profile(&self, email: &str, name: &str, location: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE users SET name = ?1, location = ?2 WHERE email = ?3",
                (name, location, email),
            )?;
            Ok(changed == 1)
        })
    }

    // -- Listings --

    pub fn insert_listing(&self, owner_email: &str, payload_json: &str) -> Result<ListingRow> {
        self.with_conn_mut(|conn| {
            let row = conn.query_row(
                "INSERT INTO listings (owner_email, payload_json) VALUES (?1, ?2)
                 RETURNING id, owner_email, payload_json, created_at",
                (owner_email, payload_json),
                listing_from_row,
            )?;
            Ok(row)
        })
    }

    /// A single owner's listings, newest first.
    pub fn listings_for_owner(&self, owner_email: &str) -> Result<Vec<ListingRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, owner_email, payload_json, created_at
                 FROM listings
                 WHERE owner_email = ?1
                 ORDER BY id DESC",
            )?;

            let rows = stmt
                .query_map([owner_email], listing_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Listings from every owner, newest first.
    pub fn feed(&self, limit: u32) -> Result<Vec<ListingRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, owner_email, payload_json, created_at
                 FROM listings
                 ORDER BY id DESC
                 LIMIT ?1",
            )?;

            let rows = stmt
                .query_map([limit], listing_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

fn query_user_by_email(conn: &Connection, email: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, email, password_hash, location, created_at, last_login
         FROM users WHERE email = ?1",
    )?;

    let row = stmt
        .query_row([email], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                name: row.get(1)?,
                email: row.get(2)?,
                password_hash: row.get(3)?,
                location: row.get(4)?,
                created_at: row.get(5)?,
                last_login: row.get(6)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn listing_from_row(row: &Row<'_>) -> rusqlite::Result<ListingRow> {
    Ok(ListingRow {
        id: row.get(0)?,
        owner_email: row.get(1)?,
        payload_json: row.get(2)?,
        created_at: row.get(3)?,
    })
}
