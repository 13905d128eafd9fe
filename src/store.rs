// 🗄️ Credential Store - SQLite + WAL
// One row per user, one single-row table for the current session pointer.
// Reads and writes are atomic per call; last writer wins (single local user)

use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

use crate::houses::House;

// ============================================================================
// USER RECORD
// ============================================================================

/// Registered user with stable identity (UUID).
/// The password is stored as a salted SHA-256 digest, never as plaintext.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Stable identity - NEVER changes
    pub id: String,

    pub username: String,
    pub email: String,

    /// Per-user random salt (hex)
    #[serde(skip_serializing)]
    pub password_salt: String,

    /// SHA-256(salt + password), hex
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Assigned after classification; absent until the first sorting
    #[serde(skip_serializing_if = "Option::is_none")]
    pub house: Option<House>,

    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// Create a new record with a fresh UUID and salted password hash
    pub fn new(username: &str, email: &str, password: &str) -> Self {
        let salt = generate_salt();
        let hash = hash_password(&salt, password);

        UserRecord {
            id: uuid::Uuid::new_v4().to_string(),
            username: username.to_string(),
            email: email.to_string(),
            password_salt: salt,
            password_hash: hash,
            house: None,
            created_at: Utc::now(),
        }
    }

    /// Constant-shape comparison of a candidate password against the stored digest
    pub fn verify_password(&self, password: &str) -> bool {
        hash_password(&self.password_salt, password) == self.password_hash
    }
}

fn generate_salt() -> String {
    format!("{:032x}", rand::random::<u128>())
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

// ============================================================================
// DATABASE SETUP
// ============================================================================

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            username TEXT UNIQUE NOT NULL,
            email TEXT UNIQUE NOT NULL,
            password_salt TEXT NOT NULL,
            password_hash TEXT NOT NULL,
            house TEXT,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    // Single-row session pointer; absent row = logged out
    conn.execute(
        "CREATE TABLE IF NOT EXISTS session (
            slot INTEGER PRIMARY KEY CHECK (slot = 1),
            user_id TEXT NOT NULL REFERENCES users(id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_users_email ON users(email)",
        [],
    )?;

    Ok(())
}

/// Open (creating if needed) a database file and prepare the schema
pub fn open_database<P: AsRef<Path>>(path: P) -> Result<Connection> {
    let conn = Connection::open(path)?;
    setup_database(&conn)?;
    Ok(conn)
}

// ============================================================================
// USER QUERIES
// ============================================================================

const USER_COLUMNS: &str =
    "id, username, email, password_salt, password_hash, house, created_at";

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRecord> {
    let house_str: Option<String> = row.get(5)?;
    let created_at_str: String = row.get(6)?;

    Ok(UserRecord {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password_salt: row.get(3)?,
        password_hash: row.get(4)?,
        house: house_str.as_deref().and_then(House::parse),
        created_at: DateTime::parse_from_rfc3339(&created_at_str)
            .map_err(|_| rusqlite::Error::InvalidQuery)?
            .with_timezone(&Utc),
    })
}

pub fn insert_user(conn: &Connection, user: &UserRecord) -> Result<()> {
    conn.execute(
        "INSERT INTO users (id, username, email, password_salt, password_hash, house, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            user.id,
            user.username,
            user.email,
            user.password_salt,
            user.password_hash,
            user.house.map(|h| h.as_str()),
            user.created_at.to_rfc3339(),
        ],
    )?;

    Ok(())
}

pub fn find_user_by_email(conn: &Connection, email: &str) -> Result<Option<UserRecord>> {
    let user = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
            params![email],
            row_to_user,
        )
        .optional()?;

    Ok(user)
}

pub fn find_user_by_username(conn: &Connection, username: &str) -> Result<Option<UserRecord>> {
    let user = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
            params![username],
            row_to_user,
        )
        .optional()?;

    Ok(user)
}

pub fn find_user_by_id(conn: &Connection, id: &str) -> Result<Option<UserRecord>> {
    let user = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id],
            row_to_user,
        )
        .optional()?;

    Ok(user)
}

/// Set the house column for an existing user. Returns the number of rows
/// touched (0 when no record has that id)
pub fn update_user_house(conn: &Connection, id: &str, house: House) -> Result<usize> {
    let updated = conn.execute(
        "UPDATE users SET house = ?1 WHERE id = ?2",
        params![house.as_str(), id],
    )?;

    Ok(updated)
}

pub fn count_users(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
    Ok(count)
}

// ============================================================================
// SESSION PERSISTENCE
// ============================================================================

pub fn save_session(conn: &Connection, user_id: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO session (slot, user_id) VALUES (1, ?1)
         ON CONFLICT(slot) DO UPDATE SET user_id = excluded.user_id",
        params![user_id],
    )?;

    Ok(())
}

pub fn clear_session(conn: &Connection) -> Result<()> {
    conn.execute("DELETE FROM session WHERE slot = 1", [])?;
    Ok(())
}

/// Load the persisted session, resolved to its user record.
/// A session pointing at a deleted user is treated as logged out.
pub fn load_session(conn: &Connection) -> Result<Option<UserRecord>> {
    let user_id: Option<String> = conn
        .query_row("SELECT user_id FROM session WHERE slot = 1", [], |row| {
            row.get(0)
        })
        .optional()?;

    match user_id {
        Some(id) => find_user_by_id(conn, &id),
        None => Ok(None),
    }
}

// ============================================================================
// TESTS
// ============================================================================
