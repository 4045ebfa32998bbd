//! SQLite-backed user store and video log.
//!
//! One row per user keyed by Telegram id, one append-only row per accepted
//! video. The [`SqliteStore`] wrapper implements the `UserStore`/`VideoLog`
//! seams from the session module; production swaps a durable backend behind
//! the same traits without touching the state machine.

use std::str::FromStr;
use std::sync::Arc;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Result;

use crate::core::error::AppResult;
use crate::session::{NewVideo, PendingAction, Role, User, UserStore, VideoLog};

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Create a new database connection pool
///
/// Initializes a connection pool with up to 10 connections and runs schema
/// migrations on the first connection.
pub fn create_pool(database_path: &str) -> Result<DbPool, r2d2::Error> {
    let manager = SqliteConnectionManager::file(database_path);
    let pool = Pool::builder().max_size(10).build(manager)?;

    let conn = pool.get()?;
    if let Err(e) = migrate_schema(&conn) {
        log::warn!("Failed to migrate schema: {}", e);
    }

    Ok(pool)
}

/// Get a connection from the pool
///
/// The connection is automatically returned to the pool when dropped.
pub fn get_connection(pool: &DbPool) -> Result<DbConnection, r2d2::Error> {
    pool.get()
}

/// Migrate database schema to ensure all required tables and columns exist
fn migrate_schema(conn: &rusqlite::Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS users (
            telegram_id INTEGER PRIMARY KEY,
            display_name TEXT NOT NULL,
            role TEXT NOT NULL,
            registered_at TEXT NOT NULL,
            pending_action TEXT NOT NULL DEFAULT 'none',
            selected_level TEXT,
            subscription_plan TEXT,
            videos_watched INTEGER NOT NULL DEFAULT 0,
            specialization TEXT,
            videos_count INTEGER NOT NULL DEFAULT 0,
            earnings_balance INTEGER NOT NULL DEFAULT 0 CHECK (earnings_balance >= 0),
            withdrawal_account TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS videos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            teacher_id INTEGER NOT NULL,
            media_ref TEXT NOT NULL,
            caption TEXT NOT NULL,
            uploaded_at TEXT NOT NULL
        )",
        [],
    )?;

    // Column backfill for databases created before the field existed
    let mut stmt = conn.prepare("PRAGMA table_info(users)")?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(1))?;

    let mut columns = Vec::new();
    for row in rows {
        columns.push(row?);
    }

    if !columns.contains(&"specialization".to_string()) {
        log::info!("Adding missing column: specialization to users table");
        if let Err(e) = conn.execute("ALTER TABLE users ADD COLUMN specialization TEXT", []) {
            log::warn!("Failed to add specialization column: {}", e);
        }
    }

    if !columns.contains(&"withdrawal_account".to_string()) {
        log::info!("Adding missing column: withdrawal_account to users table");
        if let Err(e) = conn.execute("ALTER TABLE users ADD COLUMN withdrawal_account TEXT", []) {
            log::warn!("Failed to add withdrawal_account column: {}", e);
        }
    }

    Ok(())
}

/// Fetches a user by Telegram id; `Ok(None)` if no record exists.
pub fn get_user(conn: &DbConnection, telegram_id: i64) -> Result<Option<User>> {
    let mut stmt = conn.prepare(
        "SELECT telegram_id, display_name, role, registered_at, pending_action, selected_level, \
         subscription_plan, videos_watched, specialization, videos_count, earnings_balance, \
         withdrawal_account FROM users WHERE telegram_id = ?",
    )?;
    let mut rows = stmt.query([telegram_id])?;

    if let Some(row) = rows.next()? {
        let role_raw: String = row.get(2)?;
        let pending_raw: String = row.get(4)?;

        Ok(Some(User {
            telegram_id: row.get(0)?,
            display_name: row.get(1)?,
            role: Role::from_str(&role_raw).unwrap_or(Role::Student),
            registered_at: row.get(3)?,
            pending_action: PendingAction::from_str(&pending_raw).unwrap_or_default(),
            selected_level: row.get(5)?,
            subscription_plan: row.get(6)?,
            videos_watched: row.get(7)?,
            specialization: row.get(8)?,
            videos_count: row.get(9)?,
            earnings_balance: row.get(10)?,
            withdrawal_account: row.get(11)?,
        }))
    } else {
        Ok(None)
    }
}

/// Writes the whole record, replacing any prior row for the same id.
///
/// Full-record replace, not a partial patch — callers read-modify-write.
pub fn put_user(conn: &DbConnection, user: &User) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO users (telegram_id, display_name, role, registered_at, \
         pending_action, selected_level, subscription_plan, videos_watched, specialization, \
         videos_count, earnings_balance, withdrawal_account) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        rusqlite::params![
            user.telegram_id,
            user.display_name,
            user.role.to_string(),
            user.registered_at,
            user.pending_action.to_string(),
            user.selected_level,
            user.subscription_plan,
            user.videos_watched,
            user.specialization,
            user.videos_count,
            user.earnings_balance,
            user.withdrawal_account,
        ],
    )?;
    Ok(())
}

/// Appends one accepted video. Rows are never updated or deleted.
pub fn insert_video(conn: &DbConnection, video: &NewVideo) -> Result<()> {
    conn.execute(
        "INSERT INTO videos (teacher_id, media_ref, caption, uploaded_at) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![video.teacher_id, video.media_ref, video.caption, video.uploaded_at],
    )?;
    Ok(())
}

/// Number of videos a teacher has uploaded, for the profile view.
pub fn count_videos(conn: &DbConnection, teacher_id: i64) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM videos WHERE teacher_id = ?",
        [teacher_id],
        |row| row.get(0),
    )
}

/// Pool-backed implementation of the session store seams.
#[derive(Clone)]
pub struct SqliteStore {
    pool: Arc<DbPool>,
}

impl SqliteStore {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    /// Published-video count from the append-only log, for the profile view.
    pub fn videos_count(&self, teacher_id: i64) -> AppResult<i64> {
        let conn = get_connection(&self.pool)?;
        Ok(count_videos(&conn, teacher_id)?)
    }
}

impl UserStore for SqliteStore {
    fn get(&self, telegram_id: i64) -> AppResult<Option<User>> {
        let conn = get_connection(&self.pool)?;
        Ok(get_user(&conn, telegram_id)?)
    }

    fn put(&self, user: &User) -> AppResult<()> {
        let conn = get_connection(&self.pool)?;
        Ok(put_user(&conn, user)?)
    }
}

impl VideoLog for SqliteStore {
    fn append(&self, video: &NewVideo) -> AppResult<()> {
        let conn = get_connection(&self.pool)?;
        Ok(insert_video(&conn, video)?)
    }
}
