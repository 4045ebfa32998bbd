//! Persistence: SQLite user store, video log, per-identity locks

pub mod db;
pub mod locks;

pub use db::{create_pool, get_connection, DbConnection, DbPool, SqliteStore};
pub use locks::UserLocks;
