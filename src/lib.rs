//! Fennec — Telegram bot for the Fennec Academy education marketplace
//!
//! Students browse a static study catalog and subscribe; teachers upload
//! lesson videos, accrue per-video earnings, and withdraw them to a CCP
//! account. The core is the per-user session state machine and the
//! earnings ledger; the Telegram layer renders its outcomes.
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging
//! - `catalog`: immutable education reference data
//! - `session`: state machine and earnings ledger
//! - `storage`: SQLite store, video log, per-identity locks
//! - `telegram`: bot integration, menus, handlers

pub mod catalog;
pub mod cli;
pub mod core;
pub mod session;
pub mod storage;
pub mod telegram;

// Re-export commonly used types for convenience
pub use catalog::Catalog;
pub use crate::core::{config, AppError, AppResult, Policy};
pub use storage::{create_pool, get_connection, DbConnection, DbPool, SqliteStore, UserLocks};
pub use telegram::{handle_menu_callback, schema, HandlerDeps};
