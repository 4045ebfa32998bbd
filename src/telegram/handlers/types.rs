//! Handler types and dependencies

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::Message;

use crate::catalog::Catalog;
use crate::core::config::Policy;
use crate::core::error::AppError;
use crate::storage::db::DbPool;
use crate::storage::{SqliteStore, UserLocks};
use crate::telegram::Bot;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub store: SqliteStore,
    pub catalog: Arc<Catalog>,
    pub policy: Policy,
    pub user_locks: Arc<UserLocks>,
}

impl HandlerDeps {
    /// Create new handler dependencies
    pub fn new(db_pool: Arc<DbPool>, catalog: Arc<Catalog>, policy: Policy) -> Self {
        Self {
            store: SqliteStore::new(db_pool),
            catalog,
            policy,
            user_locks: Arc::new(UserLocks::new()),
        }
    }
}

/// First name for greetings, whoever sent the message.
pub fn display_name(msg: &Message) -> String {
    msg.from
        .as_ref()
        .map(|u| u.first_name.clone())
        .unwrap_or_else(|| "friend".to_string())
}

/// Boundary error recovery: log the failure, reply with the descriptive
/// message for domain errors or a generic one for internal faults, and
/// keep the event loop alive.
pub async fn reply_app_error(bot: &Bot, chat_id: ChatId, e: &AppError) {
    match e {
        AppError::NotRegistered | AppError::RoleMismatch { .. } | AppError::InvalidCallback(_) => {
            log::warn!("Request from {} rejected: {}", chat_id.0, e);
        }
        _ => log::error!("Handler failed for {}: {}", chat_id.0, e),
    }
    let _ = bot.send_message(chat_id, e.user_message()).await;
}
