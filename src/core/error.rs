use thiserror::Error;

use crate::session::Role;

/// Centralized error types for the application
///
/// All errors in the application are converted to this enum for consistent
/// error handling. Uses `thiserror` for automatic conversion and display
/// formatting. Domain errors (`NotRegistered`, `RoleMismatch`,
/// `InvalidCallback`) are recovered at the handler boundary and turned into
/// a reply to the originating user; none of them abort event processing.
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Database connection pool errors
    #[error("Database pool error: {0}")]
    DatabasePool(#[from] r2d2::Error),

    /// Telegram API errors
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// The command requires a user record that does not exist
    #[error("user is not registered")]
    NotRegistered,

    /// The action requires the other role
    #[error("action requires the {required} role")]
    RoleMismatch { required: Role },

    /// Malformed callback token or argument absent from the catalog
    #[error("invalid callback token: {0}")]
    InvalidCallback(String),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Descriptive reply text for the originating user. Internal faults get
    /// a generic message; the details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            AppError::NotRegistered => "⚠️ You are not registered yet. Use /start to pick your account type.".to_string(),
            AppError::RoleMismatch { required } => match required {
                Role::Teacher => "⚠️ This command is for teachers only!".to_string(),
                Role::Student => "⚠️ This command is for students only!".to_string(),
            },
            AppError::InvalidCallback(_) => "❌ That menu item is no longer valid. Use /start to reopen the menu.".to_string(),
            _ => "❌ Something went wrong on our side. Please try again later.".to_string(),
        }
    }
}
