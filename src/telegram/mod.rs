//! Telegram bot integration and handlers

pub mod bot;
pub mod handlers;
pub mod menu;
pub mod text;

/// The bot type used across handlers
pub type Bot = teloxide::Bot;

// Re-exports for convenience
pub use bot::{create_bot, Command};
pub use handlers::{schema, HandlerDeps, HandlerError};
pub use menu::handle_menu_callback;
