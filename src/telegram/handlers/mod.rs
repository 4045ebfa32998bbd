//! Telegram bot handler tree configuration
//!
//! The handlers are organized in a testable way: integration tests can use
//! the same `schema` handler tree as production code.

mod commands;
mod schema;
mod types;

pub use schema::schema;
pub use types::{display_name, reply_app_error, HandlerDeps, HandlerError};
