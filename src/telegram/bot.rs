//! Bot command definitions and bot construction

use teloxide::utils::command::BotCommands;

use crate::core::config;
use crate::telegram::Bot;

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "snake_case", description = "What I can do:")]
pub enum Command {
    #[command(description = "registration and main menu")]
    Start,
    #[command(description = "usage guide")]
    Help,
    #[command(description = "your profile")]
    Profile,
    #[command(description = "upload a lesson video (teachers)")]
    UploadVideo,
    #[command(description = "your earnings balance (teachers)")]
    MyEarnings,
    #[command(description = "withdraw your earnings (teachers)")]
    Withdraw,
    #[command(description = "subscription plans and payment")]
    PaymentInfo,
    #[command(description = "the teacher guide")]
    TeacherGuide,
    #[command(description = "browse the marketplace")]
    Marketplace,
}

/// Creates the Bot instance from the configured token.
///
/// # Returns
/// * `Ok(Bot)` - Successfully created bot instance
/// * `Err(anyhow::Error)` - BOT_TOKEN / TELOXIDE_TOKEN is not set
pub fn create_bot() -> anyhow::Result<Bot> {
    let token = config::BOT_TOKEN.clone();
    if token.is_empty() {
        return Err(anyhow::anyhow!("BOT_TOKEN environment variable not set"));
    }
    Ok(Bot::new(token))
}
