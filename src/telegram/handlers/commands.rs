//! Command handler implementations (/start, /upload_video, /withdraw, ...)

use teloxide::prelude::*;
use teloxide::types::{Message, ParseMode};

use super::types::{display_name, reply_app_error, HandlerDeps, HandlerError};
use crate::core::error::AppError;
use crate::session::{self, ledger, Role, UserStore};
use crate::telegram::menu::{menus, to_keyboard, to_reply_keyboard, MenuLabel};
use crate::telegram::text;
use crate::telegram::Bot;

/// Handle /start command
///
/// Registered users get their role-specific persistent keyboard; everyone
/// else gets the welcome text with the registration buttons.
pub(super) async fn handle_start_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    match deps.store.get(msg.chat.id.0) {
        Ok(Some(user)) => {
            let rows = menus::reply_menu(&deps.catalog, user.role);
            bot.send_message(msg.chat.id, format!("Welcome back, {}! 🦊", user.display_name))
                .reply_markup(to_reply_keyboard(&rows))
                .await?;
        }
        Ok(None) => {
            bot.send_message(msg.chat.id, text::welcome(&display_name(msg)))
                .parse_mode(ParseMode::Markdown)
                .reply_markup(to_keyboard(&menus::start_menu()))
                .await?;
        }
        Err(e) => reply_app_error(bot, msg.chat.id, &e).await,
    }
    Ok(())
}

/// Handle /upload_video command: teacher enters the upload-capture flow.
pub(super) async fn handle_upload_video_command(
    bot: &Bot,
    msg: &Message,
    deps: &HandlerDeps,
) -> Result<(), HandlerError> {
    let outcome = {
        let _guard = deps.user_locks.acquire(msg.chat.id.0).await;
        session::request_video_upload(&deps.store, msg.chat.id.0)
    };
    match outcome {
        Ok(outcome) => {
            bot.send_message(msg.chat.id, text::outcome(&outcome))
                .parse_mode(ParseMode::Markdown)
                .await?;
        }
        Err(e) => reply_app_error(bot, msg.chat.id, &e).await,
    }
    Ok(())
}

/// Handle /my_earnings command: read-only balance view with the distance
/// to the withdrawal threshold.
pub(super) async fn handle_my_earnings_command(
    bot: &Bot,
    msg: &Message,
    deps: &HandlerDeps,
) -> Result<(), HandlerError> {
    match deps.store.get(msg.chat.id.0) {
        Ok(Some(user)) if user.role == Role::Teacher => {
            let shortfall = ledger::withdrawal_shortfall(&user, &deps.policy);
            bot.send_message(
                msg.chat.id,
                text::earnings(user.earnings_balance, user.videos_count, shortfall),
            )
            .parse_mode(ParseMode::Markdown)
            .await?;
        }
        Ok(Some(_)) => {
            reply_app_error(
                bot,
                msg.chat.id,
                &AppError::RoleMismatch { required: Role::Teacher },
            )
            .await
        }
        Ok(None) => reply_app_error(bot, msg.chat.id, &AppError::NotRegistered).await,
        Err(e) => reply_app_error(bot, msg.chat.id, &e).await,
    }
    Ok(())
}

/// Handle /withdraw command: threshold-gated entry into withdrawal capture.
pub(super) async fn handle_withdraw_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let outcome = {
        let _guard = deps.user_locks.acquire(msg.chat.id.0).await;
        session::request_withdrawal(&deps.store, msg.chat.id.0, &deps.policy)
    };
    match outcome {
        Ok(outcome) => {
            bot.send_message(msg.chat.id, text::outcome(&outcome))
                .parse_mode(ParseMode::Markdown)
                .await?;
        }
        Err(e) => reply_app_error(bot, msg.chat.id, &e).await,
    }
    Ok(())
}

/// Handle /profile command
///
/// The teacher video count comes from the append-only video log, not the
/// record's counter, so the profile reflects what was actually captured.
pub(super) async fn handle_profile_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let profile = deps.store.get(msg.chat.id.0).and_then(|user| match user {
        Some(user) if user.role == Role::Teacher => {
            let published = deps.store.videos_count(user.telegram_id)?;
            Ok(Some(text::profile(&user, published)))
        }
        Some(user) => Ok(Some(text::profile(&user, 0))),
        None => Ok(None),
    });

    match profile {
        Ok(Some(profile_text)) => {
            bot.send_message(msg.chat.id, profile_text)
                .parse_mode(ParseMode::Markdown)
                .await?;
        }
        Ok(None) => reply_app_error(bot, msg.chat.id, &AppError::NotRegistered).await,
        Err(e) => reply_app_error(bot, msg.chat.id, &e).await,
    }
    Ok(())
}

/// Routes a reply-keyboard label to the handler it names, mirroring the
/// command surface.
pub(super) async fn handle_menu_label(
    bot: &Bot,
    msg: &Message,
    deps: &HandlerDeps,
    label: MenuLabel,
) -> Result<(), HandlerError> {
    match label {
        MenuLabel::UploadVideo => handle_upload_video_command(bot, msg, deps).await,
        MenuLabel::MyEarnings => handle_my_earnings_command(bot, msg, deps).await,
        MenuLabel::Profile => handle_profile_command(bot, msg, deps).await,
        MenuLabel::Marketplace => {
            bot.send_message(msg.chat.id, text::marketplace())
                .parse_mode(ParseMode::Markdown)
                .await?;
            Ok(())
        }
        MenuLabel::PaymentInfo => {
            bot.send_message(msg.chat.id, text::payment_info(&deps.catalog))
                .parse_mode(ParseMode::Markdown)
                .await?;
            Ok(())
        }
        MenuLabel::Help => {
            bot.send_message(msg.chat.id, text::help_text())
                .parse_mode(ParseMode::Markdown)
                .await?;
            Ok(())
        }
        MenuLabel::BrowseLevel(level) => {
            // Same path the inline level button takes: remember the level
            // for registered students, then show the years.
            {
                let _guard = deps.user_locks.acquire(msg.chat.id.0).await;
                match session::select_level(&deps.store, msg.chat.id.0, &level) {
                    Ok(_) | Err(AppError::NotRegistered) | Err(AppError::RoleMismatch { .. }) => {}
                    Err(e) => {
                        reply_app_error(bot, msg.chat.id, &e).await;
                        return Ok(());
                    }
                }
            }
            let Some(items) = menus::year_menu(&deps.catalog, &level) else { return Ok(()) };
            let name = deps.catalog.level(&level).map(|l| l.name).unwrap_or_default();
            bot.send_message(msg.chat.id, text::pick_year(name))
                .parse_mode(ParseMode::Markdown)
                .reply_markup(to_keyboard(&items))
                .await?;
            Ok(())
        }
    }
}
