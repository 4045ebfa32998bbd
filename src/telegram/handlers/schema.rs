//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::{Message, ParseMode};

use super::commands::{
    handle_menu_label, handle_my_earnings_command, handle_profile_command, handle_start_command,
    handle_upload_video_command, handle_withdraw_command,
};
use super::types::{reply_app_error, HandlerDeps, HandlerError};
use crate::session::{self, Outcome, PendingAction, UserStore};
use crate::telegram::bot::Command;
use crate::telegram::menu::{self, handle_menu_callback};
use crate::telegram::text;
use crate::telegram::Bot;

/// Creates the main dispatcher schema for the Telegram bot.
///
/// Returns a handler tree usable with teloxide's Dispatcher. The same
/// schema serves production and the integration tests.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_commands = deps.clone();
    let deps_video = deps.clone();
    let deps_messages = deps.clone();
    let deps_callback = deps;

    dptree::entry()
        // Command handler
        .branch(command_handler(deps_commands))
        // Video capture for teachers in the upload flow
        .branch(video_handler(deps_video))
        // Free text (withdrawal account capture, fallback)
        .branch(message_handler(deps_messages))
        // Callback query handler
        .branch(callback_handler(deps_callback))
}

/// Handler for bot commands
fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        move |bot: Bot, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                log::info!("Received command: {:?} from chat {}", cmd, msg.chat.id);

                match cmd {
                    Command::Start => {
                        handle_start_command(&bot, &msg, &deps).await?;
                    }
                    Command::Help => {
                        bot.send_message(msg.chat.id, text::help_text())
                            .parse_mode(ParseMode::Markdown)
                            .await?;
                    }
                    Command::Profile => {
                        handle_profile_command(&bot, &msg, &deps).await?;
                    }
                    Command::UploadVideo => {
                        handle_upload_video_command(&bot, &msg, &deps).await?;
                    }
                    Command::MyEarnings => {
                        handle_my_earnings_command(&bot, &msg, &deps).await?;
                    }
                    Command::Withdraw => {
                        handle_withdraw_command(&bot, &msg, &deps).await?;
                    }
                    Command::PaymentInfo => {
                        bot.send_message(msg.chat.id, text::payment_info(&deps.catalog))
                            .parse_mode(ParseMode::Markdown)
                            .await?;
                    }
                    Command::TeacherGuide => {
                        bot.send_message(msg.chat.id, text::teacher_guide())
                            .parse_mode(ParseMode::Markdown)
                            .await?;
                    }
                    Command::Marketplace => {
                        bot.send_message(msg.chat.id, text::marketplace())
                            .parse_mode(ParseMode::Markdown)
                            .await?;
                    }
                }
                Ok(())
            }
        },
    ))
}

/// Handler for video messages: upload capture for teachers mid-flow.
///
/// A video outside the upload flow is deliberately not replied to — the
/// event is simply not handled and has no ledger effect.
fn video_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.video().is_some())
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                let Some(video) = msg.video() else { return Ok(()) };
                let media_ref = video.file.id.0.clone();
                let caption = msg.caption().unwrap_or("New lesson").to_string();
                let chat_id = msg.chat.id;

                let outcome = {
                    let _guard = deps.user_locks.acquire(chat_id.0).await;
                    session::video_received(&deps.store, chat_id.0, &media_ref, &caption, &deps.policy)
                };

                match outcome {
                    Ok(Outcome::NotHandled) => {}
                    Ok(outcome) => {
                        bot.send_message(chat_id, text::outcome(&outcome))
                            .parse_mode(ParseMode::Markdown)
                            .await?;
                    }
                    Err(e) => reply_app_error(&bot, chat_id, &e).await,
                }
                Ok(())
            }
        })
}

/// Handler for free text: withdrawal account capture first, then
/// reply-keyboard labels routed to their command handlers, then the hint.
fn message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.text().map(|t| !t.starts_with('/')).unwrap_or(false))
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                let chat_id = msg.chat.id;
                let Some(message_text) = msg.text() else { return Ok(()) };

                let user = match deps.store.get(chat_id.0) {
                    Ok(user) => user,
                    Err(e) => {
                        reply_app_error(&bot, chat_id, &e).await;
                        return Ok(());
                    }
                };

                let Some(user) = user else {
                    bot.send_message(chat_id, text::unregistered_hint()).await?;
                    return Ok(());
                };

                // Account capture wins over label routing: a pending
                // withdrawal consumes whatever text arrives next.
                if user.pending_action == PendingAction::AwaitingWithdrawalAccount {
                    let outcome = {
                        let _guard = deps.user_locks.acquire(chat_id.0).await;
                        session::account_received(&deps.store, chat_id.0, message_text)
                    };
                    match outcome {
                        // Flow was resolved by a racing event; fall through
                        Ok(Outcome::NotHandled) => {}
                        Ok(outcome) => {
                            bot.send_message(chat_id, text::outcome(&outcome))
                                .parse_mode(ParseMode::Markdown)
                                .await?;
                            return Ok(());
                        }
                        Err(e) => {
                            reply_app_error(&bot, chat_id, &e).await;
                            return Ok(());
                        }
                    }
                }

                if let Some(label) = menu::parse_label(message_text.trim(), &deps.catalog) {
                    return handle_menu_label(&bot, &msg, &deps, label).await;
                }

                bot.send_message(chat_id, text::fallback()).await?;
                Ok(())
            }
        })
}

/// Handler for callback queries from the inline menus
fn callback_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
        let deps = deps.clone();
        async move {
            handle_menu_callback(bot, q, deps).await?;
            Ok(())
        }
    })
}
