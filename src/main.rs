use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;
use std::time::Duration;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tokio::time::sleep;

use fennec::catalog::Catalog;
use fennec::cli::{Cli, Commands};
use fennec::core::{config, init_logger, Policy};
use fennec::storage::create_pool;
use fennec::telegram::{create_bot, schema, Command, HandlerDeps};

const MAX_DISPATCHER_RETRIES: u32 = 5;

/// Main entry point for the Telegram bot
///
/// Parses CLI arguments and dispatches to the appropriate subcommand.
///
/// # Errors
/// Returns an error if initialization fails (logging, database, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Global panic handler: log dispatcher panics and keep going instead
    // of terminating the process.
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
    }));

    init_logger(&config::LOG_FILE_PATH)?;

    // Load environment variables from .env if present
    let _ = dotenv();

    match cli.command {
        Some(Commands::Run) | None => run_bot().await,
        Some(Commands::InitDb) => {
            create_pool(&config::DATABASE_PATH)
                .map_err(|e| anyhow::anyhow!("Failed to create database pool: {}", e))?;
            log::info!("Database schema ready at {}", *config::DATABASE_PATH);
            Ok(())
        }
    }
}

async fn run_bot() -> Result<()> {
    log::info!("Starting bot...");

    let bot = create_bot()?;

    // Telegram may still be warming up right after a deploy; retry briefly
    let bot_info = {
        let mut startup_retry = 0;
        loop {
            match bot.get_me().await {
                Ok(info) => break info,
                Err(e) => {
                    startup_retry += 1;
                    if startup_retry >= 12 {
                        return Err(anyhow::anyhow!("Failed to connect to Bot API: {}", e));
                    }
                    log::warn!("Bot API not ready (attempt {}): {}. Retrying in 5 seconds...", startup_retry, e);
                    sleep(Duration::from_secs(5)).await;
                }
            }
        }
    };
    log::info!("Bot username: {:?}, Bot ID: {}", bot_info.username, bot_info.id);

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        log::warn!("Failed to register bot commands: {}", e);
    }

    let db_pool = Arc::new(
        create_pool(&config::DATABASE_PATH).map_err(|e| anyhow::anyhow!("Failed to create database pool: {}", e))?,
    );

    let catalog = Arc::new(Catalog::algerian());
    let policy = Policy::from_env();
    log::info!(
        "Commerce policy: {} DA per video, withdrawal threshold {} DA",
        policy.video_reward,
        policy.withdrawal_threshold
    );

    let handler_deps = HandlerDeps::new(db_pool, catalog, policy);
    let handler = schema(handler_deps);

    log::info!("Starting bot in long polling mode");

    // Run the dispatcher in a task so a panic is caught via the JoinHandle
    // and we can reconnect instead of dying.
    let mut retry_count = 0;
    loop {
        let bot_clone = bot.clone();
        let handler_clone = handler.clone();

        let handle = tokio::spawn(async move {
            Dispatcher::builder(bot_clone, handler_clone)
                .dependencies(DependencyMap::new())
                .enable_ctrlc_handler()
                .build()
                .dispatch()
                .await
        });

        match handle.await {
            Ok(()) => {
                log::info!("Dispatcher shutdown gracefully");
                break;
            }
            Err(join_err) if join_err.is_panic() => {
                log::error!("Dispatcher panicked: {}", join_err);
                if retry_count >= MAX_DISPATCHER_RETRIES {
                    log::error!("Max retries reached after panic. Exiting...");
                    break;
                }
                retry_count += 1;
                log::info!(
                    "Retrying dispatcher connection after panic (attempt {}/{})...",
                    retry_count,
                    MAX_DISPATCHER_RETRIES
                );
                sleep(Duration::from_secs(5)).await;
            }
            Err(join_err) => {
                log::warn!("Dispatcher task was cancelled: {}", join_err);
                break;
            }
        }
    }

    Ok(())
}
