use once_cell::sync::Lazy;
use std::env;

/// Configuration constants for the bot

/// Telegram bot token
/// Read from BOT_TOKEN or TELOXIDE_TOKEN environment variable
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    env::var("BOT_TOKEN")
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_default()
});

/// Database file path
/// Read from DATABASE_PATH environment variable
/// Default: fennec.sqlite
pub static DATABASE_PATH: Lazy<String> =
    Lazy::new(|| env::var("DATABASE_PATH").unwrap_or_else(|_| "fennec.sqlite".to_string()));

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: fennec.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "fennec.log".to_string()));

/// Commerce policy values.
///
/// These are business rules, not state-machine shape: the reward credited
/// per accepted lesson video and the minimum balance required before a
/// withdrawal can start. Both are overridable via environment variables so
/// deployments can tune them without a rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    /// DZD credited to a teacher per accepted video (VIDEO_REWARD_DA)
    pub video_reward: i64,
    /// Minimum DZD balance before a withdrawal may start (WITHDRAWAL_THRESHOLD_DA)
    pub withdrawal_threshold: i64,
}

impl Policy {
    pub const DEFAULT_VIDEO_REWARD_DA: i64 = 50;
    pub const DEFAULT_WITHDRAWAL_THRESHOLD_DA: i64 = 1000;

    /// Reads the policy from the environment, falling back to the defaults
    /// on missing or unparsable values.
    pub fn from_env() -> Self {
        Self {
            video_reward: env_i64("VIDEO_REWARD_DA", Self::DEFAULT_VIDEO_REWARD_DA),
            withdrawal_threshold: env_i64("WITHDRAWAL_THRESHOLD_DA", Self::DEFAULT_WITHDRAWAL_THRESHOLD_DA),
        }
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            video_reward: Self::DEFAULT_VIDEO_REWARD_DA,
            withdrawal_threshold: Self::DEFAULT_WITHDRAWAL_THRESHOLD_DA,
        }
    }
}

fn env_i64(name: &str, default: i64) -> i64 {
    match env::var(name).ok().map(|v| v.parse::<i64>()) {
        Some(Ok(v)) if v >= 0 => v,
        Some(_) => {
            log::warn!("Ignoring invalid {} value, using default {}", name, default);
            default
        }
        None => default,
    }
}
