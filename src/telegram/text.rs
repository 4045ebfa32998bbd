//! Outbound message templates.
//!
//! All human-readable rendering lives here, on the gateway side of the
//! boundary: the session and router produce typed outcomes, this module
//! turns them into text.

use crate::catalog::Catalog;
use crate::session::{Outcome, Role, User};

pub fn welcome(first_name: &str) -> String {
    format!(
        "🦊 *Welcome to Fennec Academy*\n\n\
         Hey {}! 👋\n\n\
         The Algerian learning platform 🇩🇿\n\n\
         📚 *What we offer:*\n\
         ✅ Video lessons for every level\n\
         ✅ Channels organized by year and subject\n\
         ✅ Professional teachers\n\
         ✅ A marketplace for study material\n\n\
         *Pick your account type:*",
        first_name
    )
}

pub fn help_text() -> String {
    "📖 *How to use the bot*\n\n\
     *Basics:*\n\
     /start — registration and main menu\n\
     /help — this guide\n\
     /profile — your profile\n\
     /payment_info — how to pay\n\n\
     *Students:*\n\
     📚 Browse lessons by level and year\n\
     🛒 Buy material from the marketplace\n\n\
     *Teachers:*\n\
     /upload_video — upload a lesson\n\
     /my_earnings — your balance\n\
     /withdraw — withdraw earnings\n\
     /teacher_guide — the teacher guide"
        .to_string()
}

pub fn teacher_guide() -> String {
    "📚 *Teacher guide*\n\n\
     *Uploading a lesson:*\n\
     📹 Use /upload_video, then send the video with the lesson title as caption\n\n\
     *Earnings:*\n\
     💰 A fixed reward per published video\n\n\
     *Withdrawing:*\n\
     💵 Available once your balance reaches the threshold\n\
     📱 Use /withdraw and send your CCP account number\n\n\
     *Tracking:*\n\
     /my_earnings — balance\n\
     /profile — your stats"
        .to_string()
}

pub fn payment_info(catalog: &Catalog) -> String {
    let mut out = String::from(
        "💳 *Paying via BaridiMob CCP*\n\n\
         📱 Account: CCP 00799999900012345678\n\
         👤 Name: Fennec Academy\n\n\
         *Plans:*\n",
    );
    for plan in catalog.plans() {
        out.push_str(&format!("• {} — {} DA\n", plan.name, plan.price_da));
        for feature in &plan.features {
            out.push_str(&format!("   · {}\n", feature));
        }
    }
    out.push_str(
        "\n📸 After paying, send a screenshot of the receipt to support.\n\
         ⏱️ Activation within 2-6 hours",
    );
    out
}

pub fn marketplace() -> String {
    "🛒 *Marketplace*\n\n\
     *For sale:*\n\
     📝 Summaries — 300 DA\n\
     📚 Research papers — 500 DA\n\
     🎯 Exam samples — 200 DA\n\n\
     More material coming soon!"
        .to_string()
}

pub fn academy_info() -> String {
    "📱 *About Fennec Academy*\n\n\
     A leading Algerian learning platform 🇩🇿\n\n\
     *📊 Our numbers:*\n\
     • 1,480+ professional teachers\n\
     • 25,000+ registered students\n\
     • 5,250+ lessons and lectures\n\n\
     *💳 Payment:*\n\
     BaridiMob CCP — safe and fast"
        .to_string()
}

pub fn registered(role: Role) -> String {
    match role {
        Role::Student => "✅ *Registered as a student!*\n\n\
                          You can now browse lessons by level. Pick one below 👇"
            .to_string(),
        Role::Teacher => "✅ *Welcome to the teaching team!* 👨‍🏫\n\n\
                          Pick your specialization below, then use /upload_video to publish your first lesson.\n\
                          /teacher_guide has the details."
            .to_string(),
    }
}

pub fn already_registered(role: Role) -> String {
    format!(
        "ℹ️ You already have a {} account — your record is unchanged.",
        role
    )
}

pub fn pick_year(level_name: &str) -> String {
    format!("*{}*\n\nPick the school year:", level_name)
}

pub fn pick_subject(year_name: &str) -> String {
    format!("*{}*\n\n📚 Available subjects:", year_name)
}

pub fn subject_lessons(year_name: &str, subject_name: &str) -> String {
    format!(
        "*{} — {}*\n\n\
         📹 Lessons for this subject are published in the matching channel.\n\
         Subscribe with /payment_info to unlock everything.",
        year_name, subject_name
    )
}

pub fn specialization_set(subject_name: &str) -> String {
    format!("✅ Specialization saved: {}\n\nUse /upload_video to publish a lesson.", subject_name)
}

pub fn profile(user: &User, published_videos: i64) -> String {
    let since = user.registered_at.get(..10).unwrap_or(&user.registered_at);
    match user.role {
        Role::Student => format!(
            "👤 *Your profile*\n\n\
             📛 {}\n\
             🎓 Student\n\
             📅 Since {}\n\
             📺 Lessons watched: {}\n\n\
             /help — the guide",
            user.display_name, since, user.videos_watched
        ),
        Role::Teacher => format!(
            "👤 *Your profile*\n\n\
             📛 {}\n\
             👨‍🏫 Teacher\n\
             📹 Videos: {}\n\
             💰 Balance: {} DA\n\
             📅 Since {}\n\n\
             /my_earnings — earnings\n\
             /upload_video — upload a lesson",
            user.display_name, published_videos, user.earnings_balance, since
        ),
    }
}

pub fn earnings(balance: i64, videos: i64, shortfall: Option<i64>) -> String {
    let mut out = format!(
        "💰 *Your earnings*\n\n\
         💵 Balance: *{} DA*\n\
         📹 Videos: {}\n\n",
        balance, videos
    );
    match shortfall {
        None => out.push_str("✅ You can withdraw!\n/withdraw"),
        Some(missing) => out.push_str(&format!("⏳ {} DA to go before you can withdraw", missing)),
    }
    out
}

/// Renders a state-machine outcome from the commerce flows.
pub fn outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::UploadPromptRequested => "📹 *Upload a lesson video*\n\n\
             Send the video now with the lesson title as caption.\n\n\
             Example: \"Percentages explained — Maths\"\n\n\
             We review and publish within 24 hours."
            .to_string(),
        Outcome::VideoAccepted { caption, reward, balance, videos_count } => format!(
            "✅ *Video received!*\n\n\
             📹 Title: {}\n\
             💰 Reward: +{} DA\n\n\
             📊 Total balance: {} DA\n\
             📹 Your videos: {}\n\n\
             It will be published in the matching channel soon!\n\n\
             /my_earnings — see your earnings",
            caption, reward, balance, videos_count
        ),
        Outcome::WithdrawalPromptRequested { balance } => format!(
            "💰 *Withdrawal request*\n\n\
             Amount: {} DA\n\n\
             Send your CCP account number:\n\
             Example: 00799999900012345678",
            balance
        ),
        Outcome::WithdrawalBelowThreshold { balance, shortfall } => format!(
            "⚠️ Your balance is below the withdrawal threshold.\n\n\
             Balance: {} DA\n\
             Missing: {} DA",
            balance, shortfall
        ),
        Outcome::WithdrawalCaptured { amount, account } => format!(
            "✅ *Withdrawal request recorded!*\n\n\
             💰 Amount: {} DA\n\
             🏦 Account: {}\n\n\
             The transfer will be processed within 48 hours 🎉",
            amount, account
        ),
        _ => String::new(),
    }
}

pub fn unregistered_hint() -> String {
    "Hi there! Use /start to begin 🦊".to_string()
}

pub fn fallback() -> String {
    "Use the menu or /help 🤔".to_string()
}
