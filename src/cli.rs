use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "fennec")]
#[command(author, version, about = "Telegram bot for the Fennec Academy education marketplace", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the bot (long polling)
    Run,

    /// Create the database schema and exit
    InitDb,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
