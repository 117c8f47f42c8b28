use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// `gptrelay` - relays Telegram bot commands to an OpenAI-compatible chat model.
#[derive(Parser, Debug)]
#[command(name = "gptrelay")]
#[command(version)]
#[command(about = "Telegram to chat-completion relay bot.", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.gptrelay/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging for the relay
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start polling Telegram and answering commands (default)
    Run,

    /// Validate configuration and print the effective settings
    Check {
        /// Also contact the completion endpoint and the Telegram API
        #[arg(long)]
        online: bool,
    },
}
