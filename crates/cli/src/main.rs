//! Chinwag CLI — the main entry point.
//!
//! Commands:
//! - `onboard` — Initialize config directory & default config
//! - `chat`    — Interactive chat or single-message mode, with attachments
//! - `history` — Inspect or clear the persisted exchange log

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "chinwag",
    about = "Chinwag — persistent multi-turn chat with attachments",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration
    Onboard,

    /// Chat with the model
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Attach a file to the message (repeatable)
        #[arg(short, long = "attach", value_name = "FILE")]
        attach: Vec<PathBuf>,
    },

    /// Inspect or clear the persisted history
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// Print the persisted exchange log
    Show,
    /// Reset the log (rotates a timestamped backup by default)
    Clear,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Chat { message, attach } => commands::chat::run(message, attach).await?,
        Commands::History { action } => match action {
            HistoryAction::Show => commands::history::show().await?,
            HistoryAction::Clear => commands::history::clear().await?,
        },
    }

    Ok(())
}
