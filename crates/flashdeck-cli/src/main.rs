//! flashdeck CLI - the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "flashdeck", version, about = "Spaced-repetition flashcard trainer")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Act as this user instead of the configured one
    #[arg(long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create starter config and example deck
    Init,

    /// Validate deck TOML files
    Validate {
        /// Path to deck file or directory
        #[arg(long)]
        deck: PathBuf,
    },

    /// Create or update one of your decks from a TOML file
    Import {
        /// Path to deck file
        #[arg(long)]
        deck: PathBuf,

        /// Date new cards become due (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// List decks
    List {
        /// Whose decks to list (default: you)
        #[arg(long)]
        owner: Option<String>,
    },

    /// Show deck metadata
    Info {
        /// Deck as "owner/name" or "name"
        #[arg(long)]
        deck: String,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Show the next due card
    Next {
        /// Deck as "owner/name" or "name"
        #[arg(long)]
        deck: String,

        /// Review date (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Record a review of one card
    Feedback {
        /// Deck as "owner/name" or "name"
        #[arg(long)]
        deck: String,

        /// Card id
        #[arg(long)]
        card: u64,

        /// The answer was recalled
        #[arg(long, conflicts_with = "fail", required_unless_present = "fail")]
        pass: bool,

        /// The answer was not recalled
        #[arg(long)]
        fail: bool,

        /// Time taken to answer, in milliseconds
        #[arg(long)]
        response_ms: Option<u64>,

        /// Review date (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Train interactively until no cards are due
    Train {
        /// Deck as "owner/name" or "name"
        #[arg(long)]
        deck: String,

        /// Review date (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Show deck statistics
    Stats {
        /// Deck as "owner/name" or "name"
        #[arg(long)]
        deck: String,

        /// Reference date (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Output format: text, json, markdown, html
        #[arg(long, default_value = "text")]
        format: String,

        /// Write the report to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Remove one of your decks
    Remove {
        /// Deck as "owner/name" or "name"
        #[arg(long)]
        deck: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("flashdeck=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.config;
    let user = cli.user;

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Validate { deck } => commands::validate::execute(deck, config),
        Commands::Import { deck, date } => {
            commands::import::execute(deck, date, config, user).await
        }
        Commands::List { owner } => commands::list::execute(owner, config, user).await,
        Commands::Info { deck, format } => {
            commands::info::execute(deck, format, config, user).await
        }
        Commands::Next { deck, date, format } => {
            commands::next::execute(deck, date, format, config, user).await
        }
        Commands::Feedback {
            deck,
            card,
            pass,
            fail: _,
            response_ms,
            date,
        } => commands::feedback::execute(deck, card, pass, response_ms, date, config, user).await,
        Commands::Train { deck, date } => {
            commands::train::execute(deck, date, config, user).await
        }
        Commands::Stats {
            deck,
            date,
            format,
            output,
        } => commands::stats::execute(deck, date, format, output, config, user).await,
        Commands::Remove { deck } => commands::remove::execute(deck, config, user).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
