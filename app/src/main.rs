#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod command;

use command::{
    ChatInput, ChatStrategy, CommandStrategy, HealthStrategy, InitStrategy, SessionAction,
    SessionInput, SessionStrategy, VersionStrategy,
};

#[derive(Parser)]
#[command(name = "yatra")]
#[command(about = "Multi-lingual travel assistant", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the assistant (interactive unless -m is given)
    Chat {
        /// Resume an existing session
        #[arg(short = 's', long)]
        session: Option<String>,

        /// Single message to send
        #[arg(short = 'm', long)]
        message: Option<String>,

        /// Treat the message as a follow-up on cached results
        #[arg(short = 'f', long)]
        followup: bool,
    },
    /// Inspect or manage stored sessions
    Session {
        #[command(subcommand)]
        action: SessionCommands,
    },
    /// Check storage and capability health
    Health,
    /// Initialize configuration
    Init,
    /// Show version
    Version,
}

#[derive(Subcommand)]
enum SessionCommands {
    /// List stored session ids
    List,
    /// Print a full session snapshot as JSON
    Show { id: String },
    /// Delete a session and everything it owns
    Delete { id: String },
    /// Delete sessions idle for longer than the given number of days
    Purge {
        #[arg(long, default_value_t = 30)]
        days: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Chat {
            session,
            message,
            followup,
        } => {
            ChatStrategy
                .execute(ChatInput {
                    session_id: session,
                    message,
                    followup,
                })
                .await?;
        }
        Commands::Session { action } => {
            let action = match action {
                SessionCommands::List => SessionAction::List,
                SessionCommands::Show { id } => SessionAction::Show { id },
                SessionCommands::Delete { id } => SessionAction::Delete { id },
                SessionCommands::Purge { days } => SessionAction::Purge { days },
            };
            SessionStrategy.execute(SessionInput { action }).await?;
        }
        Commands::Health => {
            HealthStrategy.execute(()).await?;
        }
        Commands::Init => {
            InitStrategy.execute(()).await?;
        }
        Commands::Version => {
            VersionStrategy.execute(()).await?;
        }
    }

    Ok(())
}
