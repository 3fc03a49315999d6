//! Session inspection and lifecycle commands.

use super::{init_engine, CommandStrategy};

#[derive(Debug, Clone)]
pub enum SessionAction {
    List,
    Show { id: String },
    Delete { id: String },
    Purge { days: i64 },
}

#[derive(Debug, Clone)]
pub struct SessionInput {
    pub action: SessionAction,
}

/// Strategy for the `session` subcommands.
#[derive(Debug, Clone, Copy)]
pub struct SessionStrategy;

impl CommandStrategy for SessionStrategy {
    type Input = SessionInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let (_config, engine) = init_engine().await?;

        match input.action {
            SessionAction::List => {
                let sessions = engine.store().list_sessions().await?;
                if sessions.is_empty() {
                    println!("No sessions stored.");
                } else {
                    for id in sessions {
                        println!("{id}");
                    }
                }
            }
            SessionAction::Show { id } => {
                let snapshot = engine.snapshot(&id).await?;
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            }
            SessionAction::Delete { id } => {
                if engine.delete_session(&id).await? {
                    println!("Session deleted: {id}");
                } else {
                    println!("Session not found: {id}");
                }
            }
            SessionAction::Purge { days } => {
                let removed = engine
                    .store()
                    .purge_stale_sessions(chrono::Duration::days(days))
                    .await?;
                println!("Purged {removed} sessions older than {days} days.");
            }
        }

        Ok(())
    }
}
