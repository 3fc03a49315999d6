//! Multi-turn travel chat with persistent sessions.

use std::io::Write;

use tracing::info;

use yatra_conversation::TurnRequest;

use super::{init_engine, CommandStrategy};

/// Input parameters for the Chat command strategy.
#[derive(Debug, Clone)]
pub struct ChatInput {
    /// Session to resume (a new one is created if not provided).
    pub session_id: Option<String>,
    /// Optional single message to send (non-interactive mode).
    pub message: Option<String>,
    /// Treat the message as a follow-up on cached results.
    pub followup: bool,
}

/// Strategy for the interactive (or one-shot) chat command.
#[derive(Debug, Clone, Copy)]
pub struct ChatStrategy;

impl CommandStrategy for ChatStrategy {
    type Input = ChatInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let (_config, engine) = init_engine().await?;

        if let Some(message) = input.message {
            let response = engine
                .process_turn(TurnRequest {
                    session_id: input.session_id,
                    message,
                    is_followup: input.followup,
                })
                .await?;

            println!("{}", response.response_text);
            info!(
                "Session: {} (language: {})",
                response.session_id,
                response.detected_language.as_deref().unwrap_or("?")
            );
            return Ok(());
        }

        // Interactive mode.
        let mut session_id = input.session_id;
        let mut followup = input.followup;

        println!("yatra travel assistant");
        println!(
            "Commands: /followup toggles follow-up mode, /new starts a fresh session, \
             'exit' quits.\n"
        );

        loop {
            let mode = if followup { "followup" } else { "new query" };
            print!("[{mode}] > ");
            std::io::stdout().flush()?;

            let mut line = String::new();
            std::io::stdin().read_line(&mut line)?;
            let line = line.trim();

            match line {
                "" => continue,
                "exit" | "quit" | "q" => break,
                "/followup" => {
                    followup = !followup;
                    println!("Follow-up mode: {}\n", if followup { "on" } else { "off" });
                    continue;
                }
                "/new" => {
                    session_id = None;
                    followup = false;
                    println!("Starting a fresh session on the next message.\n");
                    continue;
                }
                _ => {}
            }

            let request = TurnRequest {
                session_id: session_id.clone(),
                message: line.to_string(),
                is_followup: followup,
            };

            match engine.process_turn(request).await {
                Ok(response) => {
                    println!("\n{}\n", response.response_text);

                    if !response.warnings.is_empty() {
                        println!("(notes: {})", response.warnings.join(", "));
                    }
                    if response.is_booking {
                        println!("(booking confirmed)");
                    }
                    if !response.is_complete {
                        println!("(waiting for more details)");
                    }

                    session_id = Some(response.session_id);
                }
                Err(e) => eprintln!("Error: {e}"),
            }
        }

        if let Some(id) = session_id {
            println!("\nSession saved: {id}");
        }

        Ok(())
    }
}
