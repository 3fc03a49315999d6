use super::{init_engine, CommandStrategy};

/// Strategy for the health check command.
#[derive(Debug, Clone, Copy)]
pub struct HealthStrategy;

impl CommandStrategy for HealthStrategy {
    type Input = ();

    async fn execute(&self, (): Self::Input) -> anyhow::Result<()> {
        let (_config, engine) = init_engine().await?;
        let report = engine.health_check().await;
        println!("{}", serde_json::to_string_pretty(&report)?);
        Ok(())
    }
}
