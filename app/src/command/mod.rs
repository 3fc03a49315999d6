//! Static strategy pattern for CLI commands.
//!
//! Each command is its own strategy type with a typed input, dispatched
//! statically from `main`.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use yatra_agents::AgentRegistry;
use yatra_config::Config;
use yatra_conversation::{EngineConfig, TurnEngine};
use yatra_language::LanguageBridge;
use yatra_memory::MemoryManager;
use yatra_providers::{ExaSearchClient, GlmTranslator};

mod chat;
mod health;
mod init;
mod session;
mod version;

pub use chat::{ChatInput, ChatStrategy};
pub use health::HealthStrategy;
pub use init::InitStrategy;
pub use session::{SessionAction, SessionInput, SessionStrategy};
pub use version::VersionStrategy;

/// Core trait defining the contract for all command strategies.
///
/// Static dispatch only: each strategy defines its own input type and
/// is monomorphized at compile time.
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    /// Execute the command with the given input.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}

/// Build the turn engine from the on-disk config, wiring the real
/// providers and the SQLite store.
pub(crate) async fn init_engine() -> anyhow::Result<(Config, TurnEngine<MemoryManager>)> {
    let config = Config::load()?;
    info!("Loaded config from ~/yatra/config.json");

    let db_path = config.database_path()?;
    info!("Database path: {}", db_path.display());
    let store = MemoryManager::new(&db_path).await?;

    let mut translator = GlmTranslator::new(config.providers.translation.api_key.clone());
    if let Some(url) = &config.providers.translation.base_url {
        translator = translator.with_base_url(url.clone());
    }
    let bridge = LanguageBridge::new(Arc::new(translator))
        .with_confidence_threshold(config.engine.detection_confidence_threshold);

    let mut search = ExaSearchClient::new(config.providers.search.api_key.clone());
    if let Some(url) = &config.providers.search.base_url {
        search = search.with_base_url(url.clone());
    }
    let registry = AgentRegistry::with_defaults(
        Arc::new(search),
        Duration::from_secs(config.engine.agent_timeout_secs),
    );

    let engine = TurnEngine::new(store, bridge, registry).with_config(EngineConfig {
        turn_deadline: Duration::from_secs(config.engine.turn_deadline_secs),
        history_limit: config.engine.history_limit,
        ..EngineConfig::default()
    });

    Ok((config, engine))
}
