use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub engine: EngineDefaults,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub translation: ProviderConfig,
    pub search: ProviderConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    pub api_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default = "DatabaseConfig::default_file")]
    pub file: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            file: Self::default_file(),
        }
    }
}

impl DatabaseConfig {
    fn default_file() -> String {
        "sessions.db".to_string()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EngineDefaults {
    /// Per-agent search timeout in seconds.
    #[serde(default = "EngineDefaults::default_agent_timeout")]
    pub agent_timeout_secs: u64,
    /// Outer deadline for a whole turn's fan-out, in seconds.
    #[serde(default = "EngineDefaults::default_turn_deadline")]
    pub turn_deadline_secs: u64,
    /// Language detections below this confidence fall back to the
    /// session language.
    #[serde(default = "EngineDefaults::default_confidence")]
    pub detection_confidence_threshold: f32,
    /// Messages returned in session snapshots.
    #[serde(default = "EngineDefaults::default_history_limit")]
    pub history_limit: u64,
}

impl Default for EngineDefaults {
    fn default() -> Self {
        Self {
            agent_timeout_secs: Self::default_agent_timeout(),
            turn_deadline_secs: Self::default_turn_deadline(),
            detection_confidence_threshold: Self::default_confidence(),
            history_limit: Self::default_history_limit(),
        }
    }
}

impl EngineDefaults {
    const fn default_agent_timeout() -> u64 {
        20
    }

    const fn default_turn_deadline() -> u64 {
        60
    }

    const fn default_confidence() -> f32 {
        0.5
    }

    const fn default_history_limit() -> u64 {
        10
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_dir()?.join("config.json");

        if !config_path.exists() {
            anyhow::bail!(
                "Config file not found at: {}. Please run 'yatra init' to create it.",
                config_path.display()
            );
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Self = serde_json::from_str(&content)?;

        Ok(config)
    }

    pub fn config_dir() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join("yatra"))
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    /// Absolute path of the session database file.
    pub fn database_path(&self) -> anyhow::Result<PathBuf> {
        let file = PathBuf::from(&self.database.file);
        if file.is_absolute() {
            return Ok(file);
        }
        Ok(Self::config_dir()?.join(file))
    }

    pub fn create_config() -> anyhow::Result<()> {
        let config_dir = Self::ensure_config_dir()?;
        let config_path = config_dir.join("config.json");

        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        let config_template = r#"{
  "providers": {
    "translation": {
      "api_key": "your-glm-api-key-here"
    },
    "search": {
      "api_key": "your-exa-api-key-here"
    }
  },
  "database": {
    "file": "sessions.db"
  },
  "engine": {
    "agent_timeout_secs": 20,
    "turn_deadline_secs": 60,
    "detection_confidence_threshold": 0.5,
    "history_limit": 10
  }
}"#;

        std::fs::write(&config_path, config_template)?;

        println!("Created config file at: {}", config_path.display());
        println!();
        println!("Next steps:");
        println!("   1. Edit the config file and add your translation and search API keys");
        println!("   2. Run 'yatra chat' to start a conversation");
        println!();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_parses_with_defaults() {
        let raw = r#"{
            "providers": {
                "translation": {"api_key": "t"},
                "search": {"api_key": "s"}
            }
        }"#;

        let config: Config = serde_json::from_str(raw).unwrap();
        assert_eq!(config.database.file, "sessions.db");
        assert_eq!(config.engine.agent_timeout_secs, 20);
        assert_eq!(config.engine.turn_deadline_secs, 60);
        assert!(config.providers.translation.base_url.is_none());
    }
}
