//! Translation and language detection over a GLM chat-completions API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, info};

use yatra_core::{Detection, TranslationProvider};

use crate::retry::retry_with_backoff;

const DEFAULT_BASE_URL: &str = "https://open.bigmodel.cn/api/paas/v4";
const DEFAULT_MODEL: &str = "glm-4-flash";
const RETRY_DELAYS: [Duration; 3] = [
    Duration::from_secs(1),
    Duration::from_secs(2),
    Duration::from_secs(4),
];

pub struct GlmTranslator {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GlmTranslator {
    #[must_use]
    pub fn new(api_key: String) -> Self {
        info!("Creating GlmTranslator");
        Self {
            client: Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    async fn complete(&self, system: &str, user: &str) -> anyhow::Result<String> {
        let request = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
        });

        let send = || async {
            let response = self
                .client
                .post(format!("{}/chat/completions", self.base_url))
                .bearer_auth(&self.api_key)
                .json(&request)
                .send()
                .await?
                .error_for_status()?
                .json::<serde_json::Value>()
                .await?;

            response["choices"][0]["message"]["content"]
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| anyhow::anyhow!("Invalid response format: missing content"))
        };

        retry_with_backoff(send, &RETRY_DELAYS).await
    }
}

/// Pull a JSON object out of a model reply that may wrap it in prose
/// or a markdown code fence.
fn extract_json(text: &str) -> Option<serde_json::Value> {
    if let Ok(value) = serde_json::from_str(text.trim()) {
        return Some(value);
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    serde_json::from_str(&text[start..=end]).ok()
}

#[async_trait]
impl TranslationProvider for GlmTranslator {
    async fn detect(&self, text: &str) -> anyhow::Result<Detection> {
        debug!("Detecting language via GLM");

        let reply = self
            .complete(
                "You are a language identification service. Reply with only a JSON object \
                 {\"language\": \"<iso 639-1 code>\", \"confidence\": <0..1>}.",
                text,
            )
            .await?;

        let value = extract_json(&reply)
            .ok_or_else(|| anyhow::anyhow!("Invalid detection reply: no JSON found"))?;

        let language = value["language"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Invalid detection reply: missing language"))?
            .to_lowercase();

        #[allow(clippy::cast_possible_truncation)]
        let confidence = value["confidence"].as_f64().unwrap_or(0.0) as f32;

        Ok(Detection {
            language,
            confidence,
        })
    }

    async fn translate(&self, text: &str, from: &str, to: &str) -> anyhow::Result<String> {
        if from == to {
            return Ok(text.to_string());
        }

        debug!("Translating {from} -> {to} via GLM");

        let system = format!(
            "Translate the user's message from {from} to {to}. Preserve names, numbers, \
             currency symbols, dates and times exactly. Reply with the translation only."
        );

        self.complete(&system, text).await
    }
}
