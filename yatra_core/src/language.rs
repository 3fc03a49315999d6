//! The external translation capability seam.
//!
//! Detection and translation are one opaque provider; the engine only
//! relies on the declared contract and degrades when it misbehaves.

use async_trait::async_trait;

/// Result of language detection.
#[derive(Debug, Clone)]
pub struct Detection {
    /// ISO 639-1 code, e.g. `en`, `hi`, `ta`.
    pub language: String,
    /// Provider confidence in `[0, 1]`.
    pub confidence: f32,
}

impl Detection {
    #[must_use]
    pub fn english() -> Self {
        Self {
            language: "en".to_string(),
            confidence: 1.0,
        }
    }
}

#[async_trait]
pub trait TranslationProvider: Send + Sync {
    async fn detect(&self, text: &str) -> anyhow::Result<Detection>;

    /// Translate `text` from `from` into `to`. Implementations should
    /// be the identity when `from == to`.
    async fn translate(&self, text: &str, from: &str, to: &str) -> anyhow::Result<String>;
}
