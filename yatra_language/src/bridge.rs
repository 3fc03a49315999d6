//! Pivot translation with graceful degradation.

use std::sync::Arc;

use tracing::{debug, warn};

use yatra_core::{TranslationProvider, TurnWarning};

/// The canonical internal language. All extraction and routing logic
/// operates on pivot text only.
pub const PIVOT_LANGUAGE: &str = "en";

const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.5;

/// Detects the language of an utterance and translates text to and
/// from the pivot representation.
///
/// Provider faults never fail a turn: detection falls back to the
/// session's known language (or English) and translation falls back to
/// the untouched input, each with a warning attached.
pub struct LanguageBridge {
    provider: Arc<dyn TranslationProvider>,
    confidence_threshold: f32,
}

impl LanguageBridge {
    #[must_use]
    pub fn new(provider: Arc<dyn TranslationProvider>) -> Self {
        Self {
            provider,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }

    #[must_use]
    pub const fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Detect the utterance language.
    ///
    /// `fallback` is the session's previously detected language, used
    /// when the provider is unsure or unreachable.
    pub async fn detect(&self, text: &str, fallback: Option<&str>) -> (String, Vec<TurnWarning>) {
        match self.provider.detect(text).await {
            Ok(detection) if detection.confidence >= self.confidence_threshold => {
                debug!(
                    "Detected language {} (confidence {:.2})",
                    detection.language, detection.confidence
                );
                (detection.language, Vec::new())
            }
            Ok(detection) => {
                let chosen = fallback.unwrap_or(PIVOT_LANGUAGE).to_string();
                warn!(
                    "Low-confidence detection ({} at {:.2}), using {}",
                    detection.language, detection.confidence, chosen
                );
                (chosen, vec![TurnWarning::LowConfidenceDetection])
            }
            Err(e) => {
                let chosen = fallback.unwrap_or(PIVOT_LANGUAGE).to_string();
                warn!("Language detection failed: {e}, using {}", chosen);
                (chosen, vec![TurnWarning::LowConfidenceDetection])
            }
        }
    }

    /// Translate an utterance into pivot text.
    pub async fn to_pivot(&self, text: &str, language: &str) -> (String, Vec<TurnWarning>) {
        self.translate(text, language, PIVOT_LANGUAGE).await
    }

    /// Translate pivot text back into the user's language.
    pub async fn from_pivot(&self, text: &str, language: &str) -> (String, Vec<TurnWarning>) {
        self.translate(text, PIVOT_LANGUAGE, language).await
    }

    async fn translate(&self, text: &str, from: &str, to: &str) -> (String, Vec<TurnWarning>) {
        if from == to {
            return (text.to_string(), Vec::new());
        }

        match self.provider.translate(text, from, to).await {
            Ok(translated) => (translated, Vec::new()),
            Err(e) => {
                warn!("Translation {from}->{to} failed: {e}, passing text through");
                (text.to_string(), vec![TurnWarning::TranslationDegraded])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use yatra_core::Detection;

    /// Provider that reverses words on the way in and back out, so a
    /// lossless round trip is observable.
    struct MirrorProvider;

    #[async_trait]
    impl TranslationProvider for MirrorProvider {
        async fn detect(&self, _text: &str) -> anyhow::Result<Detection> {
            Ok(Detection {
                language: "hi".to_string(),
                confidence: 0.95,
            })
        }

        async fn translate(&self, text: &str, _from: &str, _to: &str) -> anyhow::Result<String> {
            Ok(text.chars().rev().collect())
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl TranslationProvider for FailingProvider {
        async fn detect(&self, _text: &str) -> anyhow::Result<Detection> {
            anyhow::bail!("provider down")
        }

        async fn translate(&self, _text: &str, _from: &str, _to: &str) -> anyhow::Result<String> {
            anyhow::bail!("provider down")
        }
    }

    struct UnsureProvider;

    #[async_trait]
    impl TranslationProvider for UnsureProvider {
        async fn detect(&self, _text: &str) -> anyhow::Result<Detection> {
            Ok(Detection {
                language: "ta".to_string(),
                confidence: 0.1,
            })
        }

        async fn translate(&self, text: &str, _from: &str, _to: &str) -> anyhow::Result<String> {
            Ok(text.to_string())
        }
    }

    #[tokio::test]
    async fn round_trip_is_identity_with_lossless_provider() {
        let bridge = LanguageBridge::new(Arc::new(MirrorProvider));

        let original = "मुझे दिल्ली के लिए फ्लाइट चाहिए";
        let (pivot, warnings) = bridge.to_pivot(original, "hi").await;
        assert!(warnings.is_empty());

        let (back, warnings) = bridge.from_pivot(&pivot, "hi").await;
        assert!(warnings.is_empty());
        assert_eq!(back, original);
    }

    #[tokio::test]
    async fn english_skips_the_provider() {
        let bridge = LanguageBridge::new(Arc::new(FailingProvider));

        let (pivot, warnings) = bridge.to_pivot("flight to Delhi", "en").await;
        assert_eq!(pivot, "flight to Delhi");
        assert!(warnings.is_empty());
    }

    #[tokio::test]
    async fn provider_failure_degrades_not_fails() {
        let bridge = LanguageBridge::new(Arc::new(FailingProvider));

        let (lang, warnings) = bridge.detect("hello", None).await;
        assert_eq!(lang, "en");
        assert_eq!(warnings, vec![TurnWarning::LowConfidenceDetection]);

        let (text, warnings) = bridge.from_pivot("some answer", "hi").await;
        assert_eq!(text, "some answer");
        assert_eq!(warnings, vec![TurnWarning::TranslationDegraded]);
    }

    #[tokio::test]
    async fn low_confidence_prefers_session_language() {
        let bridge = LanguageBridge::new(Arc::new(UnsureProvider));

        let (lang, warnings) = bridge.detect("hello", Some("mr")).await;
        assert_eq!(lang, "mr");
        assert_eq!(warnings, vec![TurnWarning::LowConfidenceDetection]);

        let (lang, _) = bridge.detect("hello", None).await;
        assert_eq!(lang, "en");
    }
}
