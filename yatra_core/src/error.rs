//! Caller-visible error taxonomy.
//!
//! Only two faults escape the engine: an unknown session id and an
//! unusable store. Everything else (low-confidence detection, provider
//! outages, missing slots, missing booking details) degrades into the
//! response itself.

use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

/// Non-fatal conditions surfaced in the response instead of failing
/// the turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnWarning {
    LowConfidenceDetection,
    TranslationDegraded,
    ProviderUnavailable,
}

impl TurnWarning {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LowConfidenceDetection => "low_confidence_detection",
            Self::TranslationDegraded => "translation_degraded",
            Self::ProviderUnavailable => "provider_unavailable",
        }
    }
}

impl std::fmt::Display for TurnWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("session storage unavailable: {0}")]
    Storage(#[source] anyhow::Error),
}

impl EngineError {
    pub fn storage(err: impl Into<anyhow::Error>) -> Self {
        Self::Storage(err.into())
    }
}
