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

//! Shared domain types and trait seams for the travel assistant core.
//!
//! Everything stateful or external hides behind a trait defined here:
//! the session store, the translation capability, and the search
//! capability. The orchestration engine depends only on these seams.

use serde::{Deserialize, Serialize};

pub mod capability;
pub mod error;
pub mod intent;
pub mod language;
pub mod state;
pub mod store;

pub use capability::{
    BookingConfirmation, CapabilityAgent, Offer, OutputKind, SearchProvider, SearchResult,
    TravelerInfo,
};
pub use error::{EngineError, TurnWarning};
pub use intent::{EntitySlots, ServiceType, SlotKey};
pub use language::{Detection, TranslationProvider};
pub use state::ConversationState;
pub use store::{AgentOutputRecord, MessageRecord, SessionRecord, SessionStats, SessionStore};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    #[must_use]
    pub fn from_str_lowercase(s: &str) -> Self {
        match s {
            "assistant" => Self::Assistant,
            _ => Self::User,
        }
    }
}
