//! Conversation state machine.
//!
//! New-query track: `Collecting -> Ready -> Dispatched -> Answered`.
//! Follow-up track: `Followup -> Booking -> Answered`. `Answered` ends
//! the turn, not the session; the next message re-enters one of the
//! tracks.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationState {
    #[default]
    Collecting,
    Ready,
    Dispatched,
    Answered,
    Followup,
    Booking,
}

impl ConversationState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Collecting => "collecting",
            Self::Ready => "ready",
            Self::Dispatched => "dispatched",
            Self::Answered => "answered",
            Self::Followup => "followup",
            Self::Booking => "booking",
        }
    }

    #[must_use]
    pub fn from_str_lowercase(s: &str) -> Self {
        match s {
            "ready" => Self::Ready,
            "dispatched" => Self::Dispatched,
            "answered" => Self::Answered,
            "followup" => Self::Followup,
            "booking" => Self::Booking,
            _ => Self::Collecting,
        }
    }

    /// Whether the turn that produced this state has finished.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Answered)
    }
}

impl std::fmt::Display for ConversationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
