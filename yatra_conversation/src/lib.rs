#![warn(
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

//! Turn orchestration for the travel assistant.
//!
//! One inbound message is one turn. The engine detects the language,
//! moves the text to the pivot representation, merges extracted
//! entities with what the session already knows, and either asks a
//! clarification question, fans out to the capability agents, or
//! answers a follow-up purely from cached results. All session writes
//! for a turn happen under that session's lock.

mod compose;
mod engine;
mod followup;
mod router;

pub use compose::ResponseComposer;
pub use engine::{
    EngineConfig, HealthReport, SessionSnapshot, TurnEngine, TurnRequest, TurnResponse,
};
pub use followup::{FollowupIntent, FollowupResolver, InfoQuery};
pub use router::{RouteDecision, SlotRouter};
