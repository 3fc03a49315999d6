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

//! Capability agents: one handler per travel service behind the
//! uniform [`yatra_core::CapabilityAgent`] contract, plus the static
//! registry the router dispatches through.

mod booking;
mod registry;
mod search_agent;

pub use booking::BookingAgent;
pub use registry::AgentRegistry;
pub use search_agent::SearchAgent;
