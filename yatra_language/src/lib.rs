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

//! Language handling for the travel assistant.
//!
//! [`LanguageBridge`] moves text between the user's language and the
//! English pivot representation, degrading instead of failing when the
//! translation capability misbehaves. [`EntityExtractor`] reads the
//! pivot text into a partial travel intent so routing stays
//! language-agnostic.

mod bridge;
mod extract;

pub use bridge::{LanguageBridge, PIVOT_LANGUAGE};
pub use extract::{EntityExtractor, Extraction};
