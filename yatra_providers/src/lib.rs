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

//! HTTP-backed implementations of the external capabilities: the
//! translation model and the travel web search.

mod retry;
mod search;
mod translator;

pub use retry::retry_with_backoff;
pub use search::ExaSearchClient;
pub use translator::GlmTranslator;
