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

//! Durable session memory over SQLite.
//!
//! [`MemoryManager`] owns the three relations (sessions, messages,
//! agent outputs) and is the only stateful component of the system.
//! It also hands out per-session writer locks so concurrent turns on
//! the same session queue instead of interleaving.

mod manager;

pub use manager::MemoryManager;
