//! relaychat core: transport-agnostic envelope model, wire codecs, filename
//! policy and the shared error type.
//!
//! Used by both the server and the terminal client. It carries no transport
//! or runtime dependencies.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths surface as `RelayError`/`Result` so a hostile frame
//! cannot bring a connection task down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod filename;
pub mod protocol;

/// Shared result type.
pub use error::{Result, RelayError};
