//! Protocol modules (text lane + binary lane).
//!
//! - Text lane: JSON envelopes, or plain chat text when a frame is not one.
//! - Binary lane: envelopes carrying raw file bytes behind a small header.
//!
//! All parsers are panic-free: malformed input is reported as `RelayError`
//! (or, on the text lane, downgraded to chat) instead of panicking.

pub mod envelope;
pub mod frame;
pub mod text;

pub use envelope::{Command, Data, Envelope, Inbound};
