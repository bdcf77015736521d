//! Transport layer (WebSocket).
//!
//! Exposes the WS upgrade handler and the codec that decodes each message
//! once before it reaches the dispatcher.

pub mod codec;
pub mod ws;
