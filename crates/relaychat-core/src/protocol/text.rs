//! Text lane (JSON envelopes and plain chat).
//!
//! A text frame is an envelope only when it parses as one; anything else is
//! chat text and is passed through untouched.

use crate::error::{RelayError, Result};

use super::envelope::{Envelope, Inbound};

/// Classify a text frame. Never fails: malformed JSON is chat.
pub fn decode_text(s: &str) -> Inbound {
    if !s.trim_start().starts_with('{') {
        return Inbound::Chat(s.to_string());
    }
    match serde_json::from_str::<Envelope>(s) {
        Ok(env) => Inbound::Envelope(env),
        Err(e) => {
            tracing::trace!(error = %e, "text frame is not an envelope; treating as chat");
            Inbound::Chat(s.to_string())
        }
    }
}

/// Serialize an envelope for the text lane.
pub fn encode_text(env: &Envelope) -> Result<String> {
    serde_json::to_string(env)
        .map_err(|e| RelayError::Internal(format!("json encode failed: {e}")))
}
