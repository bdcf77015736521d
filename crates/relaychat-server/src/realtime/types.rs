use axum::extract::ws::Message;
use bytes::Bytes;

use relaychat_core::error::Result;
use relaychat_core::protocol::frame::encode_frame;
use relaychat_core::protocol::text::encode_text;
use relaychat_core::protocol::Envelope;

/// Quality-of-Service strategy for outgoing delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QoS {
    /// Do not await; if the session's queue is full, drop.
    Lossy,
    /// Await queue space, giving up after `timeout_ms`.
    Reliable { timeout_ms: u64 },
}

impl Default for QoS {
    fn default() -> Self {
        QoS::Lossy
    }
}

impl QoS {
    /// `0` selects lossy delivery.
    pub fn from_timeout_ms(timeout_ms: u64) -> Self {
        if timeout_ms == 0 {
            QoS::Lossy
        } else {
            QoS::Reliable { timeout_ms }
        }
    }
}

/// Outgoing payload variants.
#[derive(Debug, Clone)]
pub enum Payload {
    /// Plain text: chat lines, acknowledgements and error notices.
    Text(String),
    /// Tagged envelope; byte payloads go out on the binary lane.
    Envelope(Envelope),
}

/// Application-level outgoing message.
#[derive(Debug, Clone)]
pub struct Outgoing {
    pub qos: QoS,
    pub payload: Payload,
}

impl Outgoing {
    pub fn text(qos: QoS, text: impl Into<String>) -> Self {
        Self {
            qos,
            payload: Payload::Text(text.into()),
        }
    }

    pub fn envelope(qos: QoS, env: Envelope) -> Self {
        Self {
            qos,
            payload: Payload::Envelope(env),
        }
    }
}

/// Prepared message cached for broadcasting (serialize once, send N times).
#[derive(Debug, Clone)]
pub enum PreparedMsg {
    Text(String),
    Binary(Bytes),
}

impl PreparedMsg {
    pub fn prepare(out: &Outgoing) -> Result<Self> {
        match &out.payload {
            Payload::Text(s) => Ok(PreparedMsg::Text(s.clone())),
            Payload::Envelope(env) if env.carries_bytes() => {
                Ok(PreparedMsg::Binary(encode_frame(env)?))
            }
            Payload::Envelope(env) => Ok(PreparedMsg::Text(encode_text(env)?)),
        }
    }

    /// Convert to axum::ws::Message for transport.
    /// NOTE: axum::Message::Binary requires Vec<u8>, so Binary path clones into Vec.
    pub fn to_ws_message(&self) -> Message {
        match self {
            PreparedMsg::Text(s) => Message::Text(s.clone()),
            PreparedMsg::Binary(b) => Message::Binary(b.to_vec()),
        }
    }
}
