//! Decode-once codec for the transport layer.
//!
//! - Text frames => envelope or plain chat
//! - Binary frames => byte-carrying envelope (panic-free `bytes::Buf` parsing)
//! - Ping/Pong/Close are surfaced for lifecycle management

use axum::extract::ws::Message;
use bytes::Bytes;

use relaychat_core::error::Result;
use relaychat_core::protocol::frame::decode_frame;
use relaychat_core::protocol::text::decode_text;
use relaychat_core::protocol::Inbound;

#[derive(Debug)]
pub enum Frame {
    Inbound { inbound: Inbound, bytes_len: usize },
    Ping(Vec<u8>),
    Pong(Vec<u8>),
    Close,
}

pub fn decode(msg: Message) -> Result<Frame> {
    match msg {
        Message::Text(s) => {
            let bytes_len = s.len();
            Ok(Frame::Inbound {
                inbound: decode_text(&s),
                bytes_len,
            })
        }
        Message::Binary(b) => {
            let bytes_len = b.len();
            let env = decode_frame(Bytes::from(b))?;
            Ok(Frame::Inbound {
                inbound: Inbound::Envelope(env),
                bytes_len,
            })
        }
        Message::Ping(v) => Ok(Frame::Ping(v)),
        Message::Pong(v) => Ok(Frame::Pong(v)),
        Message::Close(_) => Ok(Frame::Close),
    }
}
