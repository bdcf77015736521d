//! Terminal client for the relaychat server.
//!
//! - [`input`]: turns typed lines into outbound frames
//! - [`inbound`]: turns server frames into display lines (and downloads)
//! - [`session`]: connection loop tying both to a WebSocket
//! - [`target`]: server address, adjustable while disconnected

pub mod inbound;
pub mod input;
pub mod session;
pub mod target;
