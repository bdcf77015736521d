//! Realtime runtime (egress engine) for the relay.
//!
//! SessionRegistry + QoS-based publish helpers.

pub mod core;
pub mod types;

pub use core::{
    Connection, Delivery, Member, RealtimeCore, RealtimeCtx, Session, SessionId, SessionRegistry,
};
pub use types::{Outgoing, Payload, PreparedMsg, QoS};
