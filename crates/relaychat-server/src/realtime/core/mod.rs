//! Realtime core components for the relay runtime.
//!
//! Session registry and the egress runtime/context shared across services.

mod realtime;
mod session_registry;

pub use realtime::{Delivery, RealtimeCore, RealtimeCtx};
pub use session_registry::{Connection, Member, Session, SessionId, SessionRegistry};
