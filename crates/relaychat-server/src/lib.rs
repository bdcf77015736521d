//! relaychat server library entry.
//!
//! This crate wires the transport, dispatcher, realtime core, file storage
//! and built-in services into the relay. It is consumed by the binary
//! (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod dispatch;
pub mod ops;
pub mod realtime;
pub mod router;
pub mod services;
pub mod storage;
pub mod transport;
