//! Built-in command handlers.
//!
//! - [`ChatService`]: names, rooms, roster, private messages, room chat.
//! - [`FileService`]: upload, list and download against a [`crate::storage::FileStore`].

mod chat;
mod files;

pub use chat::{ChatService, UNKNOWN_SENDER};
pub use files::FileService;
