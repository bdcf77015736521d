//! Sandboxed file storage used by the file service.

pub mod file_store;

pub use file_store::{DirFileStore, FileStore};
