//! Shared application state for the relay server.
//!
//! Wires the session registry, egress core, file store and dispatcher.
//! Everything is handed out by `Arc`; nothing here is global.

use std::sync::Arc;

use relaychat_core::error::Result;

use crate::config::RelayConfig;
use crate::dispatch::Dispatcher;
use crate::realtime::{RealtimeCore, SessionRegistry};
use crate::services::{ChatService, FileService};
use crate::storage::{DirFileStore, FileStore};
use crate::transport::ws::{FRAME_HEADROOM_BYTES, FRAME_LIMIT_FACTOR};

#[derive(Clone)]
pub struct AppState {
    cfg: Arc<RelayConfig>,
    realtime: Arc<RealtimeCore>,
    dispatcher: Arc<Dispatcher>,
}

impl AppState {
    /// Build application state backed by the configured upload directory.
    pub fn new(cfg: RelayConfig) -> Result<Self> {
        let store = Arc::new(DirFileStore::new(
            cfg.files.upload_dir.clone(),
            cfg.files.max_upload_bytes,
        ));
        Self::with_store(cfg, store)
    }

    /// Build application state over any store.
    pub fn with_store(cfg: RelayConfig, store: Arc<dyn FileStore>) -> Result<Self> {
        cfg.validate()?;

        let sessions = Arc::new(SessionRegistry::new(cfg.rooms.default_room.clone()));
        let realtime = Arc::new(RealtimeCore::new(sessions));
        let dispatcher = Dispatcher::new(ChatService::new(), FileService::new(store));

        Ok(Self {
            cfg: Arc::new(cfg),
            realtime,
            dispatcher: Arc::new(dispatcher),
        })
    }

    pub fn cfg(&self) -> &RelayConfig {
        &self.cfg
    }

    pub fn realtime(&self) -> Arc<RealtimeCore> {
        Arc::clone(&self.realtime)
    }

    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        Arc::clone(&self.dispatcher)
    }

    /// Largest WebSocket message read from a client.
    pub fn max_frame_bytes(&self) -> usize {
        usize::try_from(self.cfg.files.max_upload_bytes)
            .unwrap_or(usize::MAX)
            .saturating_mul(FRAME_LIMIT_FACTOR)
            .saturating_add(FRAME_HEADROOM_BYTES)
    }
}
