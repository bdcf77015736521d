use std::sync::Arc;

use relaychat_core::error::{RelayError, Result};
use relaychat_core::protocol::{Command, Envelope};

use crate::realtime::RealtimeCtx;
use crate::storage::FileStore;

pub struct FileService {
    store: Arc<dyn FileStore>,
}

impl FileService {
    pub fn new(store: Arc<dyn FileStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn FileStore> {
        &self.store
    }

    pub async fn list(&self, ctx: &RealtimeCtx) -> Result<()> {
        let names = self.store.list().await?;
        ctx.reply(Envelope::new(Command::FileList).with_list(names))
            .await
    }

    pub async fn upload(&self, ctx: &RealtimeCtx, env: &Envelope) -> Result<()> {
        let name = env.arg.as_deref().filter(|n| !n.is_empty());
        let bytes = env.bytes().filter(|b| !b.is_empty());
        let (name, bytes) = match (name, bytes) {
            (Some(n), Some(b)) => (n, b.clone()),
            _ => {
                return Err(RelayError::BadRequest(
                    "invalid upload (missing filename or data).".into(),
                ))
            }
        };

        let len = bytes.len();
        let stored = self.store.write(name, bytes).await?;
        tracing::debug!(session = ctx.session_id(), file = %stored, bytes = len, "upload acknowledged");
        ctx.reply_text(format!("Upload successful: {stored}")).await
    }

    pub async fn get(&self, ctx: &RealtimeCtx, env: &Envelope) -> Result<()> {
        let name = env
            .arg
            .as_deref()
            .filter(|n| !n.is_empty())
            .ok_or_else(|| RelayError::BadRequest("getFile requires a filename.".into()))?;

        let (stored, bytes) = self.store.read(name).await?;
        tracing::debug!(session = ctx.session_id(), file = %stored, bytes = bytes.len(), "serving file");
        ctx.reply(
            Envelope::new(Command::FileData)
                .with_arg(stored)
                .with_bytes(bytes),
        )
        .await
    }
}
