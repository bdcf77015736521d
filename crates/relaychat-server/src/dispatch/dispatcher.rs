use relaychat_core::error::Result;
use relaychat_core::protocol::{Command, Envelope, Inbound};

use crate::realtime::RealtimeCtx;
use crate::services::{ChatService, FileService};

/// Routes decoded inbound units to the built-in services.
///
/// Holds no per-session state: sessions live in the registry reachable
/// through [`RealtimeCtx`], files live behind the store owned by
/// [`FileService`].
pub struct Dispatcher {
    chat: ChatService,
    files: FileService,
}

impl Dispatcher {
    pub fn new(chat: ChatService, files: FileService) -> Self {
        Self { chat, files }
    }

    pub fn files(&self) -> &FileService {
        &self.files
    }

    /// Handle one inbound unit. Failures are reported to the originating
    /// session as a text notice and never propagate further.
    pub async fn dispatch(&self, ctx: RealtimeCtx, inbound: Inbound) {
        let res = match &inbound {
            Inbound::Chat(text) => self.chat.say(&ctx, text).await,
            Inbound::Envelope(env) => self.dispatch_envelope(&ctx, env).await,
        };

        if let Err(e) = res {
            tracing::debug!(
                session = ctx.session_id(),
                code = e.client_code().as_str(),
                error = %e,
                "command failed"
            );
            if let Err(send_err) = ctx.reply_text(e.notice()).await {
                tracing::warn!(session = ctx.session_id(), error = %send_err, "failed to deliver error notice");
            }
        }
    }

    async fn dispatch_envelope(&self, ctx: &RealtimeCtx, env: &Envelope) -> Result<()> {
        let Some(cmd) = env.command() else {
            tracing::debug!(
                session = ctx.session_id(),
                tag = env.command.as_deref().unwrap_or("null"),
                "ignoring unrecognized command"
            );
            return Ok(());
        };

        match cmd {
            Command::SetName => self.chat.set_name(ctx, env).await,
            Command::Join => self.chat.join(ctx, env).await,
            Command::Who => self.chat.who(ctx).await,
            Command::Pm => self.chat.pm(ctx, env).await,
            Command::ListFiles => self.files.list(ctx).await,
            Command::UploadFile => self.files.upload(ctx, env).await,
            Command::GetFile => self.files.get(ctx, env).await,
            Command::FileList | Command::FileData | Command::PrivateMessage => {
                tracing::debug!(session = ctx.session_id(), %cmd, "ignoring server-only command");
                Ok(())
            }
        }
    }
}
