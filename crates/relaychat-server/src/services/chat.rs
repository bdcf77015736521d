use relaychat_core::error::{RelayError, Result};
use relaychat_core::protocol::{Command, Envelope};

use crate::realtime::{Outgoing, RealtimeCtx};

/// Sender shown on private messages from a session that never set a name.
pub const UNKNOWN_SENDER: &str = "(unknown)";

#[derive(Default)]
pub struct ChatService;

impl ChatService {
    pub fn new() -> Self {
        Self
    }

    pub async fn set_name(&self, ctx: &RealtimeCtx, env: &Envelope) -> Result<()> {
        let name = env
            .text()
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| RelayError::BadRequest("setName requires a non-empty name.".into()))?;

        ctx.registry().set_display_name(ctx.session_id(), name)?;
        tracing::debug!(session = ctx.session_id(), name, "display name set");
        Ok(())
    }

    pub async fn join(&self, ctx: &RealtimeCtx, env: &Envelope) -> Result<()> {
        let registry = ctx.registry();
        let room = match env.text() {
            Some(r) if !r.trim().is_empty() => r.to_string(),
            _ => registry.default_room().to_string(),
        };

        registry.join_room(ctx.session_id(), room.as_str())?;
        tracing::debug!(session = ctx.session_id(), %room, "joined room");
        Ok(())
    }

    pub async fn who(&self, ctx: &RealtimeCtx) -> Result<()> {
        let me = ctx.session()?;

        let mut names = Vec::new();
        ctx.registry().for_each_in_room(&me.room, |m| {
            if let Some(n) = &m.session.display_name {
                names.push(n.clone());
            }
        });

        ctx.reply(Envelope::new(Command::Who).with_list(names)).await
    }

    pub async fn pm(&self, ctx: &RealtimeCtx, env: &Envelope) -> Result<()> {
        let target = env
            .arg
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| RelayError::BadRequest("pm requires a target.".into()))?;
        let text = env
            .text()
            .ok_or_else(|| RelayError::BadRequest("pm requires a message.".into()))?;

        let recipients = ctx.registry().find_all_by_display_name(target);
        if recipients.is_empty() {
            tracing::debug!(session = ctx.session_id(), target, "pm target not connected; dropped");
            return Ok(());
        }

        let sender = ctx
            .session()?
            .display_name
            .unwrap_or_else(|| UNKNOWN_SENDER.to_string());
        let out = Outgoing::envelope(
            ctx.qos(),
            Envelope::new(Command::PrivateMessage)
                .with_arg(sender)
                .with_text(text),
        );
        ctx.send_to_members(recipients, out).await?;
        Ok(())
    }

    /// Room chat. Sender is included in the broadcast.
    pub async fn say(&self, ctx: &RealtimeCtx, text: &str) -> Result<()> {
        let me = ctx.session()?;
        let line = match &me.display_name {
            Some(name) => format!("{name}: {text}"),
            None => text.to_string(),
        };

        let n = ctx
            .publish_room(&me.room, Outgoing::text(ctx.qos(), line))
            .await?;
        tracing::trace!(session = me.id, room = %me.room, recipients = n, "chat broadcast");
        Ok(())
    }
}
