//! Server frame interpretation.

use std::path::Path;

use bytes::Bytes;
use tokio::fs;

use relaychat_core::error::{RelayError, Result};
use relaychat_core::filename::sanitize;
use relaychat_core::protocol::frame::decode_frame;
use relaychat_core::protocol::text::decode_text;
use relaychat_core::protocol::{Command, Envelope, Inbound};

pub const WHO_HEADER: &str = "--- users in room ---";
pub const NO_USERS: &str = "(no users found)";

/// One data frame from the server.
#[derive(Debug, Clone)]
pub enum ServerFrame {
    Text(String),
    Binary(Bytes),
}

/// Turn a server frame into display lines. `fileData` payloads are written
/// under `downloads`, which is created when missing.
pub async fn render(frame: ServerFrame, downloads: &Path) -> Vec<String> {
    let env = match frame {
        ServerFrame::Text(s) => match decode_text(&s) {
            Inbound::Chat(line) => return vec![line],
            Inbound::Envelope(env) => env,
        },
        ServerFrame::Binary(b) => match decode_frame(b) {
            Ok(env) => env,
            Err(e) => return vec![format!("Error: unreadable frame from server: {e}")],
        },
    };
    render_envelope(env, downloads).await
}

async fn render_envelope(env: Envelope, downloads: &Path) -> Vec<String> {
    let Some(cmd) = env.command() else {
        tracing::debug!(tag = ?env.command, "ignoring unknown envelope");
        return Vec::new();
    };

    match cmd {
        Command::Who => {
            let names = env.data.as_ref().and_then(|d| d.as_list()).unwrap_or(&[]);
            let mut lines = vec![WHO_HEADER.to_string()];
            if names.is_empty() {
                lines.push(NO_USERS.to_string());
            } else {
                lines.extend(names.iter().cloned());
            }
            lines
        }
        Command::PrivateMessage => {
            let from = env.arg.as_deref().unwrap_or("(unknown)");
            vec![format!("PM from {from}: {}", env.text().unwrap_or(""))]
        }
        Command::FileList => {
            let names = env.data.as_ref().and_then(|d| d.as_list()).unwrap_or(&[]);
            if names.is_empty() {
                vec!["Files: (none)".to_string()]
            } else {
                vec![format!("Files: {}", names.join(", "))]
            }
        }
        Command::FileData => match save_download(&env, downloads).await {
            Ok(name) => vec![format!("Downloaded file to {}/{name}", downloads.display())],
            Err(e) => vec![e.notice()],
        },
        _ => {
            tracing::debug!(%cmd, "ignoring client-only envelope");
            Vec::new()
        }
    }
}

async fn save_download(env: &Envelope, downloads: &Path) -> Result<String> {
    let (name, bytes) = match (env.arg.as_deref(), env.bytes()) {
        (Some(n), Some(b)) => (sanitize(n)?, b),
        _ => return Err(RelayError::BadRequest("invalid fileData response from server.".into())),
    };

    fs::create_dir_all(downloads)
        .await
        .map_err(|e| RelayError::Storage(format!("could not create downloads directory ({e}).")))?;
    fs::write(downloads.join(&name), bytes)
        .await
        .map_err(|e| RelayError::Storage(format!("could not save downloaded file ({e}).")))?;
    Ok(name)
}
