use std::path::PathBuf;

use serde::Deserialize;
use relaychat_core::error::{RelayError, Result};

/// Hard ceiling for `files.max_upload_bytes` (256 MiB).
pub const UPLOAD_CEILING_BYTES: u64 = 256 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelayConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub rooms: RoomsSection,

    #[serde(default)]
    pub files: FilesSection,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            rooms: RoomsSection::default(),
            files: FilesSection::default(),
        }
    }
}

impl RelayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(RelayError::UnsupportedVersion);
        }

        self.server.validate()?;
        self.rooms.validate()?;
        self.files.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_ping_interval_ms")]
    pub ping_interval_ms: u64,

    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,

    /// Per-session outbound queue depth.
    #[serde(default = "default_outbound_queue")]
    pub outbound_queue: usize,

    /// 0 = lossy delivery (drop when a queue is full).
    #[serde(default = "default_send_timeout_ms")]
    pub send_timeout_ms: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            ping_interval_ms: default_ping_interval_ms(),
            idle_timeout_ms: default_idle_timeout_ms(),
            outbound_queue: default_outbound_queue(),
            send_timeout_ms: default_send_timeout_ms(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        if !(5000..=120000).contains(&self.ping_interval_ms) {
            return Err(RelayError::BadRequest(
                "server.ping_interval_ms must be between 5000 and 120000".into(),
            ));
        }
        if !(10000..=600000).contains(&self.idle_timeout_ms) {
            return Err(RelayError::BadRequest(
                "server.idle_timeout_ms must be between 10000 and 600000".into(),
            ));
        }
        if self.idle_timeout_ms <= self.ping_interval_ms {
            return Err(RelayError::BadRequest(
                "server.idle_timeout_ms must be greater than ping_interval_ms".into(),
            ));
        }
        if self.outbound_queue == 0 {
            return Err(RelayError::BadRequest(
                "server.outbound_queue must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:5555".into()
}
fn default_ping_interval_ms() -> u64 {
    20000
}
fn default_idle_timeout_ms() -> u64 {
    60000
}
fn default_outbound_queue() -> usize {
    256
}
fn default_send_timeout_ms() -> u64 {
    1500
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoomsSection {
    /// Room every session starts in, and the fallback for an empty `join`.
    #[serde(default = "default_room")]
    pub default_room: String,
}

impl Default for RoomsSection {
    fn default() -> Self {
        Self {
            default_room: default_room(),
        }
    }
}

impl RoomsSection {
    pub fn validate(&self) -> Result<()> {
        if self.default_room.trim().is_empty() {
            return Err(RelayError::BadRequest(
                "rooms.default_room must not be empty".into(),
            ));
        }
        Ok(())
    }
}

fn default_room() -> String {
    "commons".into()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilesSection {
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,

    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
}

impl Default for FilesSection {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl FilesSection {
    pub fn validate(&self) -> Result<()> {
        if self.upload_dir.as_os_str().is_empty() {
            return Err(RelayError::BadRequest(
                "files.upload_dir must not be empty".into(),
            ));
        }
        if !(1..=UPLOAD_CEILING_BYTES).contains(&self.max_upload_bytes) {
            return Err(RelayError::BadRequest(format!(
                "files.max_upload_bytes must be between 1 and {UPLOAD_CEILING_BYTES}"
            )));
        }
        Ok(())
    }
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}
fn default_max_upload_bytes() -> u64 {
    10 * 1024 * 1024
}
