//! Relay config loader (strict parsing).

pub mod schema;

use std::{fs, io, path::Path};

use relaychat_core::error::{RelayError, Result};

pub use schema::{FilesSection, RelayConfig, RoomsSection, ServerSection};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "RELAYCHAT_CONFIG";
/// Config file used when the environment variable is unset.
pub const DEFAULT_CONFIG_PATH: &str = "relaychat.yaml";

pub fn load_from_file(path: impl AsRef<Path>) -> Result<RelayConfig> {
    let s = fs::read_to_string(path.as_ref())
        .map_err(|e| RelayError::Internal(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<RelayConfig> {
    let cfg: RelayConfig = serde_yaml::from_str(s)
        .map_err(|e| RelayError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load from `$RELAYCHAT_CONFIG` or `relaychat.yaml`; a missing default file
/// means built-in defaults.
pub fn load_default() -> Result<RelayConfig> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return load_from_file(path);
    }
    match fs::metadata(DEFAULT_CONFIG_PATH) {
        Ok(_) => load_from_file(DEFAULT_CONFIG_PATH),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::info!(path = DEFAULT_CONFIG_PATH, "no config file; using defaults");
            Ok(RelayConfig::default())
        }
        Err(e) => Err(RelayError::Internal(format!("stat config failed: {e}"))),
    }
}
