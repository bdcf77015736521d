//! Server address the client connects to.

use std::fmt;

use tokio_tungstenite::tungstenite::http::Uri;

use relaychat_core::error::{RelayError, Result};

/// WebSocket endpoint split into the parts `#setHost` / `#setPort` change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    scheme: String,
    host: String,
    port: u16,
    path: String,
}

impl Target {
    pub fn parse(url: &str) -> Result<Self> {
        let uri: Uri = url
            .parse()
            .map_err(|e| RelayError::BadRequest(format!("invalid server url {url:?}: {e}")))?;

        let scheme = uri.scheme_str().unwrap_or("ws").to_string();
        let host = uri
            .host()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| RelayError::BadRequest(format!("server url has no host: {url:?}")))?
            .to_string();
        let port = uri
            .port_u16()
            .unwrap_or(if scheme == "wss" { 443 } else { 80 });
        let path = uri
            .path_and_query()
            .map(|p| p.as_str())
            .filter(|p| !p.is_empty())
            .unwrap_or("/")
            .to_string();

        Ok(Self {
            scheme,
            host,
            port,
            path,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn set_host(&mut self, host: impl Into<String>) {
        self.host = host.into();
    }

    pub fn set_port(&mut self, port: u16) {
        self.port = port;
    }

    pub fn url(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}{}", self.scheme, self.host, self.port, self.path)
    }
}
