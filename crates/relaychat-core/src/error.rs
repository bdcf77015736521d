//! Shared error type across relaychat crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed command.
    BadRequest,
    /// Requested file (or session) does not exist.
    NotFound,
    /// Upload exceeds the configured limit.
    PayloadTooLarge,
    /// Server-side filesystem failure.
    Storage,
    /// Recipient transport already gone.
    PeerUnreachable,
    /// Unsupported frame version.
    UnsupportedVersion,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in logs and config errors.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::NotFound => "NOT_FOUND",
            ClientCode::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ClientCode::Storage => "STORAGE",
            ClientCode::PeerUnreachable => "PEER_UNREACHABLE",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, RelayError>;

/// Unified error type used by core, server and client.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("{0}")]
    BadRequest(String),
    #[error("file not found: {0}")]
    NotFound(String),
    #[error("upload exceeds maximum size ({limit} bytes).")]
    PayloadTooLarge { limit: u64 },
    #[error("{0}")]
    Storage(String),
    #[error("peer unreachable: {0}")]
    PeerUnreachable(String),
    #[error("unsupported frame version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl RelayError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            RelayError::BadRequest(_) => ClientCode::BadRequest,
            RelayError::NotFound(_) => ClientCode::NotFound,
            RelayError::PayloadTooLarge { .. } => ClientCode::PayloadTooLarge,
            RelayError::Storage(_) => ClientCode::Storage,
            RelayError::PeerUnreachable(_) => ClientCode::PeerUnreachable,
            RelayError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            RelayError::Internal(_) => ClientCode::Internal,
        }
    }

    /// Human-readable notice sent back to the originating user.
    pub fn notice(&self) -> String {
        format!("Error: {self}")
    }
}
