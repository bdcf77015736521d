//! Filename sanitization shared by the server sandbox and client downloads.

use crate::error::{RelayError, Result};

/// Strip every directory component, keeping only the final segment.
///
/// Both `/` and `\` count as separators. The segment is kept as given,
/// surrounding whitespace included. Names that reduce to nothing, to
/// whitespace only, `.` or `..` are rejected.
pub fn sanitize(name: &str) -> Result<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();

    match base {
        _ if base.trim().is_empty() => Err(RelayError::BadRequest(format!("invalid filename: {name:?}"))),
        "." | ".." => Err(RelayError::BadRequest(format!("invalid filename: {name:?}"))),
        _ if base.contains('\0') => Err(RelayError::BadRequest("invalid filename".into())),
        _ => Ok(base.to_string()),
    }
}
