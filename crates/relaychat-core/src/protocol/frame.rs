//! Binary lane: envelopes whose payload is raw bytes.
//!
//! Layout (little-endian):
//! `v:u8 | cmd_len:u8 | cmd | arg_len:u16 | arg | payload...`
//!
//! Parsing rules:
//! - Never index (`buf[0]`); always use `Buf` and `remaining()` checks.
//! - Never `unwrap()` / `expect()` / `panic!()` in production paths.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{RelayError, Result};

use super::envelope::{Data, Envelope};

/// Binary lane version.
pub const FRAME_VERSION: u8 = 1;

/// Encode an envelope for the binary lane. Non-byte payloads are rejected.
pub fn encode_frame(env: &Envelope) -> Result<Bytes> {
    let cmd = env.command.as_deref().unwrap_or("");
    let arg = env.arg.as_deref().unwrap_or("");
    let payload = match &env.data {
        Some(Data::Bytes(b)) => b.clone(),
        None => Bytes::new(),
        Some(_) => {
            return Err(RelayError::Internal(
                "binary lane carries byte payloads only".into(),
            ))
        }
    };

    let cmd_len = u8::try_from(cmd.len())
        .map_err(|_| RelayError::BadRequest("command tag too long".into()))?;
    let arg_len = u16::try_from(arg.len())
        .map_err(|_| RelayError::BadRequest("argument too long".into()))?;

    let mut buf = BytesMut::with_capacity(4 + cmd.len() + arg.len() + payload.len());
    buf.put_u8(FRAME_VERSION);
    buf.put_u8(cmd_len);
    buf.put_slice(cmd.as_bytes());
    buf.put_u16_le(arg_len);
    buf.put_slice(arg.as_bytes());
    buf.put_slice(&payload);
    Ok(buf.freeze())
}

/// Decode a binary lane frame.
pub fn decode_frame(mut buf: Bytes) -> Result<Envelope> {
    // Minimum header: v, cmd_len, arg_len
    if buf.remaining() < 4 {
        return Err(RelayError::BadRequest("binary frame too short".into()));
    }

    let v = buf.get_u8();
    if v != FRAME_VERSION {
        return Err(RelayError::UnsupportedVersion);
    }

    let cmd_len = usize::from(buf.get_u8());
    let command = take_utf8(&mut buf, cmd_len, "command")?;

    if buf.remaining() < 2 {
        return Err(RelayError::BadRequest("binary frame missing arg length".into()));
    }
    let arg_len = usize::from(buf.get_u16_le());
    let arg = take_utf8(&mut buf, arg_len, "arg")?;

    // Remaining bytes are payload.
    let payload = buf.copy_to_bytes(buf.remaining());

    Ok(Envelope {
        command: (!command.is_empty()).then_some(command),
        arg: (!arg.is_empty()).then_some(arg),
        data: Some(Data::Bytes(payload)),
    })
}

fn take_utf8(buf: &mut Bytes, len: usize, what: &str) -> Result<String> {
    if buf.remaining() < len {
        return Err(RelayError::BadRequest(format!("binary frame truncated in {what}")));
    }
    let raw = buf.copy_to_bytes(len);
    String::from_utf8(raw.to_vec())
        .map_err(|_| RelayError::BadRequest(format!("binary frame {what} is not utf-8")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::envelope::Command;

    #[test]
    fn upload_frame_keeps_name_and_bytes() {
        let env = Envelope::new(Command::UploadFile)
            .with_arg("notes.txt")
            .with_bytes(Bytes::from_static(b"\x00\x01hello"));
        let wire = encode_frame(&env).unwrap_or_default();
        assert_eq!(wire.len(), 4 + "uploadFile".len() + "notes.txt".len() + 7);

        let back = decode_frame(wire).map_err(|e| e.to_string());
        assert_eq!(back, Ok(env));
    }

    #[test]
    fn text_payload_cannot_use_binary_lane() {
        let env = Envelope::new(Command::Pm).with_text("hi");
        assert!(encode_frame(&env).is_err());
    }

    #[test]
    fn empty_arg_decodes_as_absent() {
        let env = Envelope::new(Command::FileData).with_bytes(Bytes::from_static(b"z"));
        let back = encode_frame(&env).and_then(decode_frame).map_err(|e| e.to_string());
        assert_eq!(back.map(|e| e.arg), Ok(None));
    }
}
