//! Envelope model shared by both lanes.
//!
//! An envelope is a command tag plus an optional argument and an opaque
//! payload. Receivers branch on [`Envelope::command`] to know how to read
//! `arg` and `data`; a missing or unknown tag is a no-op, never an error.

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Deserializer, Serialize};

/// Closed set of command tags understood by relaychat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    // client -> server
    SetName,
    Join,
    Pm,
    Who,
    UploadFile,
    ListFiles,
    GetFile,
    // server -> client (`Who` is shared)
    FileList,
    FileData,
    PrivateMessage,
}

impl Command {
    /// Wire tag for this command.
    pub fn as_str(self) -> &'static str {
        match self {
            Command::SetName => "setName",
            Command::Join => "join",
            Command::Pm => "pm",
            Command::Who => "who",
            Command::UploadFile => "uploadFile",
            Command::ListFiles => "listFiles",
            Command::GetFile => "getFile",
            Command::FileList => "fileList",
            Command::FileData => "fileData",
            Command::PrivateMessage => "privateMessage",
        }
    }

    /// Parse a wire tag. Unknown tags yield `None`.
    pub fn parse(tag: &str) -> Option<Self> {
        let cmd = match tag {
            "setName" => Command::SetName,
            "join" => Command::Join,
            "pm" => Command::Pm,
            "who" => Command::Who,
            "uploadFile" => Command::UploadFile,
            "listFiles" => Command::ListFiles,
            "getFile" => Command::GetFile,
            "fileList" => Command::FileList,
            "fileData" => Command::FileData,
            "privateMessage" => Command::PrivateMessage,
            _ => return None,
        };
        Some(cmd)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Envelope payload.
///
/// JSON form: a string, an array of strings, or an array of byte values.
/// An empty array decodes as an empty `List`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Data {
    Text(String),
    List(Vec<String>),
    Bytes(Bytes),
}

impl Data {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Data::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Data::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Data::Bytes(b) => Some(b),
            _ => None,
        }
    }
}

/// Tagged command message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Envelope {
    /// Raw command tag. Kept as a string so unknown tags survive decoding.
    /// The key itself is required on the wire; its value may be `null`.
    #[serde(deserialize_with = "nullable_tag")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Data>,
}

impl Envelope {
    pub fn new(command: Command) -> Self {
        Self {
            command: Some(command.as_str().to_string()),
            arg: None,
            data: None,
        }
    }

    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.arg = Some(arg.into());
        self
    }

    pub fn with_data(mut self, data: Data) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_data(Data::Text(text.into()))
    }

    pub fn with_list(self, list: Vec<String>) -> Self {
        self.with_data(Data::List(list))
    }

    pub fn with_bytes(self, bytes: impl Into<Bytes>) -> Self {
        self.with_data(Data::Bytes(bytes.into()))
    }

    /// Recognized command, if any.
    pub fn command(&self) -> Option<Command> {
        self.command.as_deref().and_then(Command::parse)
    }

    /// `data` as a string, if it is one.
    pub fn text(&self) -> Option<&str> {
        self.data.as_ref().and_then(Data::as_text)
    }

    /// `data` as raw bytes, if it is bytes.
    pub fn bytes(&self) -> Option<&Bytes> {
        self.data.as_ref().and_then(Data::as_bytes)
    }

    /// True when the payload must travel on the binary lane.
    pub fn carries_bytes(&self) -> bool {
        matches!(self.data, Some(Data::Bytes(_)))
    }
}

fn nullable_tag<'de, D>(de: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(de)
}

/// One decoded unit from the wire: a command envelope or raw chat text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Envelope(Envelope),
    Chat(String),
}
