use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::RecorderError;

/// Control command sent to the capture context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    Record,
    Pause,
    Stop,
    Destroy,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Record => "record",
            Self::Pause => "pause",
            Self::Stop => "stop",
            Self::Destroy => "destroy",
        }
    }

    /// Wire form: `{"type":"command","message":"record"}`.
    pub fn to_json(&self) -> String {
        serde_json::json!({ "type": "command", "message": self.as_str() }).to_string()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Command {
    type Err = RecorderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "record" => Ok(Self::Record),
            "pause" => Ok(Self::Pause),
            "stop" => Ok(Self::Stop),
            "destroy" => Ok(Self::Destroy),
            other => Err(RecorderError::MalformedMessage(format!("unknown command: {}", other))),
        }
    }
}

/// An incoming control message after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlMessage {
    Command(Command),
    /// Well-formed message of a type the recorder does not handle (e.g. `set`, `get`).
    Unsupported { kind: String, message: Option<String> },
}

#[derive(Deserialize)]
struct RawMessage {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    message: Option<String>,
}

impl ControlMessage {
    /// Parse a JSON control message.
    ///
    /// Fails with `MalformedMessage` if the text is not a JSON object or names
    /// an unknown command. Other message types parse as `Unsupported`.
    pub fn parse(json: &str) -> Result<Self, RecorderError> {
        let raw: RawMessage =
            serde_json::from_str(json).map_err(|e| RecorderError::MalformedMessage(e.to_string()))?;

        if raw.kind != "command" {
            return Ok(Self::Unsupported {
                kind: raw.kind,
                message: raw.message,
            });
        }

        let name = raw
            .message
            .ok_or_else(|| RecorderError::MalformedMessage("command without message".into()))?;
        Ok(Self::Command(name.parse()?))
    }
}

/// Status notifications emitted by the recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusMessage {
    Full,
}

/// Kind of binary payload carried by a data message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    Wav,
}

/// Message sent from the capture context back to the controlling side.
///
/// Serializes as `{"type":"status","message":"full"}` or
/// `{"type":"data","message":"wav","data":[...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutboundMessage {
    Status { message: StatusMessage },
    Data { message: DataKind, data: Vec<u8> },
}

impl OutboundMessage {
    pub fn full() -> Self {
        Self::Status {
            message: StatusMessage::Full,
        }
    }

    pub fn wav(data: Vec<u8>) -> Self {
        Self::Data {
            message: DataKind::Wav,
            data,
        }
    }

    pub fn is_full(&self) -> bool {
        matches!(
            self,
            Self::Status {
                message: StatusMessage::Full
            }
        )
    }

    /// Take the encoded WAV out of a data message.
    pub fn into_wav(self) -> Option<Vec<u8>> {
        match self {
            Self::Data {
                message: DataKind::Wav,
                data,
            } => Some(data),
            _ => None,
        }
    }
}
