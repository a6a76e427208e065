// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Frame types and the inbound decoder.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Frames a client may send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    Subscribe { channel: String },
    Unsubscribe { channel: String },
    Ping,
}

/// Frames the server sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    Connected {
        #[serde(rename = "clientId")]
        client_id: String,
    },
    Subscribed {
        channel: String,
    },
    Unsubscribed {
        channel: String,
    },
    Pong,
    Error {
        message: String,
    },
    Event {
        channel: String,
        event: String,
        data: serde_json::Value,
    },
}

impl ServerFrame {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error { message: message.into() }
    }

    /// Serialize to a JSON text frame. Server frames contain no
    /// non-serializable values, so this cannot fail in practice; a
    /// failure degrades into an error frame string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            r#"{"type":"error","message":"frame serialization failed"}"#.to_string()
        })
    }
}

/// Inbound decode failures. All are answerable; none are fatal to the
/// connection except `PayloadTooLarge`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("unparseable frame: {0}")]
    Malformed(String),

    #[error("unknown frame type: {0}")]
    UnknownType(String),

    #[error("payload exceeds {max} bytes")]
    PayloadTooLarge { max: usize },
}

/// Decode one inbound text frame, enforcing the payload cap.
pub fn decode_client_frame(raw: &str, max_bytes: usize) -> Result<ClientFrame, ProtocolError> {
    if raw.len() > max_bytes {
        return Err(ProtocolError::PayloadTooLarge { max: max_bytes });
    }
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| ProtocolError::Malformed(e.to_string()))?;
    let tag = value
        .get("type")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| ProtocolError::Malformed("missing type tag".to_string()))?
        .to_string();
    serde_json::from_value(value).map_err(|_| ProtocolError::UnknownType(tag))
}

#[cfg(test)]
#[path = "frames_tests.rs"]
mod tests;
