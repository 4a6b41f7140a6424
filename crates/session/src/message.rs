use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::SessionError;

/// A message delivered by the room server.
///
/// Wire form: `{"type": "input" | "snapshot", "payload": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "lowercase")]
pub enum ServerMessage {
    /// Another player's (or our echoed) input.
    Input(Value),
    /// Authoritative room state.
    Snapshot(Value),
}

impl ServerMessage {
    pub fn decode(raw: &str) -> Result<Self, SessionError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn encode(&self) -> Result<String, SessionError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn payload(&self) -> &Value {
        match self {
            ServerMessage::Input(v) | ServerMessage::Snapshot(v) => v,
        }
    }

    /// Numeric `rotation` field of a snapshot payload, if present.
    pub fn rotation_hint(&self) -> Option<f32> {
        match self {
            ServerMessage::Snapshot(state) => {
                let angle = state.get("rotation")?.as_f64()? as f32;
                angle.is_finite().then_some(angle)
            }
            ServerMessage::Input(_) => None,
        }
    }
}
