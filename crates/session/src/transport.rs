use std::collections::VecDeque;

use battleball_common::SessionId;
use serde_json::Value;

use crate::{ServerMessage, SessionError};

/// Connection to a room server.
pub trait Transport {
    /// Join the named room, creating it if needed.
    fn join_or_create(&mut self, room: &str, options: &Value) -> Result<SessionId, SessionError>;

    fn send(&mut self, message_type: &str, payload: &Value) -> Result<(), SessionError>;

    /// Raw inbound frames received since the last call.
    fn poll(&mut self) -> Vec<String>;

    fn close(&mut self, code: u16);
}

/// Offline transport: accepts any join and echoes inputs back.
#[derive(Debug, Default)]
pub struct LoopbackTransport {
    joined: Option<String>,
    inbound: VecDeque<String>,
    refuse_joins: bool,
    sent: u64,
}

impl LoopbackTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport whose joins always fail.
    pub fn refusing() -> Self {
        Self {
            refuse_joins: true,
            ..Self::default()
        }
    }

    /// Queue a raw frame as if the server sent it.
    pub fn inject(&mut self, raw: impl Into<String>) {
        self.inbound.push_back(raw.into());
    }

    pub fn sent(&self) -> u64 {
        self.sent
    }
}

impl Transport for LoopbackTransport {
    fn join_or_create(&mut self, room: &str, _options: &Value) -> Result<SessionId, SessionError> {
        if self.refuse_joins {
            return Err(SessionError::Transport(format!("room {room} unreachable")));
        }
        self.joined = Some(room.to_string());
        Ok(SessionId::new())
    }

    fn send(&mut self, message_type: &str, payload: &Value) -> Result<(), SessionError> {
        if self.joined.is_none() {
            return Err(SessionError::Transport("connection closed".into()));
        }
        self.sent += 1;
        if message_type == "input" {
            let echo = ServerMessage::Input(payload.clone()).encode()?;
            self.inbound.push_back(echo);
        }
        Ok(())
    }

    fn poll(&mut self) -> Vec<String> {
        self.inbound.drain(..).collect()
    }

    fn close(&mut self, _code: u16) {
        self.joined = None;
        self.inbound.clear();
    }
}
