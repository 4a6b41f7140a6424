use std::collections::VecDeque;
use std::fmt;

use battleball_common::SessionId;
use serde_json::{Value, json};

use crate::{ServerMessage, SessionError, Transport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Joined { room: String, session: SessionId },
    Failed { reason: String },
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "disconnected"),
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Joined { room, session } => {
                write!(f, "joined {room} as {}", session.short())
            }
            ConnectionState::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}

/// Owned client for one room session.
pub struct SessionClient<T> {
    transport: T,
    state: ConnectionState,
    inbox: VecDeque<ServerMessage>,
}

impl<T: Transport> SessionClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            state: ConnectionState::Disconnected,
            inbox: VecDeque::new(),
        }
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn is_joined(&self) -> bool {
        matches!(self.state, ConnectionState::Joined { .. })
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Join `room` under `player_name`, creating the room if needed.
    pub fn join_or_create(&mut self, room: &str, player_name: &str) -> Result<SessionId, SessionError> {
        self.set_state(ConnectionState::Connecting);
        match self.transport.join_or_create(room, &json!({ "name": player_name })) {
            Ok(session) => {
                tracing::info!(room, session = %session.short(), "joined room");
                self.set_state(ConnectionState::Joined {
                    room: room.to_string(),
                    session,
                });
                Ok(session)
            }
            Err(e) => {
                tracing::warn!(room, "join failed: {e}");
                self.set_state(ConnectionState::Failed {
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    pub fn send_input(&mut self, payload: Value) -> Result<(), SessionError> {
        if !self.is_joined() {
            return Err(SessionError::NotJoined);
        }
        if let Err(e) = self.transport.send("input", &payload) {
            self.set_state(ConnectionState::Failed {
                reason: e.to_string(),
            });
            return Err(e);
        }
        Ok(())
    }

    /// Decode one raw frame and queue it.
    pub fn receive(&mut self, raw: &str) -> Result<(), SessionError> {
        if !self.is_joined() {
            return Err(SessionError::NotJoined);
        }
        self.inbox.push_back(ServerMessage::decode(raw)?);
        Ok(())
    }

    /// Pull everything the transport has received. Undecodable frames are
    /// logged and skipped. Returns the number queued.
    pub fn pump(&mut self) -> usize {
        let mut queued = 0;
        for raw in self.transport.poll() {
            match self.receive(&raw) {
                Ok(()) => queued += 1,
                Err(e) => tracing::warn!("dropping server frame: {e}"),
            }
        }
        queued
    }

    /// Take all queued messages in arrival order.
    pub fn drain(&mut self) -> Vec<ServerMessage> {
        self.inbox.drain(..).collect()
    }

    pub fn leave(&mut self, code: u16) {
        if self.is_joined() {
            self.transport.close(code);
        }
        self.inbox.clear();
        self.set_state(ConnectionState::Disconnected);
    }

    fn set_state(&mut self, next: ConnectionState) {
        if self.state != next {
            tracing::debug!(from = %self.state, to = %next, "session state");
            self.state = next;
        }
    }
}
