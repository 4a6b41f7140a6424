//! Multiplayer session layer.
//!
//! A [`SessionClient`] is constructed and owned by the app; there is no
//! process-wide connection. Payloads are opaque JSON the session only routes.
//!
//! # Invariants
//! - Messages are queued only while joined.
//! - A transport failure always leaves the client in `Failed`.

pub mod client;
pub mod message;
pub mod transport;

pub use client::{ConnectionState, SessionClient};
pub use message::ServerMessage;
pub use transport::{LoopbackTransport, Transport};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("message decode failed: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("not joined to a room")]
    NotJoined,
    #[error("transport error: {0}")]
    Transport(String),
}
