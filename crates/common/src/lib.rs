//! Shared value types used across the battleball crates.

mod types;

pub use types::{LogicalSize, PhysicalSize, SessionId};
