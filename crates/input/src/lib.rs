//! Player input: arrow controls, motion sensor samples, and the rotation
//! state they steer.
//!
//! # Invariants
//! - Raw events become [`Action`]s; only [`RotationState`] interprets them.
//! - All timing takes an explicit `Instant`, so behavior is clock-independent.

pub mod action;
pub mod controls;
pub mod rotation;
pub mod sensor;

pub use action::Action;
pub use controls::{Direction, PressRepeater, REPEAT_INTERVAL};
pub use rotation::RotationState;
pub use sensor::{
    AccelSample, FallbackSensor, NoSensor, SAMPLE_INTERVAL, SensorSampler, SensorSource,
    SimulatedAccelerometer,
};
