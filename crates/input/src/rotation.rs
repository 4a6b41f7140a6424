use std::f32::consts::TAU;
use std::time::Duration;

use crate::{Action, Direction};

/// Angle change per left/right nudge, radians.
pub const NUDGE_STEP: f32 = 0.1;
/// Spin rate change per up/down nudge, radians per second.
pub const SPIN_STEP: f32 = 0.25;
/// Spin rate is clamped to `[-MAX_SPIN, MAX_SPIN]`.
pub const MAX_SPIN: f32 = 4.0;
/// Extra spin per unit of sensor x tilt.
pub const TILT_GAIN: f32 = 2.0;

/// The single rotation parameter fed into the scene transform.
#[derive(Debug, Clone, PartialEq)]
pub struct RotationState {
    angle: f32,
    spin_rate: f32,
    tilt: f32,
}

impl Default for RotationState {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl RotationState {
    /// A non-finite `spin_rate` is treated as no spin.
    pub fn new(spin_rate: f32) -> Self {
        let spin_rate = if spin_rate.is_finite() { spin_rate } else { 0.0 };
        Self {
            angle: 0.0,
            spin_rate: spin_rate.clamp(-MAX_SPIN, MAX_SPIN),
            tilt: 0.0,
        }
    }

    /// Current angle in `[0, TAU)`.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn spin_rate(&self) -> f32 {
        self.spin_rate
    }

    /// Spin rate including the sensor contribution.
    pub fn effective_spin(&self) -> f32 {
        self.spin_rate + self.tilt * TILT_GAIN
    }

    pub fn apply(&mut self, action: Action) {
        match action {
            Action::Nudge(Direction::Left) => self.set_angle(self.angle - NUDGE_STEP),
            Action::Nudge(Direction::Right) => self.set_angle(self.angle + NUDGE_STEP),
            Action::Nudge(Direction::Up) => {
                self.spin_rate = (self.spin_rate + SPIN_STEP).min(MAX_SPIN);
            }
            Action::Nudge(Direction::Down) => {
                self.spin_rate = (self.spin_rate - SPIN_STEP).max(-MAX_SPIN);
            }
            Action::Tilt(sample) => {
                if sample.x().is_finite() {
                    self.tilt = sample.x();
                }
            }
            Action::SetRotation(angle) => {
                if angle.is_finite() {
                    tracing::debug!(angle, "rotation overridden");
                    self.set_angle(angle);
                }
            }
            Action::Noop => {}
        }
    }

    /// Drop the sensor contribution, e.g. when the sensor is turned off.
    pub fn clear_tilt(&mut self) {
        self.tilt = 0.0;
    }

    /// Advance the angle by the effective spin over `dt`.
    pub fn advance(&mut self, dt: Duration) -> f32 {
        self.set_angle(self.angle + self.effective_spin() * dt.as_secs_f32());
        self.angle
    }

    fn set_angle(&mut self, angle: f32) {
        self.angle = angle.rem_euclid(TAU);
    }
}
