use std::time::{Duration, Instant};

use battleball_input::{
    Action, Direction, PressRepeater, RotationState, SensorSampler, SensorSource,
};
use battleball_session::{ServerMessage, SessionClient, Transport};
use serde::{Deserialize, Serialize};

/// Input payload sent to the room.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputPayload {
    pub direction: Direction,
}

/// Routes controls, sensor samples and room messages into one rotation.
///
/// While joined, control events go through the session and take effect when
/// they come back, so every client applies the same stream. Offline they
/// apply directly.
pub struct InputDriver<S, T> {
    repeater: PressRepeater,
    sampler: SensorSampler<S>,
    rotation: RotationState,
    session: SessionClient<T>,
}

impl<S: SensorSource, T: Transport> InputDriver<S, T> {
    pub fn new(sampler: SensorSampler<S>, session: SessionClient<T>, spin_rate: f32) -> Self {
        Self {
            repeater: PressRepeater::default(),
            sampler,
            rotation: RotationState::new(spin_rate),
            session,
        }
    }

    pub fn press(&mut self, direction: Direction, now: Instant) {
        let direction = self.repeater.press(direction, now);
        self.dispatch(direction);
    }

    pub fn release(&mut self, direction: Direction) {
        self.repeater.release(direction);
    }

    /// Advance one frame. Returns the rotation angle to render.
    pub fn update(&mut self, now: Instant, dt: Duration) -> f32 {
        if let Some(direction) = self.repeater.poll(now) {
            self.dispatch(direction);
        }
        if let Some(sample) = self.sampler.poll(now) {
            self.rotation.apply(Action::Tilt(sample));
        }

        self.session.pump();
        for message in self.session.drain() {
            self.rotation.apply(action_for(&message));
        }

        self.rotation.advance(dt)
    }

    /// Turn motion input on or off. Returns whether it is now on.
    pub fn toggle_sensor(&mut self) -> bool {
        let active = self.sampler.toggle();
        if !active {
            self.rotation.clear_tilt();
        }
        active
    }

    pub fn sensor_active(&self) -> bool {
        self.sampler.is_active()
    }

    pub fn sampler(&self) -> &SensorSampler<S> {
        &self.sampler
    }

    pub fn session(&self) -> &SessionClient<T> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionClient<T> {
        &mut self.session
    }

    pub fn rotation(&self) -> &RotationState {
        &self.rotation
    }

    fn dispatch(&mut self, direction: Direction) {
        if self.session.is_joined() {
            let payload = match serde_json::to_value(InputPayload { direction }) {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::warn!("failed to encode input: {e}");
                    return;
                }
            };
            match self.session.send_input(payload) {
                Ok(()) => return,
                Err(e) => tracing::warn!("input not sent, applying locally: {e}"),
            }
        }
        self.rotation.apply(Action::Nudge(direction));
    }
}

fn action_for(message: &ServerMessage) -> Action {
    match message {
        ServerMessage::Input(payload) => {
            match serde_json::from_value::<InputPayload>(payload.clone()) {
                Ok(input) => Action::Nudge(input.direction),
                Err(_) => Action::Noop,
            }
        }
        ServerMessage::Snapshot(_) => message
            .rotation_hint()
            .map_or(Action::Noop, Action::SetRotation),
    }
}
