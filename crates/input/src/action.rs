use crate::{AccelSample, Direction};

/// A high-level input the rotation driver consumes.
///
/// Keyboard, sensor and network inputs all reduce to these, so the scene
/// never sees raw events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Arrow control, fired on press and on each repeat.
    Nudge(Direction),
    /// Latest motion sensor reading.
    Tilt(AccelSample),
    /// Authoritative angle from a session snapshot.
    SetRotation(f32),
    /// Input that maps to nothing.
    Noop,
}

impl From<Direction> for Action {
    fn from(direction: Direction) -> Self {
        Action::Nudge(direction)
    }
}

impl From<AccelSample> for Action {
    fn from(sample: AccelSample) -> Self {
        Action::Tilt(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_becomes_nudge() {
        assert_eq!(Action::from(Direction::Left), Action::Nudge(Direction::Left));
    }

    #[test]
    fn sample_becomes_tilt() {
        let s = AccelSample::new(0.1, 0.2, 0.3);
        assert!(matches!(Action::from(s), Action::Tilt(t) if t == s));
    }
}
