use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Interval between repeated events while a control is held.
pub const REPEAT_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

/// Turns press/release edges into a stream of direction events.
///
/// A press emits immediately; holding emits again every interval until
/// release. Pressing another direction replaces the held one.
#[derive(Debug, Clone)]
pub struct PressRepeater {
    interval: Duration,
    held: Option<Held>,
}

#[derive(Debug, Clone, Copy)]
struct Held {
    direction: Direction,
    next_due: Instant,
}

impl Default for PressRepeater {
    fn default() -> Self {
        Self::new(REPEAT_INTERVAL)
    }
}

impl PressRepeater {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            held: None,
        }
    }

    /// Start holding `direction`. Returns the immediate first event.
    pub fn press(&mut self, direction: Direction, now: Instant) -> Direction {
        if self.held.map(|h| h.direction) != Some(direction) {
            tracing::debug!(direction = direction.as_str(), "control pressed");
        }
        self.held = Some(Held {
            direction,
            next_due: now + self.interval,
        });
        direction
    }

    /// Stop repeating. Releasing a direction that is not held is ignored.
    pub fn release(&mut self, direction: Direction) {
        if self.held.is_some_and(|h| h.direction == direction) {
            self.held = None;
        }
    }

    pub fn release_all(&mut self) {
        self.held = None;
    }

    pub fn held(&self) -> Option<Direction> {
        self.held.map(|h| h.direction)
    }

    /// Emit a repeat if one is due. At most one event per call; a late poll
    /// does not burst to catch up.
    pub fn poll(&mut self, now: Instant) -> Option<Direction> {
        let held = self.held.as_mut()?;
        if now < held.next_due {
            return None;
        }
        held.next_due += self.interval;
        if held.next_due <= now {
            held.next_due = now + self.interval;
        }
        Some(held.direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn press_fires_immediately() {
        let mut r = PressRepeater::default();
        let t0 = Instant::now();
        assert_eq!(r.press(Direction::Left, t0), Direction::Left);
        assert_eq!(r.poll(t0), None);
        assert_eq!(r.poll(t0 + ms(49)), None);
    }

    #[test]
    fn held_repeats_every_interval() {
        let mut r = PressRepeater::default();
        let t0 = Instant::now();
        r.press(Direction::Up, t0);

        let fired: Vec<_> = (1..=10)
            .filter_map(|i| r.poll(t0 + ms(i * 20)))
            .collect();
        // polls at 20..200ms: repeats due at 50, 100, 150, 200
        assert_eq!(fired, vec![Direction::Up; 4]);
    }

    #[test]
    fn release_stops_repeats() {
        let mut r = PressRepeater::default();
        let t0 = Instant::now();
        r.press(Direction::Right, t0);
        assert_eq!(r.poll(t0 + ms(50)), Some(Direction::Right));
        r.release(Direction::Right);
        assert_eq!(r.poll(t0 + ms(500)), None);
        assert_eq!(r.held(), None);
    }

    #[test]
    fn releasing_other_direction_keeps_hold() {
        let mut r = PressRepeater::default();
        let t0 = Instant::now();
        r.press(Direction::Down, t0);
        r.release(Direction::Up);
        assert_eq!(r.held(), Some(Direction::Down));
    }

    #[test]
    fn new_press_replaces_held_direction() {
        let mut r = PressRepeater::default();
        let t0 = Instant::now();
        r.press(Direction::Left, t0);
        r.press(Direction::Right, t0 + ms(30));
        assert_eq!(r.poll(t0 + ms(50)), None);
        assert_eq!(r.poll(t0 + ms(80)), Some(Direction::Right));
    }

    #[test]
    fn late_poll_does_not_burst() {
        let mut r = PressRepeater::default();
        let t0 = Instant::now();
        r.press(Direction::Left, t0);
        assert_eq!(r.poll(t0 + ms(1000)), Some(Direction::Left));
        assert_eq!(r.poll(t0 + ms(1001)), None);
        assert_eq!(r.poll(t0 + ms(1050)), Some(Direction::Left));
    }

    #[test]
    fn direction_serializes_lowercase() {
        for d in Direction::ALL {
            let json = serde_json::to_value(d).unwrap();
            assert_eq!(json, serde_json::Value::String(d.as_str().to_string()));
        }
    }
}
