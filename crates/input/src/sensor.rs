use std::time::{Duration, Instant};

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Motion sensor sampling period (10 Hz).
pub const SAMPLE_INTERVAL: Duration = Duration::from_millis(100);

/// One 3-axis accelerometer reading.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AccelSample(pub Vec3);

impl AccelSample {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self(Vec3::new(x, y, z))
    }

    pub fn x(&self) -> f32 {
        self.0.x
    }

    pub fn y(&self) -> f32 {
        self.0.y
    }

    pub fn z(&self) -> f32 {
        self.0.z
    }

    pub fn magnitude(&self) -> f32 {
        self.0.length()
    }
}

/// Anything that can produce accelerometer readings.
pub trait SensorSource {
    /// Read the sensor at `now`. `None` means no reading is available.
    fn read(&mut self, now: Instant) -> Option<AccelSample>;
}

/// Smooth synthetic motion for devices without a sensor.
#[derive(Debug, Clone)]
pub struct SimulatedAccelerometer {
    started: Instant,
}

impl SimulatedAccelerometer {
    pub fn new(started: Instant) -> Self {
        Self { started }
    }

    /// Reading at `t` seconds after start.
    pub fn at(t: f32) -> AccelSample {
        AccelSample::new(t.sin() * 0.5, t.cos() * 0.5, (t * 0.5).sin() * 0.3)
    }
}

impl SensorSource for SimulatedAccelerometer {
    fn read(&mut self, now: Instant) -> Option<AccelSample> {
        let t = now.saturating_duration_since(self.started).as_secs_f32();
        Some(Self::at(t))
    }
}

/// Source for hosts without motion hardware; never yields a reading.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSensor;

impl SensorSource for NoSensor {
    fn read(&mut self, _now: Instant) -> Option<AccelSample> {
        None
    }
}

/// Reads `primary` until it first comes up empty, then switches to
/// `fallback` for good.
#[derive(Debug, Clone)]
pub struct FallbackSensor<P, F> {
    primary: P,
    fallback: F,
    simulated: bool,
}

impl<P: SensorSource, F: SensorSource> FallbackSensor<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self {
            primary,
            fallback,
            simulated: false,
        }
    }

    /// Whether readings now come from the fallback.
    pub fn is_simulated(&self) -> bool {
        self.simulated
    }
}

impl<P: SensorSource, F: SensorSource> SensorSource for FallbackSensor<P, F> {
    fn read(&mut self, now: Instant) -> Option<AccelSample> {
        if !self.simulated {
            if let Some(sample) = self.primary.read(now) {
                return Some(sample);
            }
            tracing::info!("motion sensor unavailable, using simulated readings");
            self.simulated = true;
        }
        self.fallback.read(now)
    }
}

/// Throttles a [`SensorSource`] to a fixed rate. An inactive sampler does not
/// read its source at all.
#[derive(Debug, Clone)]
pub struct SensorSampler<S> {
    source: S,
    interval: Duration,
    next_due: Option<Instant>,
    latest: Option<AccelSample>,
    active: bool,
}

impl<S: SensorSource> SensorSampler<S> {
    pub fn new(source: S) -> Self {
        Self::with_interval(source, SAMPLE_INTERVAL)
    }

    pub fn with_interval(source: S, interval: Duration) -> Self {
        Self {
            source,
            interval,
            next_due: None,
            latest: None,
            active: true,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Turn sampling on or off. Turning it off forgets the latest sample;
    /// turning it back on reads on the next poll.
    pub fn set_active(&mut self, active: bool) {
        if self.active != active {
            tracing::debug!(active, "motion sampling toggled");
        }
        self.active = active;
        self.next_due = None;
        if !active {
            self.latest = None;
        }
    }

    /// Flip the active flag. Returns the new state.
    pub fn toggle(&mut self) -> bool {
        self.set_active(!self.active);
        self.active
    }

    /// Read a new sample if active and the interval has elapsed since the
    /// last one.
    pub fn poll(&mut self, now: Instant) -> Option<AccelSample> {
        if !self.active {
            return None;
        }
        if self.next_due.is_some_and(|due| now < due) {
            return None;
        }
        self.next_due = Some(now + self.interval);
        let sample = self.source.read(now)?;
        self.latest = Some(sample);
        Some(sample)
    }

    /// Most recent sample, if any has been read.
    pub fn latest(&self) -> Option<AccelSample> {
        self.latest
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counting(u32);

    impl SensorSource for Counting {
        fn read(&mut self, _now: Instant) -> Option<AccelSample> {
            self.0 += 1;
            Some(AccelSample::new(self.0 as f32, 0.0, 0.0))
        }
    }

    struct Absent;

    impl SensorSource for Absent {
        fn read(&mut self, _now: Instant) -> Option<AccelSample> {
            None
        }
    }

    #[test]
    fn magnitude_is_euclidean_length() {
        assert!((AccelSample::new(3.0, 4.0, 0.0).magnitude() - 5.0).abs() < 1e-6);
        assert_eq!(AccelSample::default().magnitude(), 0.0);
    }

    #[test]
    fn simulated_motion_at_start() {
        let s = SimulatedAccelerometer::at(0.0);
        assert_eq!(s.x(), 0.0);
        assert!((s.y() - 0.5).abs() < 1e-6);
        assert_eq!(s.z(), 0.0);
    }

    #[test]
    fn simulated_motion_is_bounded() {
        for i in 0..200 {
            let s = SimulatedAccelerometer::at(i as f32 * 0.1);
            assert!(s.x().abs() <= 0.5 + 1e-6);
            assert!(s.y().abs() <= 0.5 + 1e-6);
            assert!(s.z().abs() <= 0.3 + 1e-6);
            // x and y trace a circle of radius 0.5
            assert!((s.0.truncate().length() - 0.5).abs() < 1e-5);
        }
    }

    #[test]
    fn sampler_throttles_to_interval() {
        let t0 = Instant::now();
        let mut sampler = SensorSampler::new(Counting(0));
        let reads = (0..50)
            .filter(|i| sampler.poll(t0 + Duration::from_millis(i * 20)).is_some())
            .count();
        // 0..980ms at 100ms spacing
        assert_eq!(reads, 10);
        assert_eq!(sampler.source().0, 10);
        assert_eq!(sampler.latest(), Some(AccelSample::new(10.0, 0.0, 0.0)));
    }

    #[test]
    fn first_poll_reads_immediately() {
        let mut sampler = SensorSampler::new(Counting(0));
        assert!(sampler.poll(Instant::now()).is_some());
    }

    #[test]
    fn absent_sensor_yields_nothing() {
        let mut sampler = SensorSampler::new(Absent);
        assert_eq!(sampler.poll(Instant::now()), None);
        assert_eq!(sampler.latest(), None);
    }

    #[test]
    fn inactive_sampler_stops_reading() {
        let t0 = Instant::now();
        let mut sampler = SensorSampler::new(Counting(0));
        assert!(sampler.poll(t0).is_some());

        assert!(!sampler.toggle());
        assert_eq!(sampler.latest(), None);
        for i in 1..20 {
            assert_eq!(sampler.poll(t0 + Duration::from_millis(i * 100)), None);
        }
        assert_eq!(sampler.source().0, 1);

        assert!(sampler.toggle());
        assert!(sampler.poll(t0 + Duration::from_millis(2001)).is_some());
        assert_eq!(sampler.source().0, 2);
    }

    #[test]
    fn hardware_reading_preferred_over_simulation() {
        let t0 = Instant::now();
        let mut sensor = FallbackSensor::new(Counting(0), SimulatedAccelerometer::new(t0));
        assert_eq!(sensor.read(t0), Some(AccelSample::new(1.0, 0.0, 0.0)));
        assert!(!sensor.is_simulated());
    }

    #[test]
    fn missing_hardware_falls_back_to_simulation() {
        let t0 = Instant::now();
        let mut sensor = FallbackSensor::new(NoSensor, SimulatedAccelerometer::new(t0));
        let later = t0 + Duration::from_secs(1);
        assert_eq!(sensor.read(later), Some(SimulatedAccelerometer::at(1.0)));
        assert!(sensor.is_simulated());
    }

    #[test]
    fn simulated_source_tracks_elapsed_time() {
        let t0 = Instant::now();
        let mut sim = SimulatedAccelerometer::new(t0);
        let later = sim.read(t0 + Duration::from_secs(2)).unwrap();
        assert_eq!(later, SimulatedAccelerometer::at(2.0));
    }
}
