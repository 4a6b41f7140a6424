use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::{Duration, Instant};

use crate::RenderError;

/// Produces one frame per call. Implemented by scenes driven by the scheduler.
pub trait FrameRenderer {
    fn render_frame(&mut self, frame: u64) -> Result<(), RenderError>;
}

/// Source of ticks for [`FrameScheduler::run`].
pub trait Ticker {
    /// Block until the next tick is due. `false` means the host is gone.
    fn next_tick(&mut self) -> bool;
}

/// Yields a fixed number of ticks immediately.
#[derive(Debug, Clone)]
pub struct BoundedTicker {
    remaining: u64,
}

impl BoundedTicker {
    pub fn new(ticks: u64) -> Self {
        Self { remaining: ticks }
    }
}

impl Ticker for BoundedTicker {
    fn next_tick(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }
}

/// Paces ticks at a fixed interval, optionally stopping after `limit` ticks.
///
/// A late tick fires immediately; missed ticks are not made up.
#[derive(Debug, Clone)]
pub struct IntervalTicker {
    interval: Duration,
    limit: Option<u64>,
    issued: u64,
    next_due: Option<Instant>,
}

impl IntervalTicker {
    pub fn new(interval: Duration, limit: Option<u64>) -> Self {
        Self {
            interval,
            limit,
            issued: 0,
            next_due: None,
        }
    }
}

impl Ticker for IntervalTicker {
    fn next_tick(&mut self) -> bool {
        if self.limit.is_some_and(|limit| self.issued >= limit) {
            return false;
        }
        let now = Instant::now();
        if let Some(due) = self.next_due {
            if due > now {
                std::thread::sleep(due - now);
            }
        }
        self.next_due = Some(Instant::now() + self.interval);
        self.issued += 1;
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// No renderer attached yet.
    Uninitialized,
    /// Renderer attached, loop not started.
    Ready,
    Rendering,
    /// Stopped by the host; may be started again.
    Stopped,
    /// Gave up after too many consecutive failed frames.
    Failed,
}

/// Result of one [`FrameScheduler::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Frame rendered; schedule the next tick.
    Presented,
    /// Frame failed and was dropped; schedule the next tick anyway.
    Dropped,
    /// Not rendering; do not schedule another tick.
    Halted,
}

impl TickOutcome {
    pub fn should_reschedule(self) -> bool {
        !matches!(self, TickOutcome::Halted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerStats {
    pub frames: u64,
    pub failures: u64,
    pub consecutive_failures: u32,
    pub average_frame_time: Duration,
    pub max_frame_time: Duration,
    pub last_frame_time: Duration,
}

/// Running frame-time totals since the scheduler was created.
#[derive(Debug, Clone, Copy, Default)]
struct FrameTimes {
    total: Duration,
    ticks: u32,
    max: Duration,
    last: Duration,
}

impl FrameTimes {
    fn record(&mut self, elapsed: Duration) {
        self.total = self.total.saturating_add(elapsed);
        self.ticks = self.ticks.saturating_add(1);
        self.max = self.max.max(elapsed);
        self.last = elapsed;
    }

    fn average(&self) -> Duration {
        self.total.checked_div(self.ticks).unwrap_or(Duration::ZERO)
    }
}

/// Drives a [`FrameRenderer`] one tick at a time.
///
/// Each tick is isolated: an error or a panic inside the renderer drops that
/// frame and the loop carries on. After `max_consecutive_failures` failures in
/// a row the scheduler moves to [`SchedulerState::Failed`]; a limit of 0 keeps
/// it running forever.
pub struct FrameScheduler<R> {
    renderer: Option<R>,
    state: SchedulerState,
    frame: u64,
    failures: u64,
    consecutive_failures: u32,
    max_consecutive_failures: u32,
    times: FrameTimes,
    last_error: Option<RenderError>,
}

impl<R: FrameRenderer> FrameScheduler<R> {
    pub fn uninitialized(max_consecutive_failures: u32) -> Self {
        Self {
            renderer: None,
            state: SchedulerState::Uninitialized,
            frame: 0,
            failures: 0,
            consecutive_failures: 0,
            max_consecutive_failures,
            times: FrameTimes::default(),
            last_error: None,
        }
    }

    pub fn new(renderer: R, max_consecutive_failures: u32) -> Self {
        let mut scheduler = Self::uninitialized(max_consecutive_failures);
        scheduler.attach(renderer);
        scheduler
    }

    /// Attach the renderer built by setup. The loop is not started.
    pub fn attach(&mut self, renderer: R) {
        self.renderer = Some(renderer);
        if self.state == SchedulerState::Uninitialized {
            self.transition(SchedulerState::Ready);
        }
    }

    /// Begin (or resume) rendering. Returns whether the loop is now running.
    pub fn start(&mut self) -> bool {
        match self.state {
            SchedulerState::Ready | SchedulerState::Stopped => {
                self.consecutive_failures = 0;
                self.transition(SchedulerState::Rendering);
                true
            }
            SchedulerState::Rendering => true,
            SchedulerState::Uninitialized | SchedulerState::Failed => {
                tracing::warn!(state = ?self.state, "cannot start frame scheduler");
                false
            }
        }
    }

    pub fn stop(&mut self) {
        if self.state == SchedulerState::Rendering {
            self.transition(SchedulerState::Stopped);
        }
    }

    /// Render one frame if rendering, isolating any failure.
    pub fn tick(&mut self) -> TickOutcome {
        if self.state != SchedulerState::Rendering {
            return TickOutcome::Halted;
        }
        let Some(renderer) = self.renderer.as_mut() else {
            return TickOutcome::Halted;
        };

        self.frame += 1;
        let frame = self.frame;
        let started = Instant::now();

        let result = match catch_unwind(AssertUnwindSafe(|| renderer.render_frame(frame))) {
            Ok(result) => result,
            Err(payload) => Err(RenderError::FrameRender(panic_message(payload.as_ref()))),
        };
        self.times.record(started.elapsed());

        match result {
            Ok(()) => {
                self.consecutive_failures = 0;
                TickOutcome::Presented
            }
            Err(err) => {
                self.failures += 1;
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                tracing::warn!(
                    frame,
                    consecutive = self.consecutive_failures,
                    error = %err,
                    "frame dropped"
                );
                self.last_error = Some(err);

                if self.max_consecutive_failures > 0
                    && self.consecutive_failures >= self.max_consecutive_failures
                {
                    tracing::error!(
                        frame,
                        limit = self.max_consecutive_failures,
                        "too many consecutive frame failures, render loop halted"
                    );
                    self.transition(SchedulerState::Failed);
                    return TickOutcome::Halted;
                }
                TickOutcome::Dropped
            }
        }
    }

    /// Tick until the ticker runs out or the loop halts. Returns ticks run.
    pub fn run<T: Ticker>(&mut self, ticker: &mut T) -> u64 {
        let mut ticks = 0;
        while self.state == SchedulerState::Rendering && ticker.next_tick() {
            ticks += 1;
            if !self.tick().should_reschedule() {
                break;
            }
        }
        ticks
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Number of ticks attempted so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn last_error(&self) -> Option<&RenderError> {
        self.last_error.as_ref()
    }

    pub fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            frames: self.frame,
            failures: self.failures,
            consecutive_failures: self.consecutive_failures,
            average_frame_time: self.times.average(),
            max_frame_time: self.times.max,
            last_frame_time: self.times.last,
        }
    }

    pub fn renderer(&self) -> Option<&R> {
        self.renderer.as_ref()
    }

    pub fn renderer_mut(&mut self) -> Option<&mut R> {
        self.renderer.as_mut()
    }

    pub fn into_renderer(self) -> Option<R> {
        self.renderer
    }

    fn transition(&mut self, next: SchedulerState) {
        tracing::debug!(from = ?self.state, to = ?next, "frame scheduler state");
        self.state = next;
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panic: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panic: {s}")
    } else {
        "panic during frame".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[derive(Default)]
    struct ScriptedRenderer {
        fail: HashSet<u64>,
        panic: HashSet<u64>,
        rendered: Vec<u64>,
    }

    impl ScriptedRenderer {
        fn failing(frames: impl IntoIterator<Item = u64>) -> Self {
            Self {
                fail: frames.into_iter().collect(),
                ..Self::default()
            }
        }
    }

    impl FrameRenderer for ScriptedRenderer {
        fn render_frame(&mut self, frame: u64) -> Result<(), RenderError> {
            if self.panic.contains(&frame) {
                panic!("boom at {frame}");
            }
            if self.fail.contains(&frame) {
                return Err(RenderError::FrameRender(format!("frame {frame}")));
            }
            self.rendered.push(frame);
            Ok(())
        }
    }

    struct AlwaysFails;

    impl FrameRenderer for AlwaysFails {
        fn render_frame(&mut self, _frame: u64) -> Result<(), RenderError> {
            Err(RenderError::FrameRender("surface lost".into()))
        }
    }

    #[test]
    fn new_scheduler_is_ready_until_started() {
        let mut scheduler = FrameScheduler::new(ScriptedRenderer::default(), 3);
        assert_eq!(scheduler.state(), SchedulerState::Ready);
        assert_eq!(scheduler.tick(), TickOutcome::Halted);
        assert_eq!(scheduler.frame(), 0);

        assert!(scheduler.start());
        assert_eq!(scheduler.tick(), TickOutcome::Presented);
        assert_eq!(scheduler.frame(), 1);
    }

    #[test]
    fn uninitialized_scheduler_cannot_start() {
        let mut scheduler: FrameScheduler<ScriptedRenderer> = FrameScheduler::uninitialized(3);
        assert_eq!(scheduler.state(), SchedulerState::Uninitialized);
        assert!(!scheduler.start());

        scheduler.attach(ScriptedRenderer::default());
        assert_eq!(scheduler.state(), SchedulerState::Ready);
        assert!(scheduler.start());
    }

    #[test]
    fn failed_frame_does_not_stop_the_loop() {
        let mut scheduler = FrameScheduler::new(ScriptedRenderer::failing([3]), 3);
        scheduler.start();

        let ticks = scheduler.run(&mut BoundedTicker::new(10));

        assert_eq!(ticks, 10);
        assert_eq!(scheduler.frame(), 10);
        assert_eq!(scheduler.state(), SchedulerState::Rendering);
        let rendered = &scheduler.renderer().unwrap().rendered;
        assert_eq!(rendered.len(), 9);
        assert!(!rendered.contains(&3));
        assert_eq!(scheduler.stats().failures, 1);
        assert!(scheduler.last_error().is_some());
    }

    #[test]
    fn dropped_frame_still_reschedules() {
        let mut scheduler = FrameScheduler::new(ScriptedRenderer::failing([1]), 0);
        scheduler.start();
        let outcome = scheduler.tick();
        assert_eq!(outcome, TickOutcome::Dropped);
        assert!(outcome.should_reschedule());
    }

    #[test]
    fn panicking_frame_is_isolated() {
        let renderer = ScriptedRenderer {
            panic: HashSet::from([2]),
            ..ScriptedRenderer::default()
        };
        let mut scheduler = FrameScheduler::new(renderer, 3);
        scheduler.start();

        scheduler.run(&mut BoundedTicker::new(4));

        assert_eq!(scheduler.frame(), 4);
        assert_eq!(scheduler.renderer().unwrap().rendered, vec![1, 3, 4]);
        let err = scheduler.last_error().unwrap();
        assert!(err.to_string().contains("boom at 2"));
    }

    #[test]
    fn consecutive_failures_trip_the_breaker() {
        let mut scheduler = FrameScheduler::new(AlwaysFails, 3);
        scheduler.start();

        let ticks = scheduler.run(&mut BoundedTicker::new(100));

        assert_eq!(ticks, 3);
        assert_eq!(scheduler.state(), SchedulerState::Failed);
        assert_eq!(scheduler.tick(), TickOutcome::Halted);
        assert_eq!(scheduler.frame(), 3);
        assert!(!scheduler.start());
    }

    #[test]
    fn success_resets_consecutive_count() {
        let mut scheduler = FrameScheduler::new(ScriptedRenderer::failing([1, 2, 4, 5, 7, 8]), 3);
        scheduler.start();

        scheduler.run(&mut BoundedTicker::new(9));

        assert_eq!(scheduler.state(), SchedulerState::Rendering);
        let stats = scheduler.stats();
        assert_eq!(stats.frames, 9);
        assert_eq!(stats.failures, 6);
        assert_eq!(stats.consecutive_failures, 0);
    }

    #[test]
    fn zero_limit_never_fails() {
        let mut scheduler = FrameScheduler::new(AlwaysFails, 0);
        scheduler.start();
        assert_eq!(scheduler.run(&mut BoundedTicker::new(500)), 500);
        assert_eq!(scheduler.state(), SchedulerState::Rendering);
    }

    #[test]
    fn consecutive_count_saturates_when_breaker_disabled() {
        let mut scheduler = FrameScheduler::new(AlwaysFails, 0);
        scheduler.start();
        scheduler.consecutive_failures = u32::MAX - 1;

        assert_eq!(scheduler.tick(), TickOutcome::Dropped);
        assert_eq!(scheduler.tick(), TickOutcome::Dropped);
        assert_eq!(scheduler.stats().consecutive_failures, u32::MAX);
        assert_eq!(scheduler.state(), SchedulerState::Rendering);
    }

    struct SlowSecondFrame;

    impl FrameRenderer for SlowSecondFrame {
        fn render_frame(&mut self, frame: u64) -> Result<(), RenderError> {
            if frame == 2 {
                std::thread::sleep(Duration::from_millis(2));
            }
            Ok(())
        }
    }

    #[test]
    fn stats_report_frame_times() {
        let mut scheduler = FrameScheduler::new(SlowSecondFrame, 3);
        let idle = scheduler.stats();
        assert_eq!(idle.average_frame_time, Duration::ZERO);
        assert_eq!(idle.max_frame_time, Duration::ZERO);

        scheduler.start();
        scheduler.run(&mut BoundedTicker::new(3));

        let stats = scheduler.stats();
        assert!(stats.max_frame_time >= Duration::from_millis(2));
        assert!(stats.average_frame_time <= stats.max_frame_time);
        assert!(stats.average_frame_time >= Duration::from_millis(2) / 3);
        assert!(stats.last_frame_time <= stats.max_frame_time);
    }

    #[test]
    fn stop_halts_and_start_resumes() {
        let mut scheduler = FrameScheduler::new(ScriptedRenderer::default(), 3);
        scheduler.start();
        scheduler.run(&mut BoundedTicker::new(2));

        scheduler.stop();
        assert_eq!(scheduler.state(), SchedulerState::Stopped);
        assert_eq!(scheduler.tick(), TickOutcome::Halted);
        assert_eq!(scheduler.run(&mut BoundedTicker::new(5)), 0);
        assert_eq!(scheduler.frame(), 2);

        assert!(scheduler.start());
        scheduler.run(&mut BoundedTicker::new(2));
        assert_eq!(scheduler.frame(), 4);
        assert_eq!(scheduler.renderer().unwrap().rendered, vec![1, 2, 3, 4]);
    }

    #[test]
    fn bounded_ticker_counts_down() {
        let mut ticker = BoundedTicker::new(2);
        assert!(ticker.next_tick());
        assert!(ticker.next_tick());
        assert!(!ticker.next_tick());
    }

    #[test]
    fn interval_ticker_respects_limit_and_pacing() {
        let mut ticker = IntervalTicker::new(Duration::from_millis(5), Some(3));
        let started = Instant::now();
        assert!(ticker.next_tick());
        assert!(ticker.next_tick());
        assert!(ticker.next_tick());
        assert!(!ticker.next_tick());
        assert!(started.elapsed() >= Duration::from_millis(10));
    }
}
