use std::time::Duration;

use battleball_input::RotationState;
use battleball_render::{FrameRenderer, RenderError};
use battleball_transform::{IDENTITY, Mat4, SceneCamera};

/// Scene that computes each frame's transform without a GPU.
pub struct HeadlessScene {
    camera: SceneCamera,
    rotation: RotationState,
    aspect: f32,
    frame_time: Duration,
    fail_every: Option<u64>,
    last_transform: Mat4,
}

impl HeadlessScene {
    pub fn new(aspect: f32, frame_time: Duration, fail_every: Option<u64>) -> Self {
        Self {
            camera: SceneCamera::default(),
            rotation: RotationState::default(),
            aspect,
            frame_time,
            fail_every: fail_every.filter(|n| *n > 0),
            last_transform: IDENTITY,
        }
    }

    pub fn rotation(&self) -> f32 {
        self.rotation.angle()
    }

    pub fn last_transform(&self) -> &Mat4 {
        &self.last_transform
    }
}

impl FrameRenderer for HeadlessScene {
    fn render_frame(&mut self, frame: u64) -> Result<(), RenderError> {
        if self.fail_every.is_some_and(|n| frame % n == 0) {
            return Err(RenderError::FrameRender(format!("injected failure at frame {frame}")));
        }
        let angle = self.rotation.advance(self.frame_time);
        self.last_transform = self
            .camera
            .transform(self.aspect, angle)
            .map_err(|e| RenderError::FrameRender(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battleball_render::{BoundedTicker, FrameScheduler, SchedulerState};
    use battleball_transform::transformation_matrix;

    #[test]
    fn transform_tracks_rotation() {
        let mut scene = HeadlessScene::new(1.0, Duration::from_millis(100), None);
        scene.render_frame(1).unwrap();
        let expected = transformation_matrix(1.0, scene.rotation()).unwrap();
        assert_eq!(scene.last_transform(), &expected);
    }

    #[test]
    fn injected_failures_are_isolated() {
        let scene = HeadlessScene::new(1.0, Duration::from_millis(16), Some(3));
        let mut scheduler = FrameScheduler::new(scene, 2);
        scheduler.start();
        let ticks = scheduler.run(&mut BoundedTicker::new(30));
        assert_eq!(ticks, 30);
        assert_eq!(scheduler.state(), SchedulerState::Rendering);
        assert_eq!(scheduler.stats().failures, 10);
    }

    #[test]
    fn failing_every_frame_halts() {
        let scene = HeadlessScene::new(1.0, Duration::from_millis(16), Some(1));
        let mut scheduler = FrameScheduler::new(scene, 5);
        scheduler.start();
        assert_eq!(scheduler.run(&mut BoundedTicker::new(30)), 5);
        assert_eq!(scheduler.state(), SchedulerState::Failed);
    }

    #[test]
    fn invalid_aspect_is_a_frame_error() {
        let mut scene = HeadlessScene::new(0.0, Duration::from_millis(16), None);
        assert!(matches!(scene.render_frame(1), Err(RenderError::FrameRender(_))));
    }
}
