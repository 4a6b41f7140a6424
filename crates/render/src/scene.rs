use battleball_transform::SceneCamera;

use crate::{FrameRenderer, GpuBackend, RenderContext, RenderError, SurfaceSpec};

/// The spinning sphere: a render context plus the rotation fed into its transform.
pub struct SphereScene<B: GpuBackend> {
    context: RenderContext<B>,
    camera: SceneCamera,
    rotation: f32,
}

impl<B: GpuBackend> SphereScene<B> {
    pub fn new(context: RenderContext<B>) -> Self {
        Self {
            context,
            camera: SceneCamera::default(),
            rotation: 0.0,
        }
    }

    /// Angle driving the coupled Y/X spin, in radians.
    pub fn set_rotation(&mut self, rotation: f32) {
        self.rotation = rotation;
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn resize(&mut self, surface: SurfaceSpec) -> Result<(), RenderError> {
        self.context.resize(surface)
    }

    pub fn context(&self) -> &RenderContext<B> {
        &self.context
    }

    pub fn into_context(self) -> RenderContext<B> {
        self.context
    }
}

impl<B: GpuBackend> FrameRenderer for SphereScene<B> {
    fn render_frame(&mut self, _frame: u64) -> Result<(), RenderError> {
        let transform = self
            .camera
            .transform(self.context.aspect(), self.rotation)
            .map_err(|e| RenderError::FrameRender(e.to_string()))?;
        self.context.draw(&transform)
    }
}
