use battleball_geometry::GeometryError;

/// Errors from render setup and per-frame rendering.
///
/// Everything except `FrameRender` is fatal for the surface being set up.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    #[error("no suitable graphics adapter available")]
    DeviceUnavailable,

    #[error("device error: {0}")]
    Device(String),

    #[error("surface has zero area ({width}x{height})")]
    SurfaceInvalid { width: u32, height: u32 },

    #[error("shader compilation failed: {0}")]
    ShaderCompile(String),

    #[error(transparent)]
    InvalidParameter(#[from] GeometryError),

    #[error("frame render failed: {0}")]
    FrameRender(String),
}

impl RenderError {
    /// Whether the error ends the surface's lifetime rather than a single frame.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, RenderError::FrameRender(_))
    }
}
