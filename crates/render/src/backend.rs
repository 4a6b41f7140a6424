use std::future::Future;

use battleball_common::PhysicalSize;

use crate::RenderError;

/// What a buffer is bound as. Every buffer is also host-writable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    Vertex,
    Index,
    Uniform,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexFormat {
    Float32x3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub location: u32,
    pub offset: u64,
    pub format: VertexFormat,
}

/// Interleaved vertex buffer layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexLayout<'a> {
    pub stride: u64,
    pub attributes: &'a [VertexAttribute],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    TriangleList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullMode {
    None,
    Front,
    Back,
}

/// Hidden-surface removal for a pipeline. When enabled the backend keeps a
/// depth target sized with the surface and clears it every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthTest {
    Disabled,
    /// Keep fragments nearer than what is already stored.
    Less,
}

/// Everything needed to build one render pipeline.
#[derive(Debug, Clone, Copy)]
pub struct PipelineDesc<'a, F> {
    pub label: &'a str,
    pub shader_source: &'a str,
    pub vertex_entry: &'a str,
    pub fragment_entry: &'a str,
    pub vertex_layout: VertexLayout<'a>,
    pub target_format: F,
    pub topology: Topology,
    pub cull_mode: CullMode,
    pub depth_test: DepthTest,
}

/// Resources bound for a single indexed draw.
pub struct FrameDraw<'a, B: GpuBackend + ?Sized> {
    pub pipeline: &'a B::Pipeline,
    pub vertex_buffer: &'a B::Buffer,
    pub index_buffer: &'a B::Buffer,
    pub index_count: u32,
    pub clear_color: [f64; 4],
}

/// Graphics API operations used by render setup and the frame loop.
///
/// Methods are listed in the order setup calls them.
pub trait GpuBackend {
    type Adapter;
    type Device;
    type Buffer;
    type Pipeline;
    type Format: Copy + std::fmt::Debug;

    /// Resolve a physical adapter compatible with the surface, if any.
    fn request_adapter(&mut self) -> impl Future<Output = Option<Self::Adapter>>;

    fn request_device(
        &mut self,
        adapter: &Self::Adapter,
    ) -> impl Future<Output = Result<Self::Device, RenderError>>;

    /// The platform's preferred presentation format for the surface.
    fn preferred_format(&self, adapter: &Self::Adapter) -> Self::Format;

    /// Bind the surface to the device at the given pixel size.
    fn configure_surface(
        &mut self,
        device: &Self::Device,
        format: Self::Format,
        size: PhysicalSize,
    ) -> Result<(), RenderError>;

    /// Allocate a buffer sized to `contents` and upload it immediately.
    fn create_buffer(
        &mut self,
        device: &Self::Device,
        label: &str,
        contents: &[u8],
        usage: BufferUsage,
    ) -> Self::Buffer;

    /// Compile the shader and build the pipeline, binding `uniforms` at group 0.
    fn create_pipeline(
        &mut self,
        device: &Self::Device,
        desc: &PipelineDesc<'_, Self::Format>,
        uniforms: &Self::Buffer,
    ) -> impl Future<Output = Result<Self::Pipeline, RenderError>>;

    fn write_buffer(&mut self, device: &Self::Device, buffer: &Self::Buffer, offset: u64, data: &[u8]);

    /// Record, submit and present one frame.
    fn draw_frame(&mut self, device: &Self::Device, frame: &FrameDraw<'_, Self>)
    -> Result<(), RenderError>;
}
