use battleball_common::{LogicalSize, PhysicalSize};
use battleball_geometry::{COLOR_OFFSET, POSITION_OFFSET, VERTEX_STRIDE, generate_sphere};
use battleball_transform::{IDENTITY, Mat4, transpose};

use crate::backend::{
    BufferUsage, CullMode, DepthTest, FrameDraw, GpuBackend, PipelineDesc, Topology,
    VertexAttribute, VertexFormat, VertexLayout,
};
use crate::{RenderConfig, RenderError};

/// Vertex and fragment entry points expected in the sphere shader.
pub const SPHERE_SHADER_ENTRY_POINTS: (&str, &str) = ("vs_main", "fs_main");

const SPHERE_ATTRIBUTES: [VertexAttribute; 2] = [
    VertexAttribute {
        location: 0,
        offset: POSITION_OFFSET,
        format: VertexFormat::Float32x3,
    },
    VertexAttribute {
        location: 1,
        offset: COLOR_OFFSET,
        format: VertexFormat::Float32x3,
    },
];

/// Layout of the interleaved position/color sphere vertices.
pub fn sphere_vertex_layout() -> VertexLayout<'static> {
    VertexLayout {
        stride: VERTEX_STRIDE,
        attributes: &SPHERE_ATTRIBUTES,
    }
}

/// The drawable handed over by the host UI layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSpec {
    pub logical: LogicalSize,
    /// Device pixels per logical unit.
    pub scale_factor: f64,
}

impl SurfaceSpec {
    pub fn new(logical: LogicalSize, scale_factor: f64) -> Self {
        Self {
            logical,
            scale_factor,
        }
    }

    /// Drawable size in device pixels: logical size times pixel density.
    pub fn physical_size(&self) -> PhysicalSize {
        self.logical.to_physical(self.scale_factor)
    }
}

/// Owns every GPU handle used to draw the sphere.
///
/// Built once by [`RenderContext::initialize`]; the frame loop only reads the
/// handles, apart from rewriting the transform uniform each frame.
pub struct RenderContext<B: GpuBackend> {
    backend: B,
    device: B::Device,
    format: B::Format,
    size: PhysicalSize,
    pipeline: B::Pipeline,
    vertex_buffer: B::Buffer,
    index_buffer: B::Buffer,
    uniform_buffer: B::Buffer,
    vertex_count: u32,
    index_count: u32,
    clear_color: [f64; 4],
}

impl<B: GpuBackend> RenderContext<B> {
    /// Acquire the device, configure the surface and allocate all resources.
    ///
    /// Takes the backend by value, so one surface can only have one
    /// initialization in flight.
    pub async fn initialize(
        mut backend: B,
        surface: SurfaceSpec,
        config: &RenderConfig,
        shader_source: &str,
    ) -> Result<Self, RenderError> {
        config.sphere.validate()?;

        let adapter = backend.request_adapter().await.ok_or_else(|| {
            tracing::error!("no graphics adapter available, aborting render setup");
            RenderError::DeviceUnavailable
        })?;

        let device = backend.request_device(&adapter).await?;

        let format = backend.preferred_format(&adapter);
        tracing::info!(?format, "surface format selected");

        let size = surface.physical_size();
        if size.is_empty() {
            tracing::error!(
                logical_width = surface.logical.width,
                logical_height = surface.logical.height,
                scale_factor = surface.scale_factor,
                "surface has zero area, aborting render setup"
            );
            return Err(RenderError::SurfaceInvalid {
                width: size.width,
                height: size.height,
            });
        }
        backend.configure_surface(&device, format, size)?;
        tracing::info!(width = size.width, height = size.height, "surface configured");

        let mesh = generate_sphere(config.sphere.radius, config.sphere.segments)?;
        let vertex_buffer = backend.create_buffer(
            &device,
            "sphere_vertex_buffer",
            mesh.vertex_bytes(),
            BufferUsage::Vertex,
        );
        let index_buffer = backend.create_buffer(
            &device,
            "sphere_index_buffer",
            mesh.index_bytes(),
            BufferUsage::Index,
        );
        let uniform_buffer = backend.create_buffer(
            &device,
            "transform_uniform_buffer",
            bytemuck::bytes_of(&transpose(&IDENTITY)),
            BufferUsage::Uniform,
        );
        tracing::info!(
            vertex_bytes = mesh.vertex_bytes().len(),
            index_bytes = mesh.index_bytes().len(),
            "mesh buffers uploaded"
        );

        let (vertex_entry, fragment_entry) = SPHERE_SHADER_ENTRY_POINTS;
        let desc = PipelineDesc {
            label: "sphere_pipeline",
            shader_source,
            vertex_entry,
            fragment_entry,
            vertex_layout: sphere_vertex_layout(),
            target_format: format,
            topology: Topology::TriangleList,
            cull_mode: CullMode::None,
            depth_test: DepthTest::Less,
        };
        let pipeline = backend
            .create_pipeline(&device, &desc, &uniform_buffer)
            .await?;
        tracing::info!("render pipeline ready");

        Ok(Self {
            backend,
            device,
            format,
            size,
            pipeline,
            vertex_buffer,
            index_buffer,
            uniform_buffer,
            vertex_count: mesh.vertex_count() as u32,
            index_count: mesh.index_count() as u32,
            clear_color: config.clear_color,
        })
    }

    /// Reconfigure the surface for a new drawable size.
    ///
    /// Zero-area sizes (e.g. a minimized window) are rejected and the
    /// previous configuration stays in place.
    pub fn resize(&mut self, surface: SurfaceSpec) -> Result<(), RenderError> {
        let size = surface.physical_size();
        if size.is_empty() {
            return Err(RenderError::SurfaceInvalid {
                width: size.width,
                height: size.height,
            });
        }
        if size == self.size {
            return Ok(());
        }
        self.backend
            .configure_surface(&self.device, self.format, size)?;
        tracing::debug!(width = size.width, height = size.height, "surface resized");
        self.size = size;
        Ok(())
    }

    /// Upload `transform` (row-major) and draw one frame.
    pub fn draw(&mut self, transform: &Mat4) -> Result<(), RenderError> {
        let columns = transpose(transform);
        self.backend.write_buffer(
            &self.device,
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&columns),
        );
        self.backend.draw_frame(
            &self.device,
            &FrameDraw {
                pipeline: &self.pipeline,
                vertex_buffer: &self.vertex_buffer,
                index_buffer: &self.index_buffer,
                index_count: self.index_count,
                clear_color: self.clear_color,
            },
        )
    }

    /// Release the pipeline, the buffers and then the device, in that order.
    pub fn teardown(self) -> B {
        let Self {
            backend,
            device,
            pipeline,
            vertex_buffer,
            index_buffer,
            uniform_buffer,
            ..
        } = self;
        drop(pipeline);
        drop(uniform_buffer);
        drop(index_buffer);
        drop(vertex_buffer);
        drop(device);
        tracing::info!("render context torn down");
        backend
    }

    pub fn size(&self) -> PhysicalSize {
        self.size
    }

    pub fn aspect(&self) -> f32 {
        self.size.aspect()
    }

    pub fn format(&self) -> B::Format {
        self.format
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}
