//! Mapping from backend-agnostic descriptors to wgpu types.

use battleball_render::{
    BufferUsage, CullMode, DepthTest, Topology, VertexAttribute, VertexFormat,
};

/// Format of the depth target the backend keeps alongside the surface.
pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

pub(crate) fn buffer_usage(usage: BufferUsage) -> wgpu::BufferUsages {
    let binding = match usage {
        BufferUsage::Vertex => wgpu::BufferUsages::VERTEX,
        BufferUsage::Index => wgpu::BufferUsages::INDEX,
        BufferUsage::Uniform => wgpu::BufferUsages::UNIFORM,
    };
    binding | wgpu::BufferUsages::COPY_DST
}

pub(crate) fn vertex_format(format: VertexFormat) -> wgpu::VertexFormat {
    match format {
        VertexFormat::Float32x3 => wgpu::VertexFormat::Float32x3,
    }
}

pub(crate) fn vertex_attributes(attributes: &[VertexAttribute]) -> Vec<wgpu::VertexAttribute> {
    attributes
        .iter()
        .map(|a| wgpu::VertexAttribute {
            format: vertex_format(a.format),
            offset: a.offset,
            shader_location: a.location,
        })
        .collect()
}

pub(crate) fn topology(topology: Topology) -> wgpu::PrimitiveTopology {
    match topology {
        Topology::TriangleList => wgpu::PrimitiveTopology::TriangleList,
    }
}

pub(crate) fn cull_mode(mode: CullMode) -> Option<wgpu::Face> {
    match mode {
        CullMode::None => None,
        CullMode::Front => Some(wgpu::Face::Front),
        CullMode::Back => Some(wgpu::Face::Back),
    }
}

pub(crate) fn depth_stencil(test: DepthTest) -> Option<wgpu::DepthStencilState> {
    match test {
        DepthTest::Disabled => None,
        DepthTest::Less => Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: Default::default(),
            bias: Default::default(),
        }),
    }
}

pub(crate) fn clear_color([r, g, b, a]: [f64; 4]) -> wgpu::Color {
    wgpu::Color { r, g, b, a }
}
