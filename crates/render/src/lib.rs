//! Render core: GPU resource setup and the per-frame render loop.
//!
//! The setup sequence and the scheduler are written against the
//! [`GpuBackend`] trait; `battleball-render-wgpu` supplies the wgpu
//! implementation.
//!
//! # Invariants
//! - Setup steps run strictly in order and stop at the first failure.
//! - GPU handles are created once and owned by [`RenderContext`].
//! - One failed frame never stops the loop; only a run of
//!   `max_consecutive_failures` failures does.

mod backend;
mod config;
mod context;
mod error;
mod scene;
mod scheduler;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{
    BufferUsage, CullMode, DepthTest, FrameDraw, GpuBackend, PipelineDesc, Topology, VertexAttribute,
    VertexFormat, VertexLayout,
};
pub use config::RenderConfig;
pub use context::{RenderContext, SPHERE_SHADER_ENTRY_POINTS, SurfaceSpec, sphere_vertex_layout};
pub use error::RenderError;
pub use scene::SphereScene;
pub use scheduler::{
    BoundedTicker, FrameRenderer, FrameScheduler, IntervalTicker, SchedulerState, SchedulerStats,
    TickOutcome, Ticker,
};
