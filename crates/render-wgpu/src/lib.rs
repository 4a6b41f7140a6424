//! wgpu render backend for the battleball client.
//!
//! Implements [`battleball_render::GpuBackend`] on top of wgpu and ships the
//! flat vertex-color WGSL shader.
//!
//! # Invariants
//! - The surface format chosen at setup is the pipeline's only target format.
//! - Frame-time validation errors are captured and reported, never panicked on.

mod convert;
mod gpu;
mod shaders;

pub use gpu::{WgpuBackend, WgpuDevice, WgpuPipeline};
pub use shaders::SPHERE_SHADER;
