//! Geometry: procedural meshes uploaded by the render backend.
//!
//! # Invariants
//! - Vertices are interleaved `[x, y, z, r, g, b]`, 24 bytes each.
//! - `indices.len()` is a multiple of 3 and every index addresses a vertex.
//! - A mesh never exceeds the range of 16-bit indices.

mod mesh;
mod sphere;

pub use mesh::{
    COLOR_OFFSET, FLOATS_PER_VERTEX, MAX_VERTICES, Mesh, POSITION_OFFSET, VERTEX_STRIDE,
};
pub use sphere::{MAX_SEGMENTS, SphereParams, generate_sphere};

/// Errors raised while building geometry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}
