//! Transform library: pure matrix/vector math over fixed-size arrays.
//!
//! Matrices are `[f32; 16]` in row-major order (`m[row * 4 + col]`) using
//! the column-vector convention, so a composed transform reads
//! `projection * view * model`. WGSL expects column-major data; upload
//! [`transpose`]d matrices.
//!
//! # Invariants
//! - No shared state; every function is pure.
//! - Degenerate inputs are reported, never turned into NaN matrices.

mod camera;
mod matrix;
mod vector;

pub use camera::{SceneCamera, transformation_matrix};
pub use matrix::{
    IDENTITY, Mat4, identity, look_at, multiply, perspective, rotate_x, rotate_y, transform_point,
    transpose,
};
pub use vector::{Vec3, cross, dot, normalize};

/// Errors from building projection or view matrices.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransformError {
    #[error("invalid projection: {0}")]
    InvalidProjection(String),
    #[error("degenerate view basis: up vector is parallel to the view direction")]
    DegenerateBasis,
}
