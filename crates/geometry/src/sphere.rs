use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

use crate::GeometryError;
use crate::mesh::{FLOATS_PER_VERTEX, MAX_VERTICES, Mesh};

/// Largest segment count whose `(segments + 1)^2` vertices fit 16-bit indices.
pub const MAX_SEGMENTS: u32 = 255;

/// Radius and tessellation of the sphere mesh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SphereParams {
    pub radius: f32,
    /// Latitude rings and longitude steps (the same count is used for both).
    pub segments: u32,
}

impl Default for SphereParams {
    fn default() -> Self {
        Self {
            radius: 0.5,
            segments: 20,
        }
    }
}

impl SphereParams {
    pub fn new(radius: f32, segments: u32) -> Self {
        Self { radius, segments }
    }

    /// Reject parameters that cannot produce a valid 16-bit indexed mesh.
    pub fn validate(&self) -> Result<(), GeometryError> {
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(GeometryError::InvalidParameter(format!(
                "radius must be positive and finite, got {}",
                self.radius
            )));
        }
        if self.segments == 0 {
            return Err(GeometryError::InvalidParameter(
                "segments must be at least 1".into(),
            ));
        }
        if self.segments > MAX_SEGMENTS {
            return Err(GeometryError::InvalidParameter(format!(
                "{} segments produce {} vertices, limit is {MAX_VERTICES}",
                self.segments,
                self.vertex_count()
            )));
        }
        Ok(())
    }

    /// Saturates instead of overflowing for out-of-range segment counts.
    pub fn vertex_count(&self) -> usize {
        let row = (self.segments as usize).saturating_add(1);
        row.saturating_mul(row)
    }

    pub fn index_count(&self) -> usize {
        let segments = self.segments as usize;
        segments.saturating_mul(segments).saturating_mul(6)
    }
}

/// Generate a UV sphere centered at the origin.
///
/// Rings run from the north pole (+Y) to the south pole, each with
/// `segments + 1` vertices so the seam column is duplicated. Colors map the
/// unit-sphere coordinates into `[0, 1]` per channel.
pub fn generate_sphere(radius: f32, segments: u32) -> Result<Mesh, GeometryError> {
    let params = SphereParams::new(radius, segments);
    params.validate()?;

    let mut vertices = Vec::with_capacity(params.vertex_count() * FLOATS_PER_VERTEX);
    let mut indices = Vec::with_capacity(params.index_count());

    for lat in 0..=segments {
        let theta = lat as f32 * PI / segments as f32;
        let (sin_theta, cos_theta) = theta.sin_cos();

        for lon in 0..=segments {
            let phi = lon as f32 * 2.0 * PI / segments as f32;
            let (sin_phi, cos_phi) = phi.sin_cos();

            let x = sin_theta * cos_phi;
            let y = cos_theta;
            let z = sin_theta * sin_phi;

            vertices.extend_from_slice(&[
                x * radius,
                y * radius,
                z * radius,
                (x + 1.0) * 0.5,
                (y + 1.0) * 0.5,
                (z + 1.0) * 0.5,
            ]);
        }
    }

    // validate() bounds the vertex count to the u16 range.
    let row = (segments + 1) as u16;
    for lat in 0..segments as u16 {
        for lon in 0..segments as u16 {
            let first = lat * row + lon;
            let second = first + row;

            indices.extend_from_slice(&[first, second, first + 1]);
            indices.extend_from_slice(&[second, second + 1, first + 1]);
        }
    }

    tracing::debug!(
        radius,
        segments,
        vertices = vertices.len() / FLOATS_PER_VERTEX,
        indices = indices.len(),
        "generated sphere mesh"
    );

    Ok(Mesh { vertices, indices })
}
