use crate::GeometryError;

/// Floats per interleaved vertex: position xyz followed by color rgb.
pub const FLOATS_PER_VERTEX: usize = 6;
/// Bytes per interleaved vertex.
pub const VERTEX_STRIDE: u64 = (FLOATS_PER_VERTEX * std::mem::size_of::<f32>()) as u64;
/// Byte offset of the position attribute.
pub const POSITION_OFFSET: u64 = 0;
/// Byte offset of the color attribute.
pub const COLOR_OFFSET: u64 = (3 * std::mem::size_of::<f32>()) as u64;
/// Largest vertex count addressable with `u16` indices.
pub const MAX_VERTICES: usize = u16::MAX as usize + 1;

/// CPU-side triangle mesh with interleaved vertex data and 16-bit indices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<f32>,
    pub indices: Vec<u16>,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / FLOATS_PER_VERTEX
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Vertex data as bytes, ready for upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Index data as bytes, ready for upload.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    pub fn position(&self, vertex: usize) -> Option<[f32; 3]> {
        let base = vertex * FLOATS_PER_VERTEX;
        self.vertices
            .get(base..base + 3)
            .map(|p| [p[0], p[1], p[2]])
    }

    pub fn color(&self, vertex: usize) -> Option<[f32; 3]> {
        let base = vertex * FLOATS_PER_VERTEX + 3;
        self.vertices
            .get(base..base + 3)
            .map(|c| [c[0], c[1], c[2]])
    }

    /// Check the layout and index invariants.
    pub fn validate(&self) -> Result<(), GeometryError> {
        if self.vertices.len() % FLOATS_PER_VERTEX != 0 {
            return Err(GeometryError::InvalidParameter(format!(
                "vertex data length {} is not a multiple of {FLOATS_PER_VERTEX}",
                self.vertices.len()
            )));
        }
        let vertex_count = self.vertex_count();
        if vertex_count > MAX_VERTICES {
            return Err(GeometryError::InvalidParameter(format!(
                "{vertex_count} vertices exceed the 16-bit index range"
            )));
        }
        if self.indices.len() % 3 != 0 {
            return Err(GeometryError::InvalidParameter(format!(
                "index count {} is not a multiple of 3",
                self.indices.len()
            )));
        }
        if let Some(bad) = self
            .indices
            .iter()
            .find(|&&i| i as usize >= vertex_count)
        {
            return Err(GeometryError::InvalidParameter(format!(
                "index {bad} out of range for {vertex_count} vertices"
            )));
        }
        Ok(())
    }
}
