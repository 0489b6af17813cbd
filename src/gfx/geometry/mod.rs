//! # Procedural Geometry
//!
//! Generates the placeholder sphere that stands in for the host's model
//! until one is provided. Geometry is plain data ready for GPU upload.

pub mod primitives;

pub use primitives::*;

/// Represents generated geometry data ready for GPU upload
#[derive(Debug, Clone)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl GeometryData {
    /// Create a new empty geometry data structure
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Get the number of vertices in this geometry
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of triangles in this geometry
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Convert to the vertex format used by the renderer
    pub fn to_vertex_format(&self) -> (Vec<crate::gfx::scene::vertex::Vertex3D>, Vec<u32>) {
        use crate::gfx::scene::vertex::Vertex3D;

        let vertices: Vec<Vertex3D> = (0..self.vertices.len())
            .map(|i| Vertex3D {
                position: self.vertices[i],
                normal: self.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
            })
            .collect();

        (vertices, self.indices.clone())
    }
}

impl Default for GeometryData {
    fn default() -> Self {
        Self::new()
    }
}
