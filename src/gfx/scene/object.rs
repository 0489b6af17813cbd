use wgpu::Device;

use super::vertex::Vertex3D;
use crate::gfx::geometry::GeometryData;

/// An already-loaded model handed over by the host
///
/// The viewer never parses model files; decoding happens off the frame
/// callback path on the host's side, and the finished bundle arrives here.
#[derive(Debug, Clone)]
pub struct ModelAsset {
    pub name: String,
    pub geometry: GeometryData,
}

impl ModelAsset {
    pub fn new(name: &str, geometry: GeometryData) -> Self {
        Self {
            name: name.to_string(),
            geometry,
        }
    }
}

/// Mesh geometry with lazily-created GPU buffers
///
/// Constructed from plain geometry at scene mount; buffers are uploaded
/// once a device exists and dropped with the mesh on unmount.
pub struct Mesh {
    vertices: Vec<Vertex3D>,
    indices: Vec<u32>,
    vertex_buffer: Option<wgpu::Buffer>,
    index_buffer: Option<wgpu::Buffer>,
    index_count: u32,
}

impl Mesh {
    pub fn from_geometry(geometry: &GeometryData) -> Self {
        let (vertices, indices) = geometry.to_vertex_format();
        let index_count = indices.len() as u32;

        Self {
            vertices,
            indices,
            vertex_buffer: None,
            index_buffer: None,
            index_count,
        }
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// True once vertex and index buffers live on the GPU.
    pub fn is_uploaded(&self) -> bool {
        self.vertex_buffer.is_some() && self.index_buffer.is_some()
    }

    /// Uploads vertex and index buffers. Idempotent; re-upload only happens
    /// after `replace_geometry` cleared the buffers.
    pub fn init_gpu_resources(&mut self, device: &Device) {
        if self.is_uploaded() {
            return;
        }

        let vertex_buffer = wgpu::util::DeviceExt::create_buffer_init(
            device,
            &wgpu::util::BufferInitDescriptor {
                label: Some("Vertex Buffer"),
                contents: bytemuck::cast_slice(&self.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            },
        );

        let index_buffer = wgpu::util::DeviceExt::create_buffer_init(
            device,
            &wgpu::util::BufferInitDescriptor {
                label: Some("Index Buffer"),
                contents: bytemuck::cast_slice(&self.indices),
                usage: wgpu::BufferUsages::INDEX,
            },
        );

        self.vertex_buffer = Some(vertex_buffer);
        self.index_buffer = Some(index_buffer);
    }

    /// Swaps in new geometry and clears the stale GPU buffers; the next
    /// `init_gpu_resources` call re-uploads.
    pub fn replace_geometry(&mut self, geometry: &GeometryData) {
        let (vertices, indices) = geometry.to_vertex_format();
        self.index_count = indices.len() as u32;
        self.vertices = vertices;
        self.indices = indices;
        self.vertex_buffer = None;
        self.index_buffer = None;
    }
}

pub trait DrawMesh<'a> {
    fn draw_mesh(&mut self, mesh: &'a Mesh);
}

impl<'a, 'b> DrawMesh<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh(&mut self, mesh: &'b Mesh) {
        let vertex_buffer = match &mesh.vertex_buffer {
            Some(buffer) => buffer,
            None => return, // Skip drawing if not uploaded
        };
        let index_buffer = match &mesh.index_buffer {
            Some(buffer) => buffer,
            None => return,
        };

        self.set_vertex_buffer(0, vertex_buffer.slice(..));
        self.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.index_count, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::generate_sphere;

    #[test]
    fn test_mesh_from_geometry_counts() {
        let geometry = generate_sphere(8, 6);
        let mesh = Mesh::from_geometry(&geometry);
        assert_eq!(mesh.vertex_count() as usize, geometry.vertex_count());
        assert_eq!(mesh.index_count() as usize, geometry.indices.len());
        assert!(!mesh.is_uploaded());
    }

    #[test]
    fn test_replace_geometry_clears_upload_state() {
        let mut mesh = Mesh::from_geometry(&generate_sphere(8, 6));
        let denser = generate_sphere(16, 12);
        mesh.replace_geometry(&denser);
        assert_eq!(mesh.index_count() as usize, denser.indices.len());
        assert!(!mesh.is_uploaded());
    }
}
