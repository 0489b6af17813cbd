//! # Vertex Data Structures
//!
//! GPU-compatible vertex formats for mesh rendering.

/// A 3D vertex with position and normal data.
///
/// The `#[repr(C)]` attribute ensures the struct has a C-compatible memory
/// layout, which is required for GPU buffer operations.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3D {
    /// 3D position coordinates [x, y, z]
    pub position: [f32; 3],
    /// 3D normal vector [nx, ny, nz] for lighting calculations
    pub normal: [f32; 3],
}

impl Vertex3D {
    /// Returns the vertex buffer layout for wgpu rendering.
    ///
    /// - Attribute 0: Position (Float32x3) at shader location 0
    /// - Attribute 1: Normal (Float32x3) at shader location 1
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex3D>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}
