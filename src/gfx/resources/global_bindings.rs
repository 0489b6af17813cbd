//! Global uniform bindings for camera and stage data
//!
//! Manages the GPU uniform buffer and bind group for per-frame global state
//! shared by every pass: camera matrices, the mirrored capture matrix, and
//! the lighting stage's environment colors.

use cgmath::Matrix4;

use crate::{
    config::Rgb,
    gfx::{camera::camera_utils::CameraUniform, scene::node::LightNode, stage::LightingStage},
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

/// Global uniform buffer content structure
///
/// Contains all per-frame global data the shaders read. MUST match the
/// Globals struct in the WGSL sources exactly.
#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct GlobalUBOContent {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
    /// View-projection of the camera mirrored about the reflector plane
    mirror_view_proj: [[f32; 4]; 4],

    // Stage lighting. Each color packs a spare scalar into .w to satisfy
    // the 16 byte alignment requirement.
    zenith: [f32; 3],
    environment_intensity: f32,
    horizon: [f32; 3],
    _pad0: f32,
    ground: [f32; 3],
    _pad1: f32,
    ambient: [f32; 3],
    _pad2: f32,
    key_direction: [f32; 3],
    _pad3: f32,
    key_color: [f32; 3],
    _pad4: f32,
    background: [f32; 3],
    _pad5: f32,
}

unsafe impl bytemuck::Pod for GlobalUBOContent {}
unsafe impl bytemuck::Zeroable for GlobalUBOContent {}

/// Type alias for the global uniform buffer
pub type GlobalUBO = UniformBuffer<GlobalUBOContent>;

fn pack(color: Rgb) -> [f32; 3] {
    color.to_array()
}

/// Updates the global uniform buffer with camera and stage data
///
/// Called once per frame before any pass is encoded so that the capture,
/// blur and main passes all observe the same state. The key light comes
/// from the scene's light node when one exists, falling back to the
/// stage's own preset light.
pub fn update_global_ubo(
    ubo: &mut GlobalUBO,
    queue: &wgpu::Queue,
    camera: CameraUniform,
    mirror_view_proj: Matrix4<f32>,
    stage: &LightingStage,
    key_light: Option<&LightNode>,
) {
    let colors = stage.colors();
    let (key_direction, key_color) = match key_light {
        Some(light) => (light.direction, light.color),
        None => (colors.key_direction, stage.key_light()),
    };

    let content = GlobalUBOContent {
        view_position: camera.view_position,
        view_proj: camera.view_proj,
        mirror_view_proj: mirror_view_proj.into(),

        zenith: pack(colors.zenith),
        environment_intensity: stage.intensity,
        horizon: pack(colors.horizon),
        _pad0: 0.0,
        ground: pack(colors.ground),
        _pad1: 0.0,
        ambient: pack(stage.ambient_light()),
        _pad2: 0.0,
        key_direction,
        _pad3: 0.0,
        key_color: pack(key_color),
        _pad4: 0.0,
        background: pack(stage.background),
        _pad5: 0.0,
    };

    ubo.update_content(queue, content);
}

/// Manages bind group layouts and bind groups for global uniforms
///
/// Bound to slot 0 in every render pipeline.
pub struct GlobalBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: Option<wgpu::BindGroup>,
}

impl GlobalBindings {
    /// Creates a new global bindings manager
    ///
    /// Sets up the bind group layout for global uniforms but doesn't
    /// create the actual bind group until `create_bind_group()` is called.
    pub fn new(device: &wgpu::Device) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(device, "Globals Bind Group");

        GlobalBindings {
            bind_group_layout,
            bind_group: None,
        }
    }

    /// Creates the bind group with the provided uniform buffer
    pub fn create_bind_group(&mut self, device: &wgpu::Device, ubo: &GlobalUBO) {
        self.bind_group = Some(
            BindGroupBuilder::new(&self.bind_group_layout)
                .resource(ubo.binding_resource())
                .create(device, "Global Bind Group"),
        );
    }

    /// Returns the bind group layout for pipeline creation
    pub fn bind_group_layouts(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    /// Returns the bind group for rendering
    ///
    /// # Panics
    /// Panics if `create_bind_group()` hasn't been called yet
    pub fn bind_groups(&self) -> &wgpu::BindGroup {
        self.bind_group
            .as_ref()
            .expect("Bind group has not been created yet!")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_ubo_content_size_and_alignment() {
        // 16 + 64 + 64 + 7 * 16 = 256 bytes, all fields 16-byte aligned
        assert_eq!(std::mem::size_of::<GlobalUBOContent>(), 256);
        assert_eq!(std::mem::size_of::<GlobalUBOContent>() % 16, 0);
    }
}
