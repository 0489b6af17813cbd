//! Offscreen resources for the two-pass reflection effect
//!
//! Pass one renders the scene from a camera mirrored about the reflector
//! plane into a square capture buffer. Pass two runs a separable Gaussian
//! blur over the capture; the mesh composite then blends sharp and blurred
//! reads. All buffers here are charged against a ledger so teardown can be
//! verified - unmount must leave nothing allocated.

use wgpu::Device;

use crate::gfx::resources::{reflector::ReflectorParams, texture_resource::TextureResource};
use crate::wgpu_utils::{
    binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
    binding_types,
    uniform_buffer::UniformBuffer,
};

/// Height of the horizontal plane the capture camera mirrors about.
pub const REFLECTOR_PLANE_Y: f32 = 0.0;

/// Counts live backend-allocated buffers
///
/// Charged when offscreen targets are created and discharged when they are
/// released, so a mount/unmount cycle is verifiable: the live count after N
/// cycles must equal the count after one.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BufferLedger {
    live: usize,
    allocated_total: usize,
}

impl BufferLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn charge(&mut self, count: usize) {
        self.live += count;
        self.allocated_total += count;
    }

    pub fn discharge(&mut self, count: usize) {
        debug_assert!(count <= self.live, "released more buffers than allocated");
        self.live = self.live.saturating_sub(count);
    }

    /// Buffers currently allocated.
    pub fn live(&self) -> usize {
        self.live
    }

    /// Buffers ever allocated, monotonic.
    pub fn allocated_total(&self) -> usize {
        self.allocated_total
    }
}

/// Per-direction blur parameters
///
/// MUST match the BlurParams struct in the blur shader exactly.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BlurUniform {
    pub direction: [f32; 2],
    pub radius: f32,
    pub inv_resolution: f32,
}

type BlurUBO = UniformBuffer<BlurUniform>;

/// The offscreen targets and blur plumbing for one reflector
///
/// Sized `resolution` x `resolution` from the material descriptor. Capture
/// holds the mirrored-camera render, `blur_a` the horizontal blur and
/// `blur_b` the final separable result the composite samples.
pub struct ReflectionTargets {
    pub capture: TextureResource,
    pub blur_a: TextureResource,
    pub blur_b: TextureResource,
    pub resolution: u32,
    blur_layout: BindGroupLayoutWithDesc,
    blur_h_bind_group: wgpu::BindGroup,
    blur_v_bind_group: wgpu::BindGroup,
    // Kept alive for the bind groups above
    _blur_h_ubo: BlurUBO,
    _blur_v_ubo: BlurUBO,
}

impl ReflectionTargets {
    /// Offscreen buffers one reflector owns (capture + two blur targets).
    pub const BUFFER_COUNT: usize = 3;

    pub fn new(device: &Device, params: &ReflectorParams, ledger: &mut BufferLedger) -> Self {
        let resolution = params.resolution.max(1);
        let capture =
            TextureResource::create_reflection_target(device, resolution, "Reflection Capture");
        let blur_a = TextureResource::create_reflection_target(device, resolution, "Blur A");
        let blur_b = TextureResource::create_reflection_target(device, resolution, "Blur B");
        ledger.charge(Self::BUFFER_COUNT);

        let blur_layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::uniform())
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
            .create(device, "Blur Layout");

        let inv_resolution = 1.0 / resolution as f32;
        let blur_h_ubo = BlurUBO::new_with_data(
            device,
            &BlurUniform {
                direction: [1.0, 0.0],
                radius: params.blur.0 as f32,
                inv_resolution,
            },
        );
        let blur_v_ubo = BlurUBO::new_with_data(
            device,
            &BlurUniform {
                direction: [0.0, 1.0],
                radius: params.blur.1 as f32,
                inv_resolution,
            },
        );

        let blur_h_bind_group = BindGroupBuilder::new(&blur_layout)
            .resource(blur_h_ubo.binding_resource())
            .texture(&capture.view)
            .sampler(&capture.sampler)
            .create(device, "Blur H Bind Group");

        let blur_v_bind_group = BindGroupBuilder::new(&blur_layout)
            .resource(blur_v_ubo.binding_resource())
            .texture(&blur_a.view)
            .sampler(&blur_a.sampler)
            .create(device, "Blur V Bind Group");

        Self {
            capture,
            blur_a,
            blur_b,
            resolution,
            blur_layout,
            blur_h_bind_group,
            blur_v_bind_group,
            _blur_h_ubo: blur_h_ubo,
            _blur_v_ubo: blur_v_ubo,
        }
    }

    pub fn blur_bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.blur_layout.layout
    }

    pub fn blur_h_bind_group(&self) -> &wgpu::BindGroup {
        &self.blur_h_bind_group
    }

    pub fn blur_v_bind_group(&self) -> &wgpu::BindGroup {
        &self.blur_v_bind_group
    }

    /// Releases the offscreen buffers, discharging the ledger. The GPU
    /// resources drop with `self`.
    pub fn release(self, ledger: &mut BufferLedger) {
        ledger.discharge(Self::BUFFER_COUNT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_charge_discharge() {
        let mut ledger = BufferLedger::new();
        ledger.charge(3);
        assert_eq!(ledger.live(), 3);
        ledger.discharge(3);
        assert_eq!(ledger.live(), 0);
        assert_eq!(ledger.allocated_total(), 3);
    }

    #[test]
    fn test_mount_unmount_cycles_do_not_leak() {
        // One cycle
        let mut ledger = BufferLedger::new();
        ledger.charge(ReflectionTargets::BUFFER_COUNT);
        ledger.discharge(ReflectionTargets::BUFFER_COUNT);
        let after_one = ledger.live();

        // Many cycles
        let mut ledger = BufferLedger::new();
        for _ in 0..32 {
            ledger.charge(ReflectionTargets::BUFFER_COUNT);
            ledger.discharge(ReflectionTargets::BUFFER_COUNT);
        }
        assert_eq!(ledger.live(), after_one);
        assert_eq!(ledger.live(), 0);
    }

    #[test]
    fn test_blur_uniform_layout() {
        assert_eq!(std::mem::size_of::<BlurUniform>(), 16);
    }
}
