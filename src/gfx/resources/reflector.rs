//! Reflective surface material
//!
//! A pure render-state descriptor consumed by the reflection pass: blur
//! kernel, capture resolution, blur/sharp blend, opacity and tint. There is
//! no behavior here beyond clamping - out-of-range values are cosmetic
//! configuration and get clamped, not rejected.

use wgpu::Device;

use crate::config::Rgb;
use crate::error::ConfigIssue;
use crate::wgpu_utils::{
    binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
    binding_types,
    uniform_buffer::UniformBuffer,
};

/// GPU uniform data for the reflector composite pass
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ReflectorUniform {
    pub base_color: [f32; 4],
    pub mix_blur: f32,
    pub opacity: f32,
    pub blur_kernel: [f32; 2],
}

pub type ReflectorUBO = UniformBuffer<ReflectorUniform>;

/// Reflective surface material parameters
///
/// `resolution` sizes the square offscreen capture buffer; powers of two
/// are a backend efficiency hint, not a correctness requirement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReflectorParams {
    pub blur: (u32, u32),
    pub resolution: u32,
    pub mix_blur: f32,
    pub opacity: f32,
    pub base_color: Rgb,
}

impl Default for ReflectorParams {
    fn default() -> Self {
        Self {
            blur: (300, 100),
            resolution: 2048,
            mix_blur: 1.0,
            opacity: 0.5,
            base_color: Rgb::new(0.06, 0.06, 0.06),
        }
    }
}

impl ReflectorParams {
    pub fn new(
        blur: (u32, u32),
        resolution: u32,
        mix_blur: f32,
        opacity: f32,
        base_color: Rgb,
    ) -> Self {
        Self {
            blur,
            resolution,
            mix_blur,
            opacity,
            base_color,
        }
    }

    /// Builder pattern: Set the blur kernel
    pub fn with_blur(mut self, x: u32, y: u32) -> Self {
        self.blur = (x, y);
        self
    }

    /// Builder pattern: Set the capture resolution
    pub fn with_resolution(mut self, resolution: u32) -> Self {
        self.resolution = resolution;
        self
    }

    /// Builder pattern: Set the blurred/sharp blend factor
    pub fn with_mix_blur(mut self, mix_blur: f32) -> Self {
        self.mix_blur = mix_blur;
        self
    }

    /// Builder pattern: Set the reflection opacity
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    /// Builder pattern: Set the surface tint
    pub fn with_base_color(mut self, color: Rgb) -> Self {
        self.base_color = color;
        self
    }

    /// Clamps every parameter into its valid range, recording one issue per
    /// substituted value. Resolution must be at least 1.
    pub fn clamped(mut self, issues: &mut Vec<ConfigIssue>) -> Self {
        if self.resolution < 1 {
            issues.push(ConfigIssue::InvalidConfigValue {
                field: "reflector.resolution",
                supplied: format!("{}", self.resolution),
                substituted: "1".to_string(),
            });
            self.resolution = 1;
        }
        if !(0.0..=1.0).contains(&self.mix_blur) {
            let clamped = self.mix_blur.clamp(0.0, 1.0);
            issues.push(ConfigIssue::InvalidConfigValue {
                field: "reflector.mix_blur",
                supplied: format!("{}", self.mix_blur),
                substituted: format!("{}", clamped),
            });
            self.mix_blur = clamped;
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            let clamped = self.opacity.clamp(0.0, 1.0);
            issues.push(ConfigIssue::InvalidConfigValue {
                field: "reflector.opacity",
                supplied: format!("{}", self.opacity),
                substituted: format!("{}", clamped),
            });
            self.opacity = clamped;
        }
        self
    }

    pub fn to_uniform(&self) -> ReflectorUniform {
        ReflectorUniform {
            base_color: [
                self.base_color.r,
                self.base_color.g,
                self.base_color.b,
                1.0,
            ],
            mix_blur: self.mix_blur.clamp(0.0, 1.0),
            opacity: self.opacity.clamp(0.0, 1.0),
            blur_kernel: [self.blur.0 as f32, self.blur.1 as f32],
        }
    }
}

/// Bind group management for the reflector composite pass
///
/// Binds the material uniform plus the sharp and blurred reflection
/// captures the two-pass effect composites from.
pub struct ReflectorBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: Option<wgpu::BindGroup>,
}

impl ReflectorBindings {
    pub fn new(device: &Device) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::uniform())
            .next_binding_fragment(binding_types::texture_2d()) // sharp capture
            .next_binding_fragment(binding_types::texture_2d()) // blurred capture
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
            .create(device, "Reflector Bind Group");

        ReflectorBindings {
            bind_group_layout,
            bind_group: None,
        }
    }

    pub fn create_bind_group(
        &mut self,
        device: &Device,
        ubo: &ReflectorUBO,
        sharp_view: &wgpu::TextureView,
        blurred_view: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
    ) {
        self.bind_group = Some(
            BindGroupBuilder::new(&self.bind_group_layout)
                .resource(ubo.binding_resource())
                .texture(sharp_view)
                .texture(blurred_view)
                .sampler(sampler)
                .create(device, "Reflector Bind Group"),
        );
    }

    pub fn bind_group_layouts(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    pub fn bind_groups(&self) -> Option<&wgpu::BindGroup> {
        self.bind_group.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opacity_and_mix_blur_clamp_to_unit_range() {
        let mut issues = Vec::new();
        let params = ReflectorParams::default()
            .with_opacity(5.0)
            .with_mix_blur(-2.0)
            .clamped(&mut issues);
        assert_eq!(params.opacity, 1.0);
        assert_eq!(params.mix_blur, 0.0);
        assert_eq!(issues.len(), 2);
    }

    #[test]
    fn test_negative_opacity_clamps_to_zero() {
        let mut issues = Vec::new();
        let params = ReflectorParams::default().with_opacity(-2.0).clamped(&mut issues);
        assert_eq!(params.opacity, 0.0);
    }

    #[test]
    fn test_resolution_floor_is_one() {
        let mut issues = Vec::new();
        let params = ReflectorParams::default().with_resolution(0).clamped(&mut issues);
        assert_eq!(params.resolution, 1);
        assert!(issues
            .iter()
            .any(|i| matches!(i, ConfigIssue::InvalidConfigValue { field, .. } if *field == "reflector.resolution")));
    }

    #[test]
    fn test_in_range_params_untouched() {
        let mut issues = Vec::new();
        let params = ReflectorParams::default().clamped(&mut issues);
        assert!(issues.is_empty());
        assert_eq!(params, ReflectorParams::default());
    }

    #[test]
    fn test_uniform_carries_clamped_values() {
        let params = ReflectorParams::default()
            .with_mix_blur(1.0)
            .with_opacity(0.5)
            .with_base_color(Rgb::from_hex("#101010").unwrap());
        let uniform = params.to_uniform();
        assert_eq!(uniform.mix_blur, 1.0);
        assert_eq!(uniform.opacity, 0.5);
        assert!(uniform.base_color[0] < 0.07);
        assert_eq!(uniform.blur_kernel, [300.0, 100.0]);
    }
}
