// src/wgpu_utils/binding_builder.rs
//! Builders for bind group layouts and bind groups
//!
//! Keeps binding indices implicit and sequential so layouts and groups
//! cannot drift apart.

/// A bind group layout together with the entries it was built from
pub struct BindGroupLayoutWithDesc {
    pub layout: wgpu::BindGroupLayout,
    pub entries: Vec<wgpu::BindGroupLayoutEntry>,
}

pub struct BindGroupLayoutBuilder {
    entries: Vec<wgpu::BindGroupLayoutEntry>,
    next_binding_index: u32,
}

impl BindGroupLayoutBuilder {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_binding_index: 0,
        }
    }

    pub fn binding(mut self, entry: wgpu::BindGroupLayoutEntry) -> Self {
        self.next_binding_index = entry.binding + 1;
        self.entries.push(entry);
        self
    }

    pub fn next_binding(self, visibility: wgpu::ShaderStages, ty: wgpu::BindingType) -> Self {
        let binding = self.next_binding_index;
        self.binding(wgpu::BindGroupLayoutEntry {
            binding,
            visibility,
            ty,
            count: None,
        })
    }

    pub fn next_binding_vertex(self, ty: wgpu::BindingType) -> Self {
        self.next_binding(wgpu::ShaderStages::VERTEX, ty)
    }

    pub fn next_binding_fragment(self, ty: wgpu::BindingType) -> Self {
        self.next_binding(wgpu::ShaderStages::FRAGMENT, ty)
    }

    /// Visible to both vertex and fragment stages.
    pub fn next_binding_rendering(self, ty: wgpu::BindingType) -> Self {
        self.next_binding(
            wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty,
        )
    }

    pub fn create(self, device: &wgpu::Device, label: &str) -> BindGroupLayoutWithDesc {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(label),
            entries: &self.entries,
        });
        BindGroupLayoutWithDesc {
            layout,
            entries: self.entries,
        }
    }
}

impl Default for BindGroupLayoutBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds a bind group against a layout built with [`BindGroupLayoutBuilder`]
///
/// Resources are appended in layout order.
pub struct BindGroupBuilder<'a> {
    layout_with_desc: &'a BindGroupLayoutWithDesc,
    entries: Vec<wgpu::BindingResource<'a>>,
}

impl<'a> BindGroupBuilder<'a> {
    pub fn new(layout_with_desc: &'a BindGroupLayoutWithDesc) -> Self {
        Self {
            layout_with_desc,
            entries: Vec::new(),
        }
    }

    pub fn resource(mut self, resource: wgpu::BindingResource<'a>) -> Self {
        self.entries.push(resource);
        self
    }

    pub fn texture(self, view: &'a wgpu::TextureView) -> Self {
        self.resource(wgpu::BindingResource::TextureView(view))
    }

    pub fn sampler(self, sampler: &'a wgpu::Sampler) -> Self {
        self.resource(wgpu::BindingResource::Sampler(sampler))
    }

    pub fn create(self, device: &wgpu::Device, label: &str) -> wgpu::BindGroup {
        debug_assert_eq!(self.entries.len(), self.layout_with_desc.entries.len());
        let entries: Vec<wgpu::BindGroupEntry> = self
            .entries
            .into_iter()
            .zip(self.layout_with_desc.entries.iter())
            .map(|(resource, layout_entry)| wgpu::BindGroupEntry {
                binding: layout_entry.binding,
                resource,
            })
            .collect();

        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.layout_with_desc.layout,
            entries: &entries,
        })
    }
}
