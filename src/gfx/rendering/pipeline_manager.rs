//! Render pipeline management system for wgpu
//!
//! Provides high-level pipeline creation and caching with support for
//! shared bind group layouts and lazy pipeline creation.

use std::{collections::HashMap, sync::Arc};
use wgpu::*;

use crate::gfx::scene::vertex::Vertex3D;

/// Configuration for creating a render pipeline
///
/// Defines all parameters needed to create a wgpu render pipeline,
/// including shaders, bind group layouts, and render state.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub label: String,
    pub shader: String,
    pub vertex_entry: String,
    pub bind_group_layouts: Vec<BindGroupLayout>,
    pub primitive_topology: PrimitiveTopology,
    pub cull_mode: Option<Face>,
    pub depth_format: Option<TextureFormat>,
    pub depth_write_enabled: bool,
    pub depth_compare: CompareFunction,
    pub multisample: MultisampleState,
    pub color_targets: Vec<Option<ColorTargetState>>,
    pub no_vertex_buffers: bool, // for fullscreen passes
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            label: "Default Pipeline".to_string(),
            shader: "shader.wgsl".to_string(),
            vertex_entry: "vs_main".to_string(),
            bind_group_layouts: Vec::new(),
            primitive_topology: PrimitiveTopology::TriangleList,
            cull_mode: Some(Face::Back),
            depth_format: None,
            depth_write_enabled: true,
            depth_compare: CompareFunction::Less,
            multisample: MultisampleState::default(),
            color_targets: vec![Some(ColorTargetState {
                format: TextureFormat::Bgra8Unorm,
                blend: Some(BlendState::REPLACE),
                write_mask: ColorWrites::ALL,
            })],
            no_vertex_buffers: false,
        }
    }
}

impl PipelineConfig {
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_owned();
        self
    }

    /// Sets the shader for this pipeline (builder pattern)
    pub fn with_shader(mut self, shader: &str) -> Self {
        self.shader = shader.to_string();
        self
    }

    /// Selects a non-default vertex entry point, e.g. the mirrored-camera
    /// variant of the environment shader
    pub fn with_vertex_entry(mut self, entry: &str) -> Self {
        self.vertex_entry = entry.to_string();
        self
    }

    pub fn with_cull_mode(mut self, face: Option<Face>) -> Self {
        self.cull_mode = face;
        self
    }

    /// Sets all bind group layouts at once (builder pattern)
    pub fn with_bind_group_layouts(mut self, layouts: Vec<BindGroupLayout>) -> Self {
        self.bind_group_layouts = layouts;
        self
    }

    /// Enables depth testing against the given depth format
    pub fn with_depth_stencil(mut self, format: TextureFormat) -> Self {
        self.depth_format = Some(format);
        self
    }

    /// Depth test without write, e.g. the environment dome drawn behind
    /// everything
    pub fn with_depth_read_only(mut self, compare: CompareFunction) -> Self {
        self.depth_write_enabled = false;
        self.depth_compare = compare;
        self
    }

    /// Sets color targets for this pipeline (builder pattern)
    pub fn with_color_targets(mut self, targets: Vec<Option<ColorTargetState>>) -> Self {
        self.color_targets = targets;
        self
    }

    /// Configures pipeline for fullscreen rendering (no vertex buffers needed)
    pub fn with_no_vertex_buffers(mut self) -> Self {
        self.no_vertex_buffers = true;
        self
    }
}

/// Manages render pipelines with caching and lazy creation
///
/// Pipelines are registered as configurations and created on first use or
/// in bulk via `create_all_pipelines`.
pub struct PipelineManager {
    device: Arc<Device>,
    pipelines: HashMap<String, RenderPipeline>,
    pipeline_configs: HashMap<String, PipelineConfig>,
    shader_modules: HashMap<String, ShaderModule>,
    pending_pipelines: Vec<String>,
}

impl PipelineManager {
    /// Creates a new pipeline manager
    pub fn new(device: Arc<Device>) -> Self {
        Self {
            device,
            pipelines: HashMap::new(),
            pipeline_configs: HashMap::new(),
            shader_modules: HashMap::new(),
            pending_pipelines: Vec::new(),
        }
    }

    /// Registers a pipeline configuration without creating it
    pub fn register_pipeline(&mut self, name: &str, config: PipelineConfig) {
        self.pipeline_configs.insert(name.to_string(), config);
        self.pending_pipelines.push(name.to_string());
    }

    /// Loads and compiles a shader module
    pub fn load_shader(&mut self, name: &str, source: &str) -> Result<(), String> {
        let shader_module = self.device.create_shader_module(ShaderModuleDescriptor {
            label: Some(name),
            source: ShaderSource::Wgsl(source.into()),
        });

        self.shader_modules.insert(name.to_string(), shader_module);
        Ok(())
    }

    /// Gets or creates a pipeline (lazy loading)
    pub fn get_pipeline(&mut self, name: &str) -> Option<&RenderPipeline> {
        if self.pipelines.contains_key(name) {
            return self.pipelines.get(name);
        }

        if let Some(config) = self.pipeline_configs.get(name).cloned() {
            match self.create_pipeline_from_config(name, &config) {
                Ok(pipeline) => {
                    self.pipelines.insert(name.to_string(), pipeline);
                    self.pending_pipelines.retain(|n| n != name);
                    return self.pipelines.get(name);
                }
                Err(e) => {
                    log::error!("Failed to create pipeline '{}': {}", name, e);
                    return None;
                }
            }
        }

        None
    }

    /// Creates all pending pipelines immediately
    ///
    /// # Returns
    /// Result with vector of error messages if any pipelines failed to create
    pub fn create_all_pipelines(&mut self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        let pending = self.pending_pipelines.clone();

        for name in pending {
            if let Some(config) = self.pipeline_configs.get(&name).cloned() {
                match self.create_pipeline_from_config(&name, &config) {
                    Ok(pipeline) => {
                        self.pipelines.insert(name.clone(), pipeline);
                        self.pending_pipelines.retain(|n| n != &name);
                    }
                    Err(e) => {
                        errors.push(format!("Pipeline '{}': {}", name, e));
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Checks if a pipeline is registered
    pub fn has_pipeline(&self, name: &str) -> bool {
        self.pipeline_configs.contains_key(name)
    }

    /// Creates a render pipeline from configuration
    fn create_pipeline_from_config(
        &self,
        name: &str,
        config: &PipelineConfig,
    ) -> Result<RenderPipeline, String> {
        let shader = self
            .shader_modules
            .get(&config.shader)
            .ok_or_else(|| format!("Shader '{}' not found", config.shader))?;

        let bind_group_layout_refs: Vec<&BindGroupLayout> =
            config.bind_group_layouts.iter().collect();
        let pipeline_layout = self
            .device
            .create_pipeline_layout(&PipelineLayoutDescriptor {
                label: Some(&format!("{} Layout", name)),
                bind_group_layouts: &bind_group_layout_refs,
                push_constant_ranges: &[],
            });

        // Fullscreen passes synthesize their triangle from the vertex index
        let vertex_buffers: &[VertexBufferLayout] = if config.no_vertex_buffers {
            &[]
        } else {
            &[Vertex3D::desc()]
        };

        let depth_stencil = config.depth_format.map(|format| DepthStencilState {
            format,
            depth_write_enabled: config.depth_write_enabled,
            depth_compare: config.depth_compare,
            stencil: StencilState::default(),
            bias: DepthBiasState::default(),
        });

        let pipeline = self
            .device
            .create_render_pipeline(&RenderPipelineDescriptor {
                label: Some(&config.label),
                layout: Some(&pipeline_layout),
                vertex: VertexState {
                    module: shader,
                    entry_point: Some(&config.vertex_entry),
                    buffers: vertex_buffers,
                    compilation_options: PipelineCompilationOptions::default(),
                },
                fragment: Some(FragmentState {
                    module: shader,
                    entry_point: Some("fs_main"),
                    targets: &config.color_targets,
                    compilation_options: PipelineCompilationOptions::default(),
                }),
                primitive: PrimitiveState {
                    topology: config.primitive_topology,
                    strip_index_format: None,
                    front_face: FrontFace::Ccw,
                    cull_mode: config.cull_mode,
                    polygon_mode: PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil,
                multisample: config.multisample,
                multiview: None,
                cache: None,
            });

        Ok(pipeline)
    }
}
