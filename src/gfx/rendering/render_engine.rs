//! WGPU-based rendering engine for the viewer
//!
//! Owns the surface, device and queue, the depth buffer, the offscreen
//! reflection targets and every render pipeline. Executes the scene's
//! fixed draw sequence each frame: clear to the background color, draw the
//! environment dome, then the reflective mesh compositing the mirrored
//! capture.

use std::sync::Arc;
use wgpu::TextureFormat;

use crate::config::{clamp_pixel_ratio, SceneSettings};
use crate::error::ViewerError;
use crate::gfx::{
    geometry::generate_sphere,
    resources::{
        global_bindings::{update_global_ubo, GlobalBindings, GlobalUBO},
        reflector::{ReflectorBindings, ReflectorUBO},
        texture_resource::TextureResource,
    },
    scene::{
        node::DrawStep,
        object::{DrawMesh, Mesh},
        scene::Scene,
    },
};

use super::pipeline_manager::{PipelineConfig, PipelineManager};
use super::reflection_pass::{BufferLedger, ReflectionTargets, REFLECTOR_PLANE_Y};

/// Core rendering engine managing GPU resources and draw calls
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,
    format: TextureFormat,
    pub pipeline_manager: PipelineManager,
    global_ubo: GlobalUBO,
    global_bindings: GlobalBindings,
    reflector_ubo: ReflectorUBO,
    reflector_bindings: ReflectorBindings,
    reflection: Option<ReflectionTargets>,
    /// Inward-facing sphere the environment gradient is drawn on
    dome_mesh: Mesh,
    ledger: BufferLedger,
    pixel_ratio_range: [f64; 2],
}

impl RenderEngine {
    /// Creates a new render engine for the given window
    ///
    /// Initializes wgpu, allocates the depth buffer and the offscreen
    /// reflection targets, and builds all four pipelines (environment,
    /// capture, blur, reflector composite).
    ///
    /// # Errors
    /// Returns [`ViewerError::BackendUnavailable`] when no surface, adapter
    /// or device can be obtained. The mount aborts; nothing is rendered and
    /// nothing retries.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        settings: &SceneSettings,
    ) -> Result<RenderEngine, ViewerError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .map_err(|e| ViewerError::BackendUnavailable(format!("surface: {}", e)))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| ViewerError::BackendUnavailable(format!("adapter: {}", e)))?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: 4096,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| ViewerError::BackendUnavailable(format!("device: {}", e)))?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .unwrap_or(surface_capabilities.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            // One frame per vertical sync; the frame callback never overlaps
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_capabilities.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, "depth_texture");

        let mut ledger = BufferLedger::new();
        let reflection = ReflectionTargets::new(&device, &settings.reflector, &mut ledger);

        // Global uniforms (camera + stage), bound at slot 0 everywhere
        let global_ubo = GlobalUBO::new(&device);
        let mut global_bindings = GlobalBindings::new(&device);
        global_bindings.create_bind_group(&device, &global_ubo);

        // Reflector material uniforms plus the capture reads, slot 1 of the
        // composite pipeline
        let reflector_ubo =
            ReflectorUBO::new_with_data(&device, &settings.reflector.to_uniform());
        let mut reflector_bindings = ReflectorBindings::new(&device);
        reflector_bindings.create_bind_group(
            &device,
            &reflector_ubo,
            &reflection.capture.view,
            &reflection.blur_b.view,
            &reflection.capture.sampler,
        );

        let mut dome_mesh = Mesh::from_geometry(&generate_sphere(32, 16));
        dome_mesh.init_gpu_resources(&device);

        let device_handle: Arc<wgpu::Device> = device.into();
        let queue_handle: Arc<wgpu::Queue> = queue.into();
        let mut pipeline_manager = PipelineManager::new(device_handle.clone());

        let _ = pipeline_manager.load_shader("environment", include_str!("environment.wgsl"));
        let _ = pipeline_manager.load_shader("blur", include_str!("blur.wgsl"));
        let _ = pipeline_manager.load_shader("reflector", include_str!("reflector.wgsl"));

        // Dome behind everything: depth tested read-only so the mesh always
        // wins, no culling since it is viewed from inside
        pipeline_manager.register_pipeline(
            "Environment",
            PipelineConfig::default()
                .with_label("ENVIRONMENT")
                .with_shader("environment")
                .with_depth_stencil(TextureResource::DEPTH_FORMAT)
                .with_depth_read_only(wgpu::CompareFunction::Always)
                .with_cull_mode(None)
                .with_bind_group_layouts(vec![global_bindings.bind_group_layouts().clone()])
                .with_color_targets(vec![Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })]),
        );

        // Same dome through the mirrored camera, into the offscreen capture
        pipeline_manager.register_pipeline(
            "EnvironmentCapture",
            PipelineConfig::default()
                .with_label("ENVIRONMENT_CAPTURE")
                .with_shader("environment")
                .with_vertex_entry("vs_capture")
                .with_cull_mode(None)
                .with_bind_group_layouts(vec![global_bindings.bind_group_layouts().clone()])
                .with_color_targets(vec![Some(wgpu::ColorTargetState {
                    format: TextureResource::REFLECTION_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })]),
        );

        pipeline_manager.register_pipeline(
            "Blur",
            PipelineConfig::default()
                .with_label("BLUR")
                .with_shader("blur")
                .with_bind_group_layouts(vec![reflection.blur_bind_group_layout().clone()])
                .with_color_targets(vec![Some(wgpu::ColorTargetState {
                    format: TextureResource::REFLECTION_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })])
                .with_cull_mode(None)
                .with_no_vertex_buffers(),
        );

        pipeline_manager.register_pipeline(
            "Reflector",
            PipelineConfig::default()
                .with_label("REFLECTOR")
                .with_shader("reflector")
                .with_depth_stencil(TextureResource::DEPTH_FORMAT)
                .with_bind_group_layouts(vec![
                    global_bindings.bind_group_layouts().clone(),
                    reflector_bindings.bind_group_layouts().clone(),
                ])
                .with_color_targets(vec![Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })]),
        );

        if let Err(errors) = pipeline_manager.create_all_pipelines() {
            for error in &errors {
                log::error!("{}", error);
            }
        }

        log::info!(
            "render engine mounted: {}x{} {:?}, reflection {}x{}",
            config.width,
            config.height,
            format,
            reflection.resolution,
            reflection.resolution
        );

        Ok(RenderEngine {
            surface,
            device: device_handle,
            queue: queue_handle,
            config,
            depth_texture,
            format,
            pipeline_manager,
            global_ubo,
            global_bindings,
            reflector_ubo,
            reflector_bindings,
            reflection: Some(reflection),
            dome_mesh,
            ledger,
            pixel_ratio_range: settings.pixel_ratio_range,
        })
    }

    /// Updates per-frame uniforms from the scene
    ///
    /// Must be called before `render_frame` so the capture, blur and main
    /// passes all observe the same camera and stage state.
    pub fn update(&mut self, scene: &Scene) {
        let Some(stage) = scene.stage() else {
            return;
        };

        let camera = &scene.camera_rig.camera;
        update_global_ubo(
            &mut self.global_ubo,
            &self.queue,
            camera.uniform,
            camera.build_mirrored_view_projection_matrix(REFLECTOR_PLANE_Y),
            stage,
            scene.key_light(),
        );

        if let Some(mesh_node) = scene.mesh() {
            self.reflector_ubo
                .update_content(&self.queue, mesh_node.material.to_uniform());
        }
    }

    /// Renders one frame following the scene's draw sequence
    ///
    /// Background, environment and mesh always land in that order; the
    /// reflection capture and blur passes are encoded ahead of the main
    /// pass whenever the sequence contains both an environment and a mesh.
    pub fn render_frame(&mut self, scene: &Scene) {
        let steps = scene.draw_sequence();
        let has_environment = steps.contains(&DrawStep::Environment);
        let has_mesh = steps.contains(&DrawStep::MeshWithReflector);

        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost) | Err(wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(e) => {
                log::error!("failed to acquire surface texture: {}", e);
                return;
            }
        };

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        // PASS 1 + 2: mirrored environment capture, then separable blur.
        // The composite samples these, so they are encoded first.
        if has_environment && has_mesh {
            self.encode_reflection_passes(&mut encoder);
        }

        // PASS 3: main pass, walking the draw sequence in order
        {
            let background = scene.background;
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        // DrawStep::Background is the clear itself
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: background.r as f64,
                            g: background.g as f64,
                            b: background.b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_bind_group(0, self.global_bindings.bind_groups(), &[]);

            for step in &steps {
                match step {
                    DrawStep::Background => {} // applied as the clear op
                    DrawStep::Environment => {
                        if let Some(pipeline) = self.pipeline_manager.get_pipeline("Environment") {
                            render_pass.set_pipeline(pipeline);
                            render_pass.draw_mesh(&self.dome_mesh);
                        }
                    }
                    DrawStep::MeshWithReflector => {
                        let (Some(mesh_node), Some(bind_group)) =
                            (scene.mesh(), self.reflector_bindings.bind_groups())
                        else {
                            continue;
                        };
                        if let Some(pipeline) = self.pipeline_manager.get_pipeline("Reflector") {
                            render_pass.set_pipeline(pipeline);
                            render_pass.set_bind_group(1, bind_group, &[]);
                            render_pass.draw_mesh(&mesh_node.mesh);
                        }
                    }
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
    }

    /// Encodes the mirrored capture and both blur directions.
    fn encode_reflection_passes(&mut self, encoder: &mut wgpu::CommandEncoder) {
        let Some(reflection) = &self.reflection else {
            return;
        };

        {
            let mut capture_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Reflection Capture Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &reflection.capture.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            capture_pass.set_bind_group(0, self.global_bindings.bind_groups(), &[]);
            if let Some(pipeline) = self.pipeline_manager.get_pipeline("EnvironmentCapture") {
                capture_pass.set_pipeline(pipeline);
                capture_pass.draw_mesh(&self.dome_mesh);
            }
        }

        let blur_targets = [
            (&reflection.blur_a.view, reflection.blur_h_bind_group()),
            (&reflection.blur_b.view, reflection.blur_v_bind_group()),
        ];
        for (target, bind_group) in blur_targets {
            let mut blur_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Reflection Blur Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(pipeline) = self.pipeline_manager.get_pipeline("Blur") {
                blur_pass.set_pipeline(pipeline);
                blur_pass.set_bind_group(0, bind_group, &[]);
                blur_pass.draw(0..3, 0..1);
            }
        }
    }

    /// Resizes the surface and recreates the depth buffer
    ///
    /// Camera pose lives in the scene and is untouched here; a resize only
    /// reallocates the backing pixel buffer. The reflection targets keep
    /// their fixed resolution.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);

        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    /// Resolves the clamped device pixel ratio and resizes accordingly.
    pub fn resize_with_scale(&mut self, physical: (u32, u32), scale_factor: f64) {
        let (width, height) =
            resolve_surface_extent(self.pixel_ratio_range, physical, scale_factor);
        self.resize(width, height);
    }

    /// The effective device pixel ratio for a window scale factor.
    pub fn effective_pixel_ratio(&self, scale_factor: f64) -> f64 {
        clamp_pixel_ratio(self.pixel_ratio_range, scale_factor)
    }

    /// Releases the offscreen reflection buffers deterministically.
    ///
    /// Called on unmount; the ledger must read zero afterwards.
    pub fn release_resources(&mut self) {
        if let Some(reflection) = self.reflection.take() {
            reflection.release(&mut self.ledger);
        }
        log::info!(
            "render engine released, {} offscreen buffers live",
            self.ledger.live()
        );
    }

    /// Snapshot of the offscreen buffer ledger.
    pub fn buffer_ledger(&self) -> BufferLedger {
        self.ledger
    }

    /// Returns current surface dimensions
    pub fn get_surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Returns reference to the wgpu device
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Returns reference to the wgpu command queue
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Returns the surface texture format
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }
}

/// Computes the backing-buffer extent for a window size and scale factor,
/// with the device pixel ratio clamped into the configured range.
pub fn resolve_surface_extent(
    pixel_ratio_range: [f64; 2],
    physical: (u32, u32),
    scale_factor: f64,
) -> (u32, u32) {
    let scale = if scale_factor > 0.0 { scale_factor } else { 1.0 };
    let ratio = clamp_pixel_ratio(pixel_ratio_range, scale);
    let width = (physical.0 as f64 / scale * ratio).round().max(1.0) as u32;
    let height = (physical.1 as f64 / scale * ratio).round().max(1.0) as u32;
    (width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_extent_clamps_high_dpi() {
        // 3x display clamped to the 2x ceiling
        let extent = resolve_surface_extent([1.0, 2.0], (3000, 1500), 3.0);
        assert_eq!(extent, (2000, 1000));
    }

    #[test]
    fn test_surface_extent_clamps_low_dpi() {
        let extent = resolve_surface_extent([1.0, 2.0], (500, 250), 0.5);
        assert_eq!(extent, (1000, 500));
    }

    #[test]
    fn test_surface_extent_within_range_is_identity() {
        let extent = resolve_surface_extent([1.0, 2.0], (1920, 1080), 1.5);
        assert_eq!(extent, (1920, 1080));
    }

    #[test]
    fn test_surface_extent_never_zero() {
        let extent = resolve_surface_extent([1.0, 2.0], (0, 0), 1.0);
        assert_eq!(extent, (1, 1));
    }
}
