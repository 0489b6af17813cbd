//! Application mount harness
//!
//! Owns the winit event loop, the mounted window and the render engine.
//! The frame loop is explicit: a scheduler with a running/stopped flag
//! requests one redraw per display refresh while mounted and stops
//! requesting them on unmount, so cancellation is clean and teardown
//! atomic.

use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowAttributes},
};

use crate::config::{SceneSettings, ViewerConfig};
use crate::error::{report_issues, ViewerError};
use crate::gfx::{
    rendering::render_engine::{resolve_surface_extent, RenderEngine},
    scene::{object::ModelAsset, scene::Scene},
};

/// Explicit frame-loop state
///
/// Running means one frame callback is requested per display refresh;
/// stopped means pending redraws are ignored and no further ones are
/// scheduled.
#[derive(Debug, Default)]
pub struct FrameScheduler {
    running: bool,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self { running: false }
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

/// The mounted viewer application
pub struct ViewerApp {
    event_loop: Option<EventLoop<()>>,
    pub app_state: AppState,
}

pub struct AppState {
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    pub scene: Scene,
    settings: SceneSettings,
    scheduler: FrameScheduler,
    mount_error: Option<ViewerError>,
}

impl ViewerApp {
    /// Creates the viewer from a configuration
    ///
    /// Resolves and clamps the configuration (reporting recoverable issues
    /// as warnings) and composes the scene. The rendering backend is only
    /// initialized once the event loop delivers a window.
    pub fn new(config: ViewerConfig) -> Result<Self, ViewerError> {
        let event_loop = EventLoop::new()?;

        let (settings, issues) = config.resolve();
        report_issues(&issues);

        let (scene, scene_issues) = Scene::compose(&settings);
        report_issues(&scene_issues);

        Ok(Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                window: None,
                render_engine: None,
                scene,
                settings,
                scheduler: FrameScheduler::new(),
                mount_error: None,
            },
        })
    }

    /// Hands the host's loaded model to the scene
    ///
    /// Decoding is the host's job and must happen off the frame-callback
    /// path; this call only swaps geometry and is cheap.
    pub fn set_model(&mut self, model: ModelAsset) {
        self.app_state.scene.set_model(model);
    }

    /// Runs the viewer until the window closes (consumes self)
    ///
    /// # Errors
    /// Surfaces a fatal mount failure (`BackendUnavailable`, window
    /// creation) to the host after the loop winds down.
    pub fn run(mut self) -> Result<(), ViewerError> {
        let event_loop = self.event_loop.take().expect("Event loop already consumed");
        event_loop.set_control_flow(ControlFlow::Poll);

        event_loop.run_app(&mut self.app_state)?;

        match self.app_state.mount_error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl AppState {
    /// Stops the frame loop, releases backend buffers and exits.
    fn unmount(&mut self, event_loop: &ActiveEventLoop) {
        self.scheduler.stop();
        if let Some(render_engine) = self.render_engine.as_mut() {
            render_engine.release_resources();
        }
        event_loop.exit();
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = WindowAttributes::default()
            .with_title("vitrine")
            .with_inner_size(winit::dpi::LogicalSize::new(1200, 800));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => window,
            Err(e) => {
                self.mount_error = Some(ViewerError::WindowCreation(e.to_string()));
                event_loop.exit();
                return;
            }
        };

        let window_handle = Arc::new(window);
        self.window = Some(window_handle.clone());

        let physical = window_handle.inner_size();
        let scale_factor = window_handle.scale_factor();
        let (width, height) = resolve_surface_extent(
            self.settings.pixel_ratio_range,
            (physical.width, physical.height),
            scale_factor,
        );

        let window_clone = window_handle.clone();
        let settings = self.settings.clone();
        let renderer = pollster::block_on(async move {
            RenderEngine::new(window_clone, width, height, &settings).await
        });

        match renderer {
            Ok(renderer) => {
                self.scene.camera_rig.camera.resize_projection(width, height);
                self.scene.init_gpu_resources(renderer.device());
                self.render_engine = Some(renderer);
                self.scheduler.start();
            }
            Err(error) => {
                // Fail fast: no blank frame, no retry loop
                log::error!("mount aborted: {}", error);
                self.mount_error = Some(error);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(render_engine) = self.render_engine.as_mut() else {
            return;
        };
        let Some(window) = self.window.as_ref() else {
            return;
        };

        match event {
            WindowEvent::KeyboardInput {
                event:
                    winit::event::KeyEvent {
                        physical_key: winit::keyboard::PhysicalKey::Code(key_code),
                        ..
                    },
                ..
            } => {
                if matches!(key_code, winit::keyboard::KeyCode::Escape) {
                    self.unmount(event_loop);
                }
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                render_engine.resize_with_scale((width, height), window.scale_factor());
                let (surface_width, surface_height) = render_engine.get_surface_size();
                self.scene
                    .camera_rig
                    .camera
                    .resize_projection(surface_width, surface_height);
            }
            WindowEvent::CloseRequested => {
                self.unmount(event_loop);
            }
            WindowEvent::RedrawRequested => {
                // A stopped scheduler means a pending callback was
                // cancelled by unmount; draw nothing.
                if !self.scheduler.is_running() {
                    return;
                }
                self.scene.update();
                render_engine.update(&self.scene);
                render_engine.render_frame(&self.scene);
            }
            other => {
                if self.scene.camera_rig.process_window_event(&other) {
                    window.request_redraw();
                }
            }
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: winit::event::DeviceEvent,
    ) {
        let Some(window) = self.window.as_ref() else {
            return;
        };

        if self.scene.camera_rig.process_device_event(&event) {
            window.request_redraw();
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if !self.scheduler.is_running() {
            return;
        }
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // Atomic teardown: scheduler, backend buffers, device, window
        self.scheduler.stop();
        if let Some(render_engine) = self.render_engine.as_mut() {
            render_engine.release_resources();
        }
        self.render_engine = None;
        self.window = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheduler_starts_stopped() {
        let scheduler = FrameScheduler::new();
        assert!(!scheduler.is_running());
    }

    #[test]
    fn test_scheduler_start_stop() {
        let mut scheduler = FrameScheduler::new();
        scheduler.start();
        assert!(scheduler.is_running());
        scheduler.stop();
        assert!(!scheduler.is_running());
    }

    #[test]
    fn test_scheduler_stop_is_idempotent() {
        let mut scheduler = FrameScheduler::new();
        scheduler.start();
        scheduler.stop();
        scheduler.stop();
        assert!(!scheduler.is_running());
    }
}
