use cgmath::{Matrix4, SquareMatrix};
use winit::event::{DeviceEvent, ElementState, MouseButton, MouseScrollDelta, WindowEvent};

use super::{
    camera_controller::{CameraController, PointerInput},
    orbit_camera::OrbitCamera,
};

/// Camera plus its input state machine
///
/// Translates windowing events into plain [`PointerInput`]s before they
/// reach the controller, so everything below this point is display-free.
pub struct CameraRig {
    pub camera: OrbitCamera,
    pub controller: CameraController,
}

impl CameraRig {
    pub fn new(camera: OrbitCamera, controller: CameraController) -> Self {
        Self { camera, controller }
    }

    /// Maps device-level events (relative pointer motion, wheel) onto the
    /// state machine. Returns true when the event mutated camera state.
    pub fn process_device_event(&mut self, event: &DeviceEvent) -> bool {
        match event {
            DeviceEvent::MouseMotion { delta } => {
                if self.controller.is_dragging() {
                    self.controller.apply(
                        PointerInput::Move {
                            dx: delta.0 as f32,
                            dy: delta.1 as f32,
                        },
                        &mut self.camera,
                    );
                    return true;
                }
                false
            }
            _ => false,
        }
    }

    /// Maps window-level events (button presses, wheel) onto the state
    /// machine. Returns true when the event mutated camera state.
    pub fn process_window_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => {
                let input = match state {
                    ElementState::Pressed => PointerInput::Down,
                    ElementState::Released => PointerInput::Up,
                };
                self.controller.apply(input, &mut self.camera);
                true
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let amount = match delta {
                    MouseScrollDelta::LineDelta(_, scroll) => *scroll,
                    MouseScrollDelta::PixelDelta(position) => position.y as f32,
                };
                self.controller
                    .apply(PointerInput::Scroll { amount }, &mut self.camera);
                // Distance only changes when zoom is enabled
                self.controller.zoom_enabled()
            }
            _ => false,
        }
    }

    /// Per-frame camera work: idle auto-rotation, then refreshed uniforms.
    pub fn advance_frame(&mut self) {
        self.controller.advance_frame(&mut self.camera);
        self.camera.update_view_proj();
    }

    /// Get the view projection matrix from the camera
    pub fn get_view_proj_matrix(&self) -> cgmath::Matrix4<f32> {
        self.camera.build_view_projection_matrix()
    }
}

pub trait Camera: Sized {
    fn build_view_projection_matrix(&self) -> Matrix4<f32>;
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug)]
pub struct CameraUniform {
    /// The eye position of the camera in homogenous coordinates.
    ///
    /// Homogenous coordinates are used to fullfill the 16 byte alignment requirement.
    pub view_position: [f32; 4],

    /// Contains the view projection matrix.
    pub view_proj: [[f32; 4]; 4],
}

impl Default for CameraUniform {
    /// Creates a default [CameraUniform].
    fn default() -> Self {
        Self {
            view_position: [0.0; 4],
            view_proj: convert_matrix4_to_array(Matrix4::identity()),
        }
    }
}

pub fn convert_matrix4_to_array(matrix4: Matrix4<f32>) -> [[f32; 4]; 4] {
    let mut result = [[0.0; 4]; 4];

    for i in 0..4 {
        for j in 0..4 {
            result[i][j] = matrix4[i][j];
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Vector3, Zero};

    #[test]
    fn test_advance_frame_refreshes_uniform() {
        let camera = OrbitCamera::new(5.0, 0.3, 0.2, Vector3::zero(), 1.0);
        let controller = CameraController::new(0.005, 0.1);
        let mut rig = CameraRig::new(camera, controller);

        assert_eq!(rig.camera.uniform.view_position, [0.0; 4]);
        rig.advance_frame();
        assert_ne!(rig.camera.uniform.view_position, [0.0; 4]);
    }
}
