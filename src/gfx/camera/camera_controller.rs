//! Orbit input state machine
//!
//! Pointer interaction is modeled as explicit transitions over plain-data
//! inputs so the controller is testable without a display. Two states:
//! Idle (no pointer capture) and Dragging (pointer captured, deltas orbit
//! the camera). Auto-rotate runs per frame while Idle and is suspended
//! while Dragging.

use super::orbit_camera::OrbitCamera;

/// Assumed display refresh for the frame-based auto-rotate increment.
const REFERENCE_REFRESH_HZ: f32 = 60.0;

/// Pointer input as plain data, decoupled from any windowing event type
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerInput {
    /// Primary button pressed; captures the drag origin
    Down,
    /// Pointer moved by (dx, dy) in logical pixels
    Move { dx: f32, dy: f32 },
    /// Primary button released
    Up,
    /// Scroll wheel / pinch delta; ignored when zoom is disabled
    Scroll { amount: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    Idle,
    Dragging,
}

pub struct CameraController {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    /// Constant idle spin around the target
    pub auto_rotate: bool,
    /// Turns per minute at the reference refresh rate
    pub auto_rotate_speed: f32,
    zoom_enabled: bool,
    state: DragState,
}

impl CameraController {
    pub fn new(rotate_speed: f32, zoom_speed: f32) -> Self {
        Self {
            rotate_speed,
            zoom_speed,
            auto_rotate: false,
            auto_rotate_speed: 2.0,
            zoom_enabled: false,
            state: DragState::Idle,
        }
    }

    pub fn with_auto_rotate(mut self, enabled: bool, turns_per_minute: f32) -> Self {
        self.auto_rotate = enabled;
        self.auto_rotate_speed = turns_per_minute.max(0.0);
        self
    }

    pub fn with_zoom_enabled(mut self, enabled: bool) -> Self {
        self.zoom_enabled = enabled;
        self
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        self.state == DragState::Dragging
    }

    pub fn zoom_enabled(&self) -> bool {
        self.zoom_enabled
    }

    /// Applies one pointer input, transitioning state and mutating the
    /// camera pose synchronously. The next frame callback observes the
    /// updated pose; there is no deferred work.
    pub fn apply(&mut self, input: PointerInput, camera: &mut OrbitCamera) {
        match input {
            PointerInput::Down => {
                self.state = DragState::Dragging;
            }
            PointerInput::Up => {
                self.state = DragState::Idle;
            }
            PointerInput::Move { dx, dy } => {
                if self.state == DragState::Dragging {
                    camera.add_yaw(-dx * self.rotate_speed);
                    camera.add_pitch(dy * self.rotate_speed);
                }
            }
            PointerInput::Scroll { amount } => {
                // Zoom-disabled means the input is dropped here, not
                // attenuated somewhere downstream.
                if self.zoom_enabled {
                    camera.add_distance(-amount * self.zoom_speed);
                }
            }
        }
    }

    /// Per-frame tick: advances the idle auto-rotation.
    pub fn advance_frame(&mut self, camera: &mut OrbitCamera) {
        if self.auto_rotate && self.state == DragState::Idle {
            camera.add_yaw(self.auto_rotate_increment());
        }
    }

    /// Azimuth increment per frame in radians.
    fn auto_rotate_increment(&self) -> f32 {
        self.auto_rotate_speed * std::f32::consts::TAU / (REFERENCE_REFRESH_HZ * 60.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Vector3, Zero};

    fn test_camera() -> OrbitCamera {
        OrbitCamera::new(5.0, 0.3, 0.2, Vector3::zero(), 1.0)
    }

    #[test]
    fn test_down_move_up_transitions() {
        let mut controller = CameraController::new(0.005, 0.1);
        let mut camera = test_camera();

        assert_eq!(controller.state(), DragState::Idle);
        controller.apply(PointerInput::Down, &mut camera);
        assert_eq!(controller.state(), DragState::Dragging);
        controller.apply(PointerInput::Up, &mut camera);
        assert_eq!(controller.state(), DragState::Idle);
    }

    #[test]
    fn test_move_while_idle_does_nothing() {
        let mut controller = CameraController::new(0.005, 0.1);
        let mut camera = test_camera();
        let before = (camera.yaw, camera.pitch);

        controller.apply(PointerInput::Move { dx: 50.0, dy: 30.0 }, &mut camera);
        assert_eq!((camera.yaw, camera.pitch), before);
    }

    #[test]
    fn test_drag_orbits_camera() {
        let mut controller = CameraController::new(0.005, 0.1);
        let mut camera = test_camera();
        let before = (camera.yaw, camera.pitch);

        controller.apply(PointerInput::Down, &mut camera);
        controller.apply(PointerInput::Move { dx: 10.0, dy: -10.0 }, &mut camera);
        assert_ne!(camera.yaw, before.0);
        assert_ne!(camera.pitch, before.1);
    }

    #[test]
    fn test_pitch_stays_off_poles_for_any_drag_sequence() {
        let mut controller = CameraController::new(0.05, 0.1);
        let mut camera = test_camera();
        let half_pi = std::f32::consts::PI / 2.0;

        controller.apply(PointerInput::Down, &mut camera);
        for i in 0..500 {
            let dy = if i % 3 == 0 { 80.0 } else { -45.0 };
            controller.apply(PointerInput::Move { dx: 12.0, dy }, &mut camera);
            assert!(camera.pitch > -half_pi && camera.pitch < half_pi);
        }
    }

    #[test]
    fn test_scroll_ignored_when_zoom_disabled() {
        let mut controller = CameraController::new(0.005, 0.1).with_zoom_enabled(false);
        let mut camera = test_camera();
        let distance = camera.distance;

        for amount in [-10.0, -1.0, 0.5, 3.0, 100.0] {
            controller.apply(PointerInput::Scroll { amount }, &mut camera);
        }
        assert_eq!(camera.distance, distance);
    }

    #[test]
    fn test_scroll_changes_distance_when_zoom_enabled() {
        let mut controller = CameraController::new(0.005, 0.1).with_zoom_enabled(true);
        let mut camera = test_camera();
        let distance = camera.distance;

        controller.apply(PointerInput::Scroll { amount: -3.0 }, &mut camera);
        assert_ne!(camera.distance, distance);
    }

    #[test]
    fn test_auto_rotate_spins_while_idle() {
        let mut controller = CameraController::new(0.005, 0.1).with_auto_rotate(true, 2.0);
        let mut camera = test_camera();
        let yaw = camera.yaw;

        controller.advance_frame(&mut camera);
        assert!(camera.yaw > yaw);
    }

    #[test]
    fn test_auto_rotate_suspended_while_dragging() {
        let mut controller = CameraController::new(0.005, 0.1).with_auto_rotate(true, 2.0);
        let mut camera = test_camera();

        controller.apply(PointerInput::Down, &mut camera);
        let yaw = camera.yaw;
        controller.advance_frame(&mut camera);
        assert_eq!(camera.yaw, yaw);

        // Resumes after release
        controller.apply(PointerInput::Up, &mut camera);
        controller.advance_frame(&mut camera);
        assert!(camera.yaw > yaw);
    }

    #[test]
    fn test_auto_rotate_rate_matches_turns_per_minute() {
        let mut controller = CameraController::new(0.005, 0.1).with_auto_rotate(true, 2.0);
        let mut camera = test_camera();
        let start = camera.yaw;

        // One minute of frames at the reference refresh rate
        for _ in 0..3600 {
            controller.advance_frame(&mut camera);
        }
        let turns = (camera.yaw - start) / std::f32::consts::TAU;
        assert!((turns - 2.0).abs() < 1e-2);
    }
}
