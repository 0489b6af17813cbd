use super::camera_utils::{convert_matrix4_to_array, Camera, CameraUniform};
use cgmath::*;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

/// Orbit camera in spherical coordinates around a fixed target
///
/// Pose is (distance, pitch, yaw); the eye position is derived, never set
/// directly, so the camera can never be pushed through the target point.
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub distance: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub eye: Vector3<f32>,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    pub bounds: OrbitCameraBounds,
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
    pub uniform: CameraUniform,
}

impl Camera for OrbitCamera {
    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        let proj = OPENGL_TO_WGPU_MATRIX
            * perspective(self.fovy, self.aspect, self.znear, self.zfar);
        proj * self.build_view_matrix()
    }
}

impl OrbitCamera {
    pub fn new(distance: f32, pitch: f32, yaw: f32, target: Vector3<f32>, aspect: f32) -> Self {
        let mut camera = Self {
            distance,
            pitch,
            yaw,
            eye: Vector3::zero(), // derived in `update()`
            target,
            up: Vector3::unit_y(),
            bounds: OrbitCameraBounds::default(),
            aspect,
            fovy: cgmath::Rad(std::f32::consts::PI / 4.0),
            znear: 0.1,
            zfar: 1000.0,
            uniform: CameraUniform::default(),
        };
        camera.update();
        camera
    }

    /// Sets the vertical field of view from degrees. Must be positive;
    /// config resolution guarantees that before it gets here.
    pub fn set_fov_degrees(&mut self, degrees: f32) {
        self.fovy = Deg(degrees).into();
    }

    pub fn set_distance(&mut self, distance: f32) {
        self.distance = distance.clamp(
            self.bounds.min_distance.unwrap_or(f32::EPSILON),
            self.bounds.max_distance.unwrap_or(f32::MAX),
        );
        self.update();
    }

    pub fn add_distance(&mut self, delta: f32) {
        self.set_distance(self.distance + delta);
    }

    /// Pitch is clamped inside (-PI/2 + eps, PI/2 - eps) so a drag can never
    /// flip the camera over the pole.
    pub fn set_pitch(&mut self, pitch: f32) {
        self.pitch = pitch.clamp(self.bounds.min_pitch, self.bounds.max_pitch);
        self.update();
    }

    pub fn add_pitch(&mut self, delta: f32) {
        self.set_pitch(self.pitch + delta);
    }

    pub fn set_yaw(&mut self, yaw: f32) {
        self.yaw = yaw;
        self.update();
    }

    pub fn add_yaw(&mut self, delta: f32) {
        self.set_yaw(self.yaw + delta);
    }

    /// View matrix for the current pose.
    pub fn build_view_matrix(&self) -> Matrix4<f32> {
        let eye = Point3::from_vec(self.eye);
        let target = Point3::from_vec(self.target);
        Matrix4::look_at_rh(eye, target, self.up)
    }

    /// View-projection for a camera mirrored about the horizontal plane
    /// `y = plane_y`, used by the reflection capture pass.
    pub fn build_mirrored_view_projection_matrix(&self, plane_y: f32) -> Matrix4<f32> {
        let mirrored_eye = Vector3::new(
            self.eye.x,
            2.0 * plane_y - self.eye.y,
            self.eye.z,
        );
        let mirrored_target = Vector3::new(
            self.target.x,
            2.0 * plane_y - self.target.y,
            self.target.z,
        );
        let view = Matrix4::look_at_rh(
            Point3::from_vec(mirrored_eye),
            Point3::from_vec(mirrored_target),
            self.up,
        );
        let proj = OPENGL_TO_WGPU_MATRIX
            * perspective(self.fovy, self.aspect, self.znear, self.zfar);
        proj * view
    }

    /// Updates the derived eye position after changing `distance`, `pitch`
    /// or `yaw`.
    fn update(&mut self) {
        self.eye =
            calculate_cartesian_eye_position(self.pitch, self.yaw, self.distance, self.target);
    }

    pub fn resize_projection(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn update_view_proj(&mut self) {
        self.uniform.view_position = [self.eye.x, self.eye.y, self.eye.z, 1.0];
        self.uniform.view_proj = convert_matrix4_to_array(self.build_view_projection_matrix());
    }
}

/// Pose limits for the orbit camera
///
/// Pitch limits are mandatory (they keep the polar angle off the poles);
/// distance limits are optional.
#[derive(Debug, Clone, Copy)]
pub struct OrbitCameraBounds {
    pub min_distance: Option<f32>,
    pub max_distance: Option<f32>,
    pub min_pitch: f32,
    pub max_pitch: f32,
}

impl Default for OrbitCameraBounds {
    fn default() -> Self {
        Self {
            min_distance: None,
            max_distance: Some(16.0),
            min_pitch: -std::f32::consts::PI / 2.0 + f32::EPSILON,
            max_pitch: std::f32::consts::PI / 2.0 - f32::EPSILON,
        }
    }
}

fn calculate_cartesian_eye_position(
    pitch: f32,
    yaw: f32,
    distance: f32,
    target: Vector3<f32>,
) -> Vector3<f32> {
    Vector3::new(
        distance * yaw.sin() * pitch.cos(),
        distance * pitch.sin(),
        distance * yaw.cos() * pitch.cos(),
    ) + target
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pitch_clamps_at_poles() {
        let mut camera = OrbitCamera::new(5.0, 0.0, 0.0, Vector3::zero(), 1.0);
        camera.add_pitch(10.0);
        assert!(camera.pitch < std::f32::consts::PI / 2.0);
        camera.add_pitch(-20.0);
        assert!(camera.pitch > -std::f32::consts::PI / 2.0);
    }

    #[test]
    fn test_eye_never_reaches_target() {
        let mut camera = OrbitCamera::new(5.0, 0.3, 0.7, Vector3::zero(), 1.0);
        camera.bounds.min_distance = Some(1.1);
        camera.add_distance(-100.0);
        let offset = camera.eye - camera.target;
        assert!(offset.magnitude() >= 1.1 - 1e-4);
    }

    #[test]
    fn test_eye_tracks_spherical_pose() {
        let camera = OrbitCamera::new(2.0, 0.0, 0.0, Vector3::zero(), 1.0);
        // pitch 0, yaw 0 puts the eye on +Z at the orbit distance
        assert!((camera.eye.z - 2.0).abs() < 1e-5);
        assert!(camera.eye.x.abs() < 1e-5);
        assert!(camera.eye.y.abs() < 1e-5);
    }

    #[test]
    fn test_mirrored_eye_is_below_plane() {
        let camera = OrbitCamera::new(5.0, 0.5, 0.2, Vector3::zero(), 1.0);
        assert!(camera.eye.y > 0.0);
        // The mirrored matrix must differ from the regular one whenever the
        // eye is off the plane.
        let regular = camera.build_view_projection_matrix();
        let mirrored = camera.build_mirrored_view_projection_matrix(0.0);
        assert_ne!(
            convert_matrix4_to_array(regular),
            convert_matrix4_to_array(mirrored)
        );
    }
}
