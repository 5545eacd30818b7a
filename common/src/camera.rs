//! Orbit camera for the 3D scene

use glam::{Mat4, Vec3};

/// 3D perspective camera with orbital controls
#[derive(Debug, Clone)]
pub struct Camera3D {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
    // Orbital parameters
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Camera3D {
    pub fn new(aspect_ratio: f32) -> Self {
        let mut camera = Self {
            position: Vec3::ZERO,
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov: 45.0f32.to_radians(),
            aspect_ratio,
            near: 0.1,
            far: 3000.0,
            distance: 10.0,
            yaw: 0.0,
            pitch: 0.3,
            min_distance: 1.0,
            max_distance: 2500.0,
        };
        camera.update_orbital();
        camera
    }

    /// Place the eye at `position` looking at `target`, deriving the orbit parameters
    pub fn look_from(&mut self, position: Vec3, target: Vec3) {
        let offset = position - target;
        let distance = offset.length();
        self.target = target;
        if distance <= f32::EPSILON {
            self.distance = self.min_distance;
            self.yaw = 0.0;
            self.pitch = 0.0;
        } else {
            self.distance = distance.clamp(self.min_distance, self.max_distance);
            self.yaw = offset.x.atan2(offset.z);
            self.pitch = (offset.y / distance).clamp(-1.0, 1.0).asin().clamp(-1.5, 1.5);
        }
        self.update_orbital();
    }

    /// Update camera position based on orbital parameters
    pub fn update_orbital(&mut self) {
        self.position = self.target
            + Vec3::new(
                self.distance * self.pitch.cos() * self.yaw.sin(),
                self.distance * self.pitch.sin(),
                self.distance * self.pitch.cos() * self.yaw.cos(),
            );
    }

    /// Orbit the camera around the target
    pub fn orbit(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw += delta_yaw;
        self.pitch = (self.pitch + delta_pitch).clamp(-1.5, 1.5);
        self.update_orbital();
    }

    /// Zoom in/out
    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance - delta).clamp(self.min_distance, self.max_distance);
        self.update_orbital();
    }

    /// Slide target and eye together across the view plane
    pub fn pan(&mut self, delta_right: f32, delta_up: f32) {
        let forward = (self.target - self.position).normalize_or_zero();
        let right = forward.cross(self.up).normalize_or_zero();
        let screen_up = right.cross(forward);
        self.target += right * delta_right + screen_up * delta_up;
        self.update_orbital();
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Get the projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect_ratio, self.near, self.far)
    }

    /// Get the combined view-projection matrix
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn update_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
    }
}

/// Camera uniform data for shaders
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub inv_view_proj: [[f32; 4]; 4],
    pub position: [f32; 4],
}

impl CameraUniform {
    pub fn from_camera_3d(camera: &Camera3D) -> Self {
        let view_proj = camera.view_projection();
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            inv_view_proj: view_proj.inverse().to_cols_array_2d(),
            position: [camera.position.x, camera.position.y, camera.position.z, 1.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_look_from_reproduces_position() {
        let mut camera = Camera3D::new(16.0 / 9.0);
        let eye = Vec3::new(-200.0, 200.0, 200.0);
        camera.look_from(eye, Vec3::ZERO);

        assert!(camera.position.abs_diff_eq(eye, 1e-3));
        assert!((camera.distance - eye.length()).abs() < 1e-3);
        assert!((camera.yaw + std::f32::consts::FRAC_PI_4).abs() < 1e-5);
    }

    #[test]
    fn test_orbit_clamps_pitch() {
        let mut camera = Camera3D::new(1.0);
        camera.orbit(0.0, 10.0);
        assert_eq!(camera.pitch, 1.5);
        camera.orbit(0.0, -10.0);
        assert_eq!(camera.pitch, -1.5);
    }

    #[test]
    fn test_zoom_respects_limits() {
        let mut camera = Camera3D::new(1.0);
        camera.zoom(1.0e6);
        assert_eq!(camera.distance, camera.min_distance);
        camera.zoom(-1.0e6);
        assert_eq!(camera.distance, camera.max_distance);
    }

    #[test]
    fn test_pan_keeps_view_direction() {
        let mut camera = Camera3D::new(1.0);
        camera.look_from(Vec3::new(0.0, 0.0, 100.0), Vec3::ZERO);
        let before = (camera.target - camera.position).normalize();

        camera.pan(10.0, 5.0);
        let after = (camera.target - camera.position).normalize();

        assert!(before.abs_diff_eq(after, 1e-5));
        assert!(camera.target.abs_diff_eq(Vec3::new(10.0, 5.0, 0.0), 1e-4));
    }

    #[test]
    fn test_uniform_inverse_round_trips() {
        let mut camera = Camera3D::new(1.5);
        camera.look_from(Vec3::new(-200.0, 200.0, 200.0), Vec3::ZERO);
        let uniform = CameraUniform::from_camera_3d(&camera);

        let product = Mat4::from_cols_array_2d(&uniform.view_proj)
            * Mat4::from_cols_array_2d(&uniform.inv_view_proj);
        assert!(product.abs_diff_eq(Mat4::IDENTITY, 1e-2));
    }
}
