//! 3D orbit camera: the pose source for "move frame to camera"

use crate::path::Keyframe;
use dolly_core::math::look_at_basis;
use dolly_core::{Mat4, Vec3};

/// A perspective camera orbiting a target point
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Camera position
    pub position: Vec3,
    /// Target point the camera looks at
    pub target: Vec3,
    /// Up vector
    pub up: Vec3,
    /// Field of view in degrees
    pub fov: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
    /// Aspect ratio (width / height)
    pub aspect: f32,

    // Orbit control state
    /// Distance from target
    pub distance: f32,
    /// Horizontal angle in radians
    pub yaw: f32,
    /// Vertical angle in radians
    pub pitch: f32,
}

impl Default for Camera {
    fn default() -> Self {
        let mut camera = Self {
            position: Vec3::ZERO,
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov: 45.0,
            near: 0.1,
            far: 1000.0,
            aspect: 16.0 / 9.0,
            distance: 25.0,
            yaw: std::f32::consts::FRAC_PI_4,
            pitch: std::f32::consts::FRAC_PI_6,
        };
        camera.update_orbit();
        camera
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update position based on orbit parameters
    pub fn update_orbit(&mut self) {
        let offset = Vec3::new(
            self.pitch.cos() * self.yaw.sin(),
            self.pitch.sin(),
            self.pitch.cos() * self.yaw.cos(),
        );
        self.position = self.target + offset * self.distance;
    }

    /// Orbit horizontally (rotate around target)
    pub fn orbit_horizontal(&mut self, delta: f32) {
        self.yaw += delta;
        self.update_orbit();
    }

    /// Orbit vertically (tilt up/down)
    pub fn orbit_vertical(&mut self, delta: f32) {
        // Stay just short of the poles so the view matrix keeps a valid up
        self.pitch = (self.pitch + delta).clamp(-1.56, 1.56);
        self.update_orbit();
    }

    /// Zoom in/out
    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance - delta).clamp(1.0, 500.0);
        self.update_orbit();
    }

    /// Pan the camera (move target)
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let forward = (self.target - self.position).normalize_or_zero();
        let right = forward.cross(self.up).normalize_or_zero();
        let up = right.cross(forward);

        self.target += right * dx + up * dy;
        self.update_orbit();
    }

    /// Place the camera at an explicit pose, re-deriving the orbit parameters
    /// so later orbiting continues from here.
    ///
    /// A pose with no view direction (target on the eye, or up along the
    /// view) is ignored and the current pose kept. Returns whether the pose
    /// was applied.
    pub fn look_from(&mut self, position: Vec3, target: Vec3, up: Vec3) -> bool {
        if look_at_basis(position, target, up).is_none() {
            tracing::debug!("ignoring degenerate camera pose");
            return false;
        }
        self.position = position;
        self.target = target;
        self.up = up;

        let offset = position - target;
        let distance = offset.length();
        self.distance = distance;
        self.pitch = (offset.y / distance).clamp(-1.0, 1.0).asin();
        self.yaw = offset.x.atan2(offset.z);
        true
    }

    /// Snap the camera to a keyframe's pose
    pub fn apply_keyframe(&mut self, frame: &Keyframe) -> bool {
        self.look_from(frame.position, frame.target, frame.up)
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Perspective projection with a [0, 1] depth range
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}
