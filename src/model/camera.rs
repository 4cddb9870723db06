use glam::{Mat4, Vec3};

use crate::config::CameraConfig;

/// Size of the drawable surface in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 { aspect_ratio(self.width, self.height) }

    pub fn is_empty(&self) -> bool { self.width == 0 || self.height == 0 }
}

/// Right-handed perspective camera, +Y up.
///
/// The projection matrix is cached: after changing `fov_y`, `aspect` or the
/// clip planes, call [`PerspectiveCamera::update_projection_matrix`].
pub struct PerspectiveCamera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
    projection: Mat4,
}

impl PerspectiveCamera {
    pub fn new(config: &CameraConfig, width: u32, height: u32) -> Self {
        let mut camera = Self {
            eye: Vec3::ZERO,
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: config.fov_y_deg.to_radians(),
            aspect: aspect_ratio(width, height),
            z_near: config.z_near,
            z_far: config.z_far,
            projection: Mat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) { self.aspect = aspect_ratio(width, height); }

    pub fn update_projection_matrix(&mut self) {
        self.projection = Mat4::perspective_rh(self.fov_y, self.aspect, self.z_near, self.z_far);
    }

    pub fn projection(&self) -> Mat4 { self.projection }

    pub fn view(&self) -> Mat4 { Mat4::look_at_rh(self.eye, self.target, self.up) }

    pub fn view_proj(&self) -> Mat4 { self.projection * self.view() }

    pub fn look_at(&mut self, target: Vec3) { self.target = target; }

    pub fn forward(&self) -> Vec3 { (self.target - self.eye).normalize_or_zero() }

    pub fn right(&self) -> Vec3 { self.forward().cross(self.up).normalize_or_zero() }
}

fn aspect_ratio(width: u32, height: u32) -> f32 {
    width as f32 / height.max(1) as f32
}
