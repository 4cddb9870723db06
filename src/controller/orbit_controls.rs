use std::f32::consts::PI;

use glam::Vec3;

use crate::config::OrbitConfig;
use crate::controller::input::{InputEvent, MouseButton};
use crate::model::{PerspectiveCamera, Viewport};

const EPS: f32 = 1e-6;

/// Position relative to the orbit target. `theta` turns around +Y starting
/// at +Z, `phi` is the polar angle measured from +Y.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Spherical {
    radius: f32,
    theta: f32,
    phi: f32,
}

impl Spherical {
    fn from_offset(v: Vec3) -> Self {
        let radius = v.length();
        if radius == 0.0 {
            return Self { radius, theta: 0.0, phi: 0.0 };
        }
        Self {
            radius,
            theta: v.x.atan2(v.z),
            phi: (v.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> Vec3 {
        let sin_phi_r = self.phi.sin() * self.radius;
        Vec3::new(sin_phi_r * self.theta.sin(), self.phi.cos() * self.radius, sin_phi_r * self.theta.cos())
    }

    /// Keep phi off the poles, where theta is undefined.
    fn make_safe(&mut self) {
        self.phi = self.phi.clamp(EPS, PI - EPS);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragState {
    Idle,
    Rotate,
    Pan,
}

/// Orbits a camera around `target` from pointer drags, with optional
/// inertial damping. Input only accumulates deltas; [`OrbitControls::update`]
/// applies them to the camera and must run once per frame.
pub struct OrbitControls {
    pub target: Vec3,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub enable_pan: bool,
    pub enable_zoom: bool,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    pub min_distance: f32,
    pub max_distance: f32,

    spherical_delta: Spherical,
    scale: f32,
    pan_offset: Vec3,
    state: DragState,
    last_pointer: (f32, f32),
}

impl OrbitControls {
    pub fn new(config: &OrbitConfig) -> Self {
        Self {
            target: Vec3::ZERO,
            enable_damping: config.enable_damping,
            damping_factor: config.damping_factor,
            enable_pan: config.enable_pan,
            enable_zoom: config.enable_zoom,
            rotate_speed: config.rotate_speed,
            zoom_speed: config.zoom_speed,
            pan_speed: config.pan_speed,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            spherical_delta: Spherical { radius: 0.0, theta: 0.0, phi: 0.0 },
            scale: 1.0,
            pan_offset: Vec3::ZERO,
            state: DragState::Idle,
            last_pointer: (0.0, 0.0),
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.state != DragState::Idle
    }

    /// Accumulate one input event. Returns whether the controls consumed it.
    pub fn handle_input(&mut self, event: &InputEvent, camera: &PerspectiveCamera, viewport: Viewport) -> bool {
        match *event {
            InputEvent::PointerDown { button, x, y } => {
                self.state = match button {
                    MouseButton::Left => DragState::Rotate,
                    MouseButton::Right if self.enable_pan => DragState::Pan,
                    _ => DragState::Idle,
                };
                self.last_pointer = (x, y);
                self.is_dragging()
            }
            InputEvent::PointerMove { x, y } => {
                let (dx, dy) = (x - self.last_pointer.0, y - self.last_pointer.1);
                self.last_pointer = (x, y);
                match self.state {
                    DragState::Rotate => self.rotate(dx, dy, viewport),
                    DragState::Pan => self.pan(dx, dy, camera, viewport),
                    DragState::Idle => return false,
                }
                true
            }
            InputEvent::PointerUp { .. } | InputEvent::PointerCancel => {
                let was_dragging = self.is_dragging();
                self.state = DragState::Idle;
                was_dragging
            }
            InputEvent::Wheel { delta_y } => {
                if !self.enable_zoom || delta_y == 0.0 {
                    return false;
                }
                let zoom_scale = 0.95f32.powf(self.zoom_speed);
                if delta_y < 0.0 {
                    self.scale *= zoom_scale;
                } else {
                    self.scale /= zoom_scale;
                }
                true
            }
        }
    }

    fn rotate(&mut self, dx: f32, dy: f32, viewport: Viewport) {
        let h = viewport.height.max(1) as f32;
        // A full-height drag turns the view once around.
        self.spherical_delta.theta -= 2.0 * PI * dx / h * self.rotate_speed;
        self.spherical_delta.phi -= 2.0 * PI * dy / h * self.rotate_speed;
    }

    fn pan(&mut self, dx: f32, dy: f32, camera: &PerspectiveCamera, viewport: Viewport) {
        let h = viewport.height.max(1) as f32;
        let target_distance = (camera.eye - self.target).length() * (camera.fov_y / 2.0).tan();
        let right = camera.right();
        let up = right.cross(camera.forward());
        let scale = 2.0 * target_distance / h * self.pan_speed;
        self.pan_offset += -right * dx * scale + up * dy * scale;
    }

    /// Apply accumulated input to `camera`. Returns whether it moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let last_eye = camera.eye;
        let mut spherical = Spherical::from_offset(camera.eye - self.target);

        let step = if self.enable_damping { self.damping_factor } else { 1.0 };
        spherical.theta += self.spherical_delta.theta * step;
        spherical.phi += self.spherical_delta.phi * step;
        spherical.phi = spherical.phi.clamp(self.min_polar_angle, self.max_polar_angle);
        spherical.make_safe();
        spherical.radius = (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);
        self.target += self.pan_offset * step;

        camera.eye = self.target + spherical.to_offset();
        camera.look_at(self.target);

        if self.enable_damping {
            self.spherical_delta.theta *= 1.0 - self.damping_factor;
            self.spherical_delta.phi *= 1.0 - self.damping_factor;
            self.pan_offset *= 1.0 - self.damping_factor;
        } else {
            self.spherical_delta.theta = 0.0;
            self.spherical_delta.phi = 0.0;
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;

        (camera.eye - last_eye).length_squared() > EPS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraConfig;

    const VIEWPORT: Viewport = Viewport { width: 800, height: 600 };

    fn camera_at_z(distance: f32) -> PerspectiveCamera {
        let mut camera = PerspectiveCamera::new(&CameraConfig::default(), VIEWPORT.width, VIEWPORT.height);
        camera.eye = Vec3::new(0.0, 0.0, distance);
        camera
    }

    fn drag(controls: &mut OrbitControls, camera: &PerspectiveCamera, button: MouseButton, dx: f32, dy: f32) {
        controls.handle_input(&InputEvent::PointerDown { button, x: 100.0, y: 100.0 }, camera, VIEWPORT);
        controls.handle_input(&InputEvent::PointerMove { x: 100.0 + dx, y: 100.0 + dy }, camera, VIEWPORT);
        controls.handle_input(&InputEvent::PointerUp { button }, camera, VIEWPORT);
    }

    fn undamped() -> OrbitControls {
        OrbitControls::new(&OrbitConfig { enable_damping: false, ..OrbitConfig::default() })
    }

    #[test]
    fn test_spherical_roundtrip_of_start_position() {
        let s = Spherical::from_offset(Vec3::new(0.0, 0.0, 7.0));
        assert!((s.radius - 7.0).abs() < 1e-6);
        assert!(s.theta.abs() < 1e-6);
        assert!((s.phi - PI / 2.0).abs() < 1e-6);
        assert!((s.to_offset() - Vec3::new(0.0, 0.0, 7.0)).length() < 1e-5);
    }

    #[test]
    fn test_idle_update_keeps_camera_still() {
        let mut controls = OrbitControls::new(&OrbitConfig::default());
        let mut camera = camera_at_z(7.0);
        assert!(!controls.update(&mut camera));
        assert!((camera.eye - Vec3::new(0.0, 0.0, 7.0)).length() < 1e-5);
        assert_eq!(camera.target, Vec3::ZERO);
    }

    #[test]
    fn test_drag_rotates_at_constant_distance() {
        let mut controls = undamped();
        let mut camera = camera_at_z(7.0);
        // A quarter of the viewport height is a quarter turn.
        drag(&mut controls, &camera, MouseButton::Left, -150.0, 0.0);

        assert!(controls.update(&mut camera));
        assert!((camera.eye.length() - 7.0).abs() < 1e-4);
        assert!((camera.eye - Vec3::new(7.0, 0.0, 0.0)).length() < 1e-3, "eye at {:?}", camera.eye);

        // Undamped: everything was applied in one step.
        assert!(!controls.update(&mut camera));
    }

    #[test]
    fn test_vertical_drag_stops_at_pole() {
        let mut controls = undamped();
        let mut camera = camera_at_z(7.0);
        drag(&mut controls, &camera, MouseButton::Left, 0.0, 2000.0);
        controls.update(&mut camera);

        assert!(camera.eye.y > 6.99);
        assert!((camera.eye.length() - 7.0).abs() < 1e-4);
    }

    #[test]
    fn test_damping_spreads_rotation_over_frames() {
        let mut controls = OrbitControls::new(&OrbitConfig::default());
        let mut camera = camera_at_z(7.0);
        drag(&mut controls, &camera, MouseButton::Left, -150.0, 0.0);

        assert!(controls.update(&mut camera));
        let first = camera.eye.x.atan2(camera.eye.z);
        assert!((first - PI / 2.0 * 0.005).abs() < 1e-4);

        assert!(controls.update(&mut camera));
        let second = camera.eye.x.atan2(camera.eye.z);
        assert!(second > first);
        assert!(second < PI / 2.0);
    }

    #[test]
    fn test_pan_and_zoom_ignored_when_disabled() {
        let mut controls = OrbitControls::new(&OrbitConfig::default());
        let mut camera = camera_at_z(7.0);

        assert!(!controls.handle_input(&InputEvent::Wheel { delta_y: -120.0 }, &camera, VIEWPORT));
        drag(&mut controls, &camera, MouseButton::Right, 80.0, 40.0);

        assert!(!controls.update(&mut camera));
        assert!((camera.eye - Vec3::new(0.0, 0.0, 7.0)).length() < 1e-5);
        assert_eq!(controls.target, Vec3::ZERO);
    }

    #[test]
    fn test_wheel_dollies_when_enabled() {
        let mut controls = OrbitControls::new(&OrbitConfig { enable_zoom: true, ..OrbitConfig::default() });
        let mut camera = camera_at_z(7.0);

        assert!(controls.handle_input(&InputEvent::Wheel { delta_y: -120.0 }, &camera, VIEWPORT));
        controls.update(&mut camera);
        assert!((camera.eye.length() - 7.0 * 0.95).abs() < 1e-4);

        controls.handle_input(&InputEvent::Wheel { delta_y: 120.0 }, &camera, VIEWPORT);
        controls.update(&mut camera);
        assert!((camera.eye.length() - 7.0).abs() < 1e-4);
    }

    #[test]
    fn test_right_drag_pans_target_when_enabled() {
        let mut controls = OrbitControls::new(&OrbitConfig {
            enable_pan: true,
            enable_damping: false,
            ..OrbitConfig::default()
        });
        let mut camera = camera_at_z(7.0);
        drag(&mut controls, &camera, MouseButton::Right, 60.0, 0.0);
        controls.update(&mut camera);

        // Dragging right moves the scene right, so the target slides left.
        assert!(controls.target.x < 0.0);
        assert!(controls.target.y.abs() < 1e-5);
        assert!((camera.eye - controls.target - Vec3::new(0.0, 0.0, 7.0)).length() < 1e-4);
    }

    #[test]
    fn test_move_without_press_is_ignored() {
        let mut controls = OrbitControls::new(&OrbitConfig::default());
        let camera = camera_at_z(7.0);
        assert!(!controls.handle_input(&InputEvent::PointerMove { x: 10.0, y: 10.0 }, &camera, VIEWPORT));
        assert!(!controls.handle_input(&InputEvent::PointerCancel, &camera, VIEWPORT));
    }
}
