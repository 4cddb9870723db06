//! Tunables for the board, camera, orbit controls and renderer.
//!
//! Everything has a `Default` matching the stock scene: an 8×8 black and
//! white board, a 75° camera seven units back, and orbit controls that only
//! rotate, with light damping.

/// Board dimensions and palette.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardConfig {
    pub width: u32,
    pub height: u32,
    pub light_color: [f32; 4],
    pub dark_color: [f32; 4],
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: 8,
            height: 8,
            light_color: [1.0, 1.0, 1.0, 1.0],
            dark_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

/// Perspective camera parameters. `fov_y_deg` is vertical, in degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraConfig {
    pub fov_y_deg: f32,
    pub z_near: f32,
    pub z_far: f32,
    /// Initial distance from the origin along +Z.
    pub distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_deg: 75.0,
            z_near: 0.1,
            z_far: 1000.0,
            distance: 7.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrbitConfig {
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub enable_pan: bool,
    pub enable_zoom: bool,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            enable_damping: true,
            damping_factor: 0.005,
            enable_pan: false,
            enable_zoom: false,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub antialias: bool,
    pub clear_color: [f64; 4],
}

impl RenderConfig {
    pub fn sample_count(&self) -> u32 {
        if self.antialias { 4 } else { 1 }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            antialias: true,
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneConfig {
    pub board: BoardConfig,
    pub camera: CameraConfig,
    pub orbit: OrbitConfig,
    pub render: RenderConfig,
}
