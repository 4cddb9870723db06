use crate::error::SceneError;
use crate::model::{Material, PerspectiveCamera, PrimitiveHandle, Scene, Shape};

/// What the scene needs from a renderer.
///
/// `WgpuRenderer` draws to a real surface; tests substitute a recorder.
pub trait RenderBackend {
    fn create_primitive(&mut self, shape: &Shape, material: &Material) -> PrimitiveHandle;

    /// Resize the output buffer.
    fn set_size(&mut self, width: u32, height: u32);

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<(), SceneError>;
}
