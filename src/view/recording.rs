//! Test double that records what the scene asks of its renderer.

use glam::Vec3;

use crate::error::SceneError;
use crate::model::{Material, PerspectiveCamera, PrimitiveHandle, Scene, Shape};
use crate::view::RenderBackend;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreatePrimitive,
    SetSize(u32, u32),
    Render,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub nodes: usize,
    pub eye: Vec3,
    pub aspect: f32,
}

#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub calls: Vec<Call>,
    pub primitives: Vec<(Shape, Material)>,
    pub size: (u32, u32),
    pub frames: Vec<Frame>,
}

impl RenderBackend for RecordingBackend {
    fn create_primitive(&mut self, shape: &Shape, material: &Material) -> PrimitiveHandle {
        self.calls.push(Call::CreatePrimitive);
        self.primitives.push((*shape, *material));
        PrimitiveHandle(self.primitives.len() as u32 - 1)
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.calls.push(Call::SetSize(width, height));
        self.size = (width, height);
    }

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<(), SceneError> {
        self.calls.push(Call::Render);
        self.frames.push(Frame { nodes: scene.node_count(), eye: camera.eye, aspect: camera.aspect });
        Ok(())
    }
}
