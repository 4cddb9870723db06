// VIEW: Rendering and graphics
pub mod backend;
pub mod gpu_init;
pub mod mesh;
pub mod render;

#[cfg(test)]
pub(crate) mod recording;

pub use backend::RenderBackend;
pub use gpu_init::GpuContext;
pub use render::WgpuRenderer;
