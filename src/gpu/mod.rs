mod context;
mod buffers;
mod render;

pub use context::GpuContext;
pub use buffers::SceneBuffers;
pub use render::RenderPipeline;
