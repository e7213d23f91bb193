mod buffers;
mod context;
mod render;

pub use buffers::{SceneParams, VolumeBuffers};
pub use context::GpuContext;
pub use render::VolumePipeline;

/// Failures while bringing up the GPU side
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no suitable GPU adapter found")]
    NoAdapter,
    #[error("failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("surface not supported by adapter")]
    UnsupportedSurface,
}

pub type RenderResult<T> = Result<T, RenderError>;
