//! Graphics setup errors

use winit::error::{EventLoopError, OsError};

/// Errors raised while opening the window and acquiring the GPU
#[derive(Debug, thiserror::Error)]
pub enum GraphicsError {
    #[error("failed to create event loop: {0}")]
    EventLoop(#[source] EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[source] OsError),

    #[error("failed to create surface: {0}")]
    Surface(#[source] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter found")]
    NoAdapter,

    #[error("failed to create device: {0}")]
    Device(#[source] wgpu::RequestDeviceError),

    #[error("surface reports no supported formats")]
    NoSurfaceFormat,
}
