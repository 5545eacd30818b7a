//! Top-level error type

use common::GraphicsError;
use winit::error::EventLoopError;

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum OrreryError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Graphics(#[from] GraphicsError),

    #[error("event loop error: {0}")]
    EventLoop(#[from] EventLoopError),
}
