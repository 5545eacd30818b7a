//! Shared graphics plumbing for the orrery
//!
//! This crate provides window and GPU setup, the textured mesh vertex format,
//! buffer helpers and the orbit camera used by the renderer.

pub mod camera;
pub mod error;
pub mod graphics;

pub use camera::*;
pub use error::GraphicsError;
pub use graphics::*;
