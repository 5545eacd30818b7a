//! Orrery
//!
//! A static table of celestial bodies is turned into a transform hierarchy of
//! meshes and invisible pivots, then animated by fixed per-frame rotations:
//!
//! - **solar_system**: sizes, orbit radii, rotation rates, rings and moons
//! - **scene_graph**: arena of parent/child transforms
//! - **scene**: builds the hierarchy from the table and ticks it
//! - **geometry**: sphere and ring meshes
//! - **texture**: image loading with flat-colour fallback
//! - **renderer**: wgpu pipelines for the skybox, spheres and rings

pub mod cli;
pub mod config;
pub mod error;
pub mod geometry;
pub mod renderer;
pub mod scene;
pub mod scene_graph;
pub mod solar_system;
pub mod texture;
