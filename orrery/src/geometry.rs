//! CPU-side mesh generation for spheres and flat rings

use common::MeshVertex;
use std::f32::consts::{PI, TAU};

/// Theta segments used for planetary rings
pub const RING_SEGMENTS: u32 = 32;

/// Tessellation of every moon
pub const SATELLITE_SEGMENTS: u32 = 60;

#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// UV sphere centred on the origin.
///
/// Texture `u` wraps once around Y starting at -X; `v` runs from the north
/// pole (0) to the south pole (1). The seam column is duplicated so the
/// texture does not wrap backwards across the last quad.
pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let width_segments = width_segments.max(3);
    let height_segments = height_segments.max(2);
    let columns = width_segments + 1;

    let mut vertices = Vec::with_capacity((columns * (height_segments + 1)) as usize);
    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            let (sin_phi, cos_phi) = (u * TAU).sin_cos();
            let (sin_theta, cos_theta) = (v * PI).sin_cos();

            let normal = [-cos_phi * sin_theta, cos_theta, sin_phi * sin_theta];
            let position = [normal[0] * radius, normal[1] * radius, normal[2] * radius];
            vertices.push(MeshVertex::new(position, normal, [u, v]));
        }
    }

    let mut indices = Vec::new();
    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = iy * columns + ix + 1;
            let b = iy * columns + ix;
            let c = (iy + 1) * columns + ix;
            let d = (iy + 1) * columns + ix + 1;

            // Pole rows collapse to a single triangle
            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segments - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    MeshData { vertices, indices }
}

/// Flat annulus in the XY plane facing +Z, one radial segment deep
pub fn ring(inner_radius: f32, outer_radius: f32, theta_segments: u32) -> MeshData {
    let theta_segments = theta_segments.max(3);
    let columns = theta_segments + 1;

    let mut vertices = Vec::with_capacity((columns * 2) as usize);
    for radius in [inner_radius, outer_radius] {
        for i in 0..=theta_segments {
            let theta = i as f32 / theta_segments as f32 * TAU;
            let (sin, cos) = theta.sin_cos();
            let (x, y) = (radius * cos, radius * sin);

            // Planar mapping over the outer radius, v flipped for top-left origin
            let uv = [(x / outer_radius + 1.0) / 2.0, 1.0 - (y / outer_radius + 1.0) / 2.0];
            vertices.push(MeshVertex::new([x, y, 0.0], [0.0, 0.0, 1.0], uv));
        }
    }

    let mut indices = Vec::with_capacity((theta_segments * 6) as usize);
    for i in 0..theta_segments {
        let a = i;
        let b = columns + i;
        let c = columns + i + 1;
        let d = i + 1;
        indices.extend_from_slice(&[a, b, d, b, c, d]);
    }

    MeshData { vertices, indices }
}
