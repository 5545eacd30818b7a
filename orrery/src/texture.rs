//! Image loading and GPU texture upload
//!
//! A texture that fails to load is replaced by a 1x1 swatch of the body's
//! tint so a missing asset never stops the orrery from starting.

use image::{imageops, imageops::FilterType, RgbaImage};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("failed to load {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Decode an image file into RGBA8
pub fn load_rgba(path: &Path) -> Result<RgbaImage, TextureError> {
    let image = image::open(path).map_err(|source| TextureError::Load {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(image.to_rgba8())
}

/// Single pixel image of a flat colour
pub fn solid_rgba(tint: [f32; 3]) -> RgbaImage {
    let [r, g, b] = tint.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
    RgbaImage::from_pixel(1, 1, image::Rgba([r, g, b, 255]))
}

/// Load `file` from `dir`, falling back to `tint` when it cannot be read
pub fn load_or_tint(dir: &Path, file: &str, tint: [f32; 3]) -> RgbaImage {
    let path = dir.join(file);
    match load_rgba(&path) {
        Ok(image) => {
            log::debug!("Loaded {} ({}x{})", path.display(), image.width(), image.height());
            image
        }
        Err(e) => {
            log::warn!("{e}; using flat colour instead");
            solid_rgba(tint)
        }
    }
}

/// Shrink an image so neither side exceeds `max_side`, keeping its aspect ratio
pub fn fit_within(image: RgbaImage, max_side: u32) -> RgbaImage {
    let (w, h) = image.dimensions();
    if w <= max_side && h <= max_side {
        return image;
    }
    let scale = max_side as f32 / w.max(h) as f32;
    let new_w = ((w as f32 * scale).round() as u32).clamp(1, max_side);
    let new_h = ((h as f32 * scale).round() as u32).clamp(1, max_side);
    imageops::resize(&image, new_w, new_h, FilterType::Triangle)
}

/// Cube map faces must be square
pub fn square_face(image: RgbaImage, max_side: u32) -> RgbaImage {
    let (w, h) = image.dimensions();
    let side = w.min(h).min(max_side).max(1);
    if w == side && h == side {
        return image;
    }
    imageops::resize(&image, side, side, FilterType::Triangle)
}

/// A GPU texture's view and sampler; the view keeps the texture alive
pub struct Texture {
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl Texture {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

    /// Upload a 2D sRGB texture
    pub fn from_image(device: &wgpu::Device, queue: &wgpu::Queue, image: &RgbaImage, label: &str) -> Self {
        let max_side = device.limits().max_texture_dimension_2d;
        let fitted;
        let image = if image.width() > max_side || image.height() > max_side {
            fitted = fit_within(image.clone(), max_side);
            &fitted
        } else {
            image
        };

        let size = wgpu::Extent3d {
            width: image.width(),
            height: image.height(),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        write_layer(queue, &texture, image, 0);

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self { view, sampler }
    }

    /// Upload the same image to all six faces of a cube map
    pub fn cube_from_image(device: &wgpu::Device, queue: &wgpu::Queue, image: RgbaImage, label: &str) -> Self {
        let face = square_face(image, device.limits().max_texture_dimension_2d);
        let side = face.width();

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: side,
                height: side,
                depth_or_array_layers: 6,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        for layer in 0..6 {
            write_layer(queue, &texture, &face, layer);
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(label),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self { view, sampler }
    }
}

fn write_layer(queue: &wgpu::Queue, texture: &wgpu::Texture, image: &RgbaImage, layer: u32) {
    let (width, height) = image.dimensions();
    queue.write_texture(
        wgpu::ImageCopyTexture {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d { x: 0, y: 0, z: layer },
            aspect: wgpu::TextureAspect::All,
        },
        image.as_raw(),
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_rgba_converts_tint() {
        let image = solid_rgba([1.0, 0.5, 0.0]);
        assert_eq!(image.dimensions(), (1, 1));
        assert_eq!(image.get_pixel(0, 0).0, [255, 128, 0, 255]);
    }

    #[test]
    fn test_solid_rgba_clamps() {
        let image = solid_rgba([2.0, -1.0, 0.2]);
        assert_eq!(image.get_pixel(0, 0).0, [255, 0, 51, 255]);
    }

    #[test]
    fn test_missing_file_falls_back_to_tint() {
        let dir = tempfile::tempdir().unwrap();
        let image = load_or_tint(dir.path(), "no such planet.jpg", [0.0, 0.0, 1.0]);
        assert_eq!(image.get_pixel(0, 0).0, [0, 0, 255, 255]);
        assert!(matches!(
            load_rgba(&dir.path().join("no such planet.jpg")),
            Err(TextureError::Load { .. })
        ));
    }

    #[test]
    fn test_loads_png_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saturn ring.png");
        RgbaImage::from_pixel(4, 2, image::Rgba([10, 20, 30, 128])).save(&path).unwrap();

        let image = load_or_tint(dir.path(), "saturn ring.png", [1.0, 1.0, 1.0]);
        assert_eq!(image.dimensions(), (4, 2));
        assert_eq!(image.get_pixel(3, 1).0, [10, 20, 30, 128]);
    }

    #[test]
    fn test_fit_within_keeps_aspect() {
        let image = RgbaImage::new(400, 200);
        assert_eq!(fit_within(image.clone(), 1000).dimensions(), (400, 200));
        assert_eq!(fit_within(image, 100).dimensions(), (100, 50));
    }

    #[test]
    fn test_square_face() {
        let face = square_face(RgbaImage::new(300, 200), 8192);
        assert_eq!(face.dimensions(), (200, 200));
        let capped = square_face(RgbaImage::new(64, 64), 16);
        assert_eq!(capped.dimensions(), (16, 16));
    }
}
