use crate::error::TextureError;
use crate::gpu::GpuContext;

/// Side length of the built-in cube texture.
pub const CHECKER_SIZE: u32 = 256;
const CHECKER_CELLS: u32 = 8;

/// A GPU texture and sampler bound to the cube's pixel shader.
#[derive(Debug)]
pub struct Texture {
    #[allow(dead_code)]
    pub(crate) texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
    pub(crate) sampler: wgpu::Sampler,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    /// Create a texture from raw RGBA data.
    pub fn from_rgba(gpu: &GpuContext, data: &[u8], width: u32, height: u32, label: &str) -> Self {
        use wgpu::util::DeviceExt;

        let texture = gpu.device.create_texture_with_data(
            &gpu.queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            data,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{} Sampler", label)),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
            width,
            height,
        }
    }

    /// Load a texture from an image file.
    pub fn from_file(gpu: &GpuContext, path: &str) -> Result<Self, TextureError> {
        let img = image::open(path)
            .map_err(|source| TextureError::Image {
                path: path.to_string(),
                source,
            })?
            .to_rgba8();
        let (width, height) = img.dimensions();
        log::info!("loaded texture '{}' ({}x{})", path, width, height);
        Ok(Self::from_rgba(gpu, &img, width, height, path))
    }

    /// The built-in texture: a framed checkerboard with a little grain.
    pub fn checker(gpu: &GpuContext, seed: u32) -> Self {
        let data = checker_pixels(CHECKER_SIZE, seed);
        Self::from_rgba(gpu, &data, CHECKER_SIZE, CHECKER_SIZE, "Checker Texture")
    }
}

/// RGBA pixels for [`Texture::checker`].
pub(crate) fn checker_pixels(size: u32, seed: u32) -> Vec<u8> {
    let mut data = vec![0u8; (size * size * 4) as usize];

    let light: [u8; 3] = [232, 226, 210];
    let dark: [u8; 3] = [52, 86, 140];
    let frame: [u8; 3] = [24, 24, 28];

    let cell = (size / CHECKER_CELLS).max(1);
    let border = (size / 32).max(1);

    for y in 0..size {
        for x in 0..size {
            let idx = ((y * size + x) * 4) as usize;

            let on_frame = x < border || y < border || x >= size - border || y >= size - border;
            let base = if on_frame {
                frame
            } else if (x / cell + y / cell) % 2 == 0 {
                light
            } else {
                dark
            };

            let variation = ((hash(x, y, seed) % 12) as i32) - 6;

            data[idx] = (base[0] as i32 + variation).clamp(0, 255) as u8;
            data[idx + 1] = (base[1] as i32 + variation).clamp(0, 255) as u8;
            data[idx + 2] = (base[2] as i32 + variation).clamp(0, 255) as u8;
            data[idx + 3] = 255;
        }
    }

    data
}

/// Simple hash function for procedural generation.
fn hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_add(x.wrapping_mul(374761393));
    h = h.wrapping_add(y.wrapping_mul(668265263));
    h ^= h >> 13;
    h = h.wrapping_mul(1274126177);
    h ^= h >> 16;
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checker_is_opaque_rgba() {
        let data = checker_pixels(64, 7);
        assert_eq!(data.len(), 64 * 64 * 4);
        assert!(data.chunks(4).all(|px| px[3] == 255));
    }

    #[test]
    fn checker_is_reproducible() {
        assert_eq!(checker_pixels(32, 3), checker_pixels(32, 3));
        assert_ne!(checker_pixels(32, 3), checker_pixels(32, 4));
    }

    #[test]
    fn checker_alternates_cells() {
        let size = 64;
        let data = checker_pixels(size, 0);
        let pixel = |x: u32, y: u32| data[((y * size + x) * 4) as usize] as i32;

        // Cells are 8 pixels wide; sample away from the frame.
        let light = pixel(12, 12);
        let dark = pixel(4, 12);
        assert!(light - dark > 100);
    }
}
