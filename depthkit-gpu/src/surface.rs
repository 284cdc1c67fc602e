//! Texture surface showing the latest processed depth image.

use depthkit_live::{LatestImage, PublishedImage};
use tracing::debug;

use crate::context::GpuContext;

pub const IMAGE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R8Unorm;

/// Extent of a texture holding a `width × height` single-channel image.
pub fn image_extent(width: u32, height: u32) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    }
}

/// Pulls from a [`LatestImage`] and mirrors it into a GPU texture.
///
/// The texture is recreated only when the image size changes.
#[derive(Default)]
pub struct ImageSurface {
    texture: Option<wgpu::Texture>,
    view: Option<wgpu::TextureView>,
    size: (u32, u32),
    generation: u64,
}

impl ImageSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upload the latest image if a newer one was published.
    ///
    /// Returns the generation uploaded, or `None` when nothing changed.
    pub fn refresh(&mut self, ctx: &GpuContext, latest: &LatestImage) -> Option<u64> {
        let published = latest.newer_than(self.generation)?;
        self.upload(ctx, &published);
        Some(published.generation)
    }

    fn upload(&mut self, ctx: &GpuContext, published: &PublishedImage) {
        let (width, height) = published.image.dimensions();
        if self.texture.is_none() || self.size != (width, height) {
            let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
                label: Some("Depth Image"),
                size: image_extent(width, height),
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: IMAGE_FORMAT,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            });
            self.view = Some(texture.create_view(&wgpu::TextureViewDescriptor::default()));
            self.texture = Some(texture);
            self.size = (width, height);
            debug!("Allocated {}x{} depth texture", width, height);
        }

        if let Some(texture) = &self.texture {
            ctx.queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                published.image.as_raw(),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(width),
                    rows_per_image: Some(height),
                },
                image_extent(width, height),
            );
        }
        self.generation = published.generation;
    }

    pub fn view(&self) -> Option<&wgpu::TextureView> {
        self.view.as_ref()
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Generation of the image currently on the GPU; 0 before the first upload.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
