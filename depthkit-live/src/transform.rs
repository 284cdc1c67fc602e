//! Depth map to display image conversion.

use std::sync::Mutex;

use image::GrayImage;
use image::imageops::{self, FilterType};

use crate::config::{Rotation, Size};

/// Map float samples to 8-bit intensity.
///
/// Values are clamped to `[0, 1]` and scaled by 255; non-finite samples
/// become black. Returns `None` when the sample count does not match the
/// dimensions or the map is empty.
pub fn to_grayscale(samples: &[f32], width: usize, height: usize) -> Option<GrayImage> {
    if width == 0 || height == 0 || samples.len() != width * height {
        return None;
    }
    let pixels = samples.iter().map(|&s| intensity(s)).collect();
    GrayImage::from_raw(width as u32, height as u32, pixels)
}

fn intensity(sample: f32) -> u8 {
    if !sample.is_finite() {
        return 0;
    }
    (sample.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Resize and rotate an image so it fills `target`.
///
/// For quarter turns the image is resized to the transposed size first, so
/// the result always has exactly `target` dimensions.
pub fn fit_to_target(image: &GrayImage, target: Size, rotation: Rotation) -> GrayImage {
    let (width, height) = match rotation {
        Rotation::None | Rotation::Cw180 => (target.width, target.height),
        Rotation::Cw90 | Rotation::Cw270 => (target.height, target.width),
    };
    let resized = if image.dimensions() == (width, height) {
        image.clone()
    } else {
        imageops::resize(image, width, height, FilterType::Triangle)
    };
    match rotation {
        Rotation::None => resized,
        Rotation::Cw90 => imageops::rotate90(&resized),
        Rotation::Cw180 => imageops::rotate180(&resized),
        Rotation::Cw270 => imageops::rotate270(&resized),
    }
}

/// Current render target size, updated by the render side.
#[derive(Debug)]
pub struct DrawableSize {
    size: Mutex<Size>,
}

impl DrawableSize {
    pub fn new(size: Size) -> Self {
        Self { size: Mutex::new(size) }
    }

    pub fn get(&self) -> Size {
        *self.size.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Takes effect from the next processed frame.
    pub fn set(&self, size: Size) {
        *self.size.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = size;
    }
}

impl Default for DrawableSize {
    fn default() -> Self {
        Self::new(Size::default())
    }
}
