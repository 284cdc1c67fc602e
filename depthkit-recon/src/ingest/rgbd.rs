//! RGBD still ingestion

use depthkit_capture::{DepthData, FramePair};
use image::RgbaImage;

/// A single color image paired with its depth or disparity map
#[derive(Debug, Clone)]
pub struct RgbdStill {
    /// Full resolution color image
    pub color: RgbaImage,
    /// Depth or disparity map, usually smaller than `color`
    pub depth: DepthData,
}

impl RgbdStill {
    pub fn new(color: RgbaImage, depth: DepthData) -> Self {
        Self { color, depth }
    }

    /// Build a still from a captured frame pair
    ///
    /// Returns `None` when the pair carries no depth.
    pub fn from_frame(frame: FramePair) -> Option<Self> {
        let depth = frame.depth?;
        Some(Self::new(frame.video, depth))
    }

    /// Color image dimensions (width, height)
    pub fn color_dimensions(&self) -> (u32, u32) {
        self.color.dimensions()
    }
}
