//! Common capture source types and traits.

use image::RgbaImage;
use thiserror::Error;

use crate::depth_data::DepthData;

/// Errors that can occur during capture.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Failed to capture frame: {0}")]
    CaptureFailed(String),

    #[error("Stream ended")]
    StreamEnded,

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(#[from] crate::decode::DecodeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which physical camera a source is reading from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraPosition {
    #[default]
    Back,
    Front,
}

/// A detected face, in normalized video coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceObservation {
    /// x, y, width, height in `0..=1`.
    pub bounds: [f32; 4],
}

/// A synchronized video/depth delivery.
///
/// `depth` may be absent when the sensor dropped the depth half of a pair;
/// consumers are expected to skip such frames.
#[derive(Debug, Clone)]
pub struct FramePair {
    /// RGBA video frame.
    pub video: RgbaImage,
    /// Depth or disparity map captured with the video frame.
    pub depth: Option<DepthData>,
    /// Optional face metadata delivered with the pair.
    pub face: Option<FaceObservation>,
    /// Frame timestamp in seconds (relative to stream start).
    pub timestamp: f64,
    /// Frame number.
    pub frame_number: u64,
}

impl FramePair {
    /// Create a new frame pair.
    pub fn new(video: RgbaImage, depth: Option<DepthData>, timestamp: f64, frame_number: u64) -> Self {
        Self {
            video,
            depth,
            face: None,
            timestamp,
            frame_number,
        }
    }

    /// Attach face metadata.
    pub fn with_face(mut self, face: FaceObservation) -> Self {
        self.face = Some(face);
        self
    }

    /// Get video dimensions (width, height).
    pub fn dimensions(&self) -> (u32, u32) {
        self.video.dimensions()
    }
}

/// Trait for capture sources that provide synchronized video and depth.
pub trait CaptureSource {
    /// Get the next frame pair from the source.
    ///
    /// Returns `Ok(None)` once the source has been stopped.
    fn next_frame(&mut self) -> Result<Option<FramePair>, CaptureError>;

    /// Get the frame rate, if known.
    fn frame_rate(&self) -> Option<f32>;

    /// Get the video resolution (width, height).
    fn resolution(&self) -> (u32, u32);

    /// Check if the source is still active.
    fn is_active(&self) -> bool;

    /// Enable or disable sensor-side depth filtering (hole filling).
    fn set_depth_filter_enabled(&mut self, enabled: bool);

    /// Switch to another physical camera.
    fn change_camera(&mut self, position: CameraPosition) -> Result<(), CaptureError>;

    /// Stop capturing.
    fn stop(&mut self);
}
