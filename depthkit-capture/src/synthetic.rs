//! Deterministic synthetic RGBD camera.
//!
//! Renders a flat back wall with a sphere that swings towards and away from
//! the camera. Stands in for a hardware depth camera in the CLI and in tests.

use std::f32::consts::TAU;

use image::{Rgba, RgbaImage};
use tracing::{debug, info};

use crate::buffer::DepthBuffer;
use crate::calibration::{CameraCalibration, Intrinsics};
use crate::decode::f32_to_f16;
use crate::depth_data::DepthData;
use crate::format::PixelFormat;
use crate::source::{CameraPosition, CaptureError, CaptureSource, FaceObservation, FramePair};

/// Distance of the back wall in meters.
const WALL_DEPTH: f32 = 2.5;
/// Sphere radius in meters.
const SPHERE_RADIUS: f32 = 0.15;
/// Closest and farthest sphere distance in meters.
const SPHERE_NEAR: f32 = 0.6;
const SPHERE_FAR: f32 = 2.2;
/// Seconds for one full approach/retreat cycle.
const SWING_PERIOD: f32 = 8.0;
/// Focal length in depth-map pixels.
const DEPTH_FOCAL: f32 = 280.0;

/// Synthetic RGBD capture source.
pub struct SyntheticDepthCamera {
    depth_width: usize,
    depth_height: usize,
    color_scale: u32,
    format: PixelFormat,
    fps: f32,
    holes: bool,
    filter_enabled: bool,
    position: CameraPosition,
    frame_count: u64,
    active: bool,
}

impl SyntheticDepthCamera {
    /// A 320x240 half precision depth camera at 30 fps.
    pub fn new() -> Self {
        Self {
            depth_width: 320,
            depth_height: 240,
            color_scale: 2,
            format: PixelFormat::DepthFloat16,
            fps: 30.0,
            holes: true,
            filter_enabled: false,
            position: CameraPosition::Back,
            frame_count: 0,
            active: true,
        }
    }

    /// Set the depth map resolution.
    pub fn with_depth_resolution(mut self, width: usize, height: usize) -> Self {
        self.depth_width = width;
        self.depth_height = height;
        self
    }

    /// Set how many times larger the color frame is than the depth map.
    pub fn with_color_scale(mut self, scale: u32) -> Self {
        self.color_scale = scale.max(1);
        self
    }

    /// Set the depth map encoding.
    pub fn with_format(mut self, format: PixelFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_frame_rate(mut self, fps: f32) -> Self {
        self.fps = fps;
        self
    }

    /// Punch a sparse pattern of invalid samples into the depth map.
    pub fn with_holes(mut self, holes: bool) -> Self {
        self.holes = holes;
        self
    }

    fn color_dimensions(&self) -> (u32, u32) {
        (
            self.depth_width as u32 * self.color_scale,
            self.depth_height as u32 * self.color_scale,
        )
    }

    /// Calibration against the color frame's resolution.
    pub fn calibration(&self) -> CameraCalibration {
        let (width, height) = self.color_dimensions();
        let scale = self.color_scale as f32;
        CameraCalibration::new(
            Intrinsics::new(
                DEPTH_FOCAL * scale,
                DEPTH_FOCAL * scale,
                width as f32 / 2.0,
                height as f32 / 2.0,
            ),
            width,
            height,
        )
    }

    /// Sphere distance at time `t` seconds.
    pub fn sphere_distance(t: f32) -> f32 {
        let swing = 0.5 + 0.5 * (TAU * t / SWING_PERIOD).cos();
        SPHERE_NEAR + (SPHERE_FAR - SPHERE_NEAR) * swing
    }

    /// Capture a single RGBD still, independent of the streaming state.
    pub fn capture_still(&self, timestamp: f64) -> FramePair {
        let frame = self.render(timestamp, self.frame_count);
        debug!("Captured still at {:.3}s", timestamp);
        frame
    }

    fn render(&self, timestamp: f64, frame_number: u64) -> FramePair {
        let distance = Self::sphere_distance(timestamp as f32);
        let (w, h) = (self.depth_width, self.depth_height);
        let center = (w as f32 / 2.0, h as f32 / 2.0);
        let radius_px = DEPTH_FOCAL * SPHERE_RADIUS / distance;
        let mirrored = self.position == CameraPosition::Front;

        let mut depth = Vec::with_capacity(w * h);
        for y in 0..h {
            for x in 0..w {
                let sample_x = if mirrored { w - 1 - x } else { x };
                let dx = sample_x as f32 + 0.5 - center.0;
                let dy = y as f32 + 0.5 - center.1;
                let rho = (dx * dx + dy * dy).sqrt() / radius_px;
                let mut z = if rho < 1.0 {
                    distance - SPHERE_RADIUS * (1.0 - rho * rho).sqrt()
                } else {
                    WALL_DEPTH
                };
                if self.holes && (x * 7 + y * 13 + frame_number as usize) % 53 == 0 {
                    z = f32::NAN;
                }
                depth.push(z);
            }
        }

        let map = self.encode(&depth);
        let mut data = DepthData::new(map).with_calibration(self.calibration());
        if self.filter_enabled {
            data = apply_filter(data);
        }

        let video = self.render_color(distance, mirrored);
        let pair = FramePair::new(video, Some(data), timestamp, frame_number);
        if mirrored {
            let size = 2.0 * radius_px;
            pair.with_face(FaceObservation {
                bounds: [
                    (center.0 - radius_px) / w as f32,
                    (center.1 - radius_px) / h as f32,
                    size / w as f32,
                    size / h as f32,
                ],
            })
        } else {
            pair
        }
    }

    fn encode(&self, depth: &[f32]) -> DepthBuffer {
        let (w, h) = (self.depth_width, self.depth_height);
        let values: Vec<f32> = if self.format.is_disparity() {
            depth.iter().map(|z| 1.0 / z).collect()
        } else {
            depth.to_vec()
        };
        match self.format {
            PixelFormat::DepthFloat16 | PixelFormat::DisparityFloat16 => {
                let bits: Vec<u16> = values.into_iter().map(f32_to_f16).collect();
                DepthBuffer::from_f16_bits(w, h, self.format, &bits)
            }
            PixelFormat::DepthFloat32 | PixelFormat::DisparityFloat32 => {
                DepthBuffer::from_f32(w, h, self.format, &values)
            }
        }
    }

    fn render_color(&self, distance: f32, mirrored: bool) -> RgbaImage {
        let (width, height) = self.color_dimensions();
        let center = (width as f32 / 2.0, height as f32 / 2.0);
        let radius = DEPTH_FOCAL * self.color_scale as f32 * SPHERE_RADIUS / distance;
        let sphere = if mirrored {
            [40, 90, 230, 255]
        } else {
            [220, 50, 40, 255]
        };

        RgbaImage::from_fn(width, height, |x, y| {
            let dx = x as f32 + 0.5 - center.0;
            let dy = y as f32 + 0.5 - center.1;
            if dx * dx + dy * dy < radius * radius {
                Rgba(sphere)
            } else {
                let shade = (60 + (y * 120) / height.max(1)) as u8;
                Rgba([shade, shade, (shade / 2).saturating_add(40), 255])
            }
        })
    }
}

impl Default for SyntheticDepthCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureSource for SyntheticDepthCamera {
    fn next_frame(&mut self) -> Result<Option<FramePair>, CaptureError> {
        if !self.active {
            return Ok(None);
        }

        let timestamp = self.frame_count as f64 / self.fps as f64;
        let frame = self.render(timestamp, self.frame_count);
        self.frame_count += 1;
        debug!("Captured frame {} at {:.3}s", self.frame_count, timestamp);
        Ok(Some(frame))
    }

    fn frame_rate(&self) -> Option<f32> {
        Some(self.fps)
    }

    fn resolution(&self) -> (u32, u32) {
        self.color_dimensions()
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn set_depth_filter_enabled(&mut self, enabled: bool) {
        if self.filter_enabled != enabled {
            info!("Depth filtering {}", if enabled { "enabled" } else { "disabled" });
        }
        self.filter_enabled = enabled;
    }

    fn change_camera(&mut self, position: CameraPosition) -> Result<(), CaptureError> {
        info!("Switching to {:?} camera", position);
        self.position = position;
        Ok(())
    }

    fn stop(&mut self) {
        self.active = false;
        info!("Synthetic capture stopped after {} frames", self.frame_count);
    }
}

/// Fill sensor holes, keeping the raw data when it cannot be decoded.
fn apply_filter(data: DepthData) -> DepthData {
    match data.filled() {
        Ok(filled) => filled,
        Err(err) => {
            debug!("Depth filtering skipped: {}", err);
            data
        }
    }
}
