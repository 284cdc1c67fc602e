//! RGBD unprojection into colored point clouds

use depthkit_capture::{CameraCalibration, DecodeError};
use glam::{Vec2, Vec3};
use image::RgbaImage;
use image::imageops::{self, FilterType};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::ingest::RgbdStill;
use crate::scene::PointCloud;

/// Default near-plane cut: keep points within one depth unit of the closest surface
pub const DEFAULT_NEAR_PLANE_MARGIN: f32 = 1.0;

/// Errors that can occur while reconstructing a still
#[derive(Debug, Error)]
pub enum ReconstructionError {
    #[error("Depth data has no camera calibration")]
    MissingCalibration,

    #[error("Depth decoding failed: {0}")]
    Decode(#[from] DecodeError),
}

/// Tunables for reconstruction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconstructionConfig {
    /// Points farther than `min(z) + near_plane_margin` are discarded.
    ///
    /// A foreground-isolation heuristic, not a visibility test.
    pub near_plane_margin: f32,
}

impl Default for ReconstructionConfig {
    fn default() -> Self {
        Self {
            near_plane_margin: DEFAULT_NEAR_PLANE_MARGIN,
        }
    }
}

/// Converts depth maps plus matching color images into point clouds
#[derive(Debug, Clone, Default)]
pub struct Unprojector {
    config: ReconstructionConfig,
}

impl Unprojector {
    pub fn new(config: ReconstructionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReconstructionConfig {
        &self.config
    }

    /// Reconstruct a still capture
    ///
    /// Disparity maps are converted to depth first. Without calibration the
    /// capture is skipped entirely with [`ReconstructionError::MissingCalibration`].
    #[tracing::instrument(skip_all)]
    pub fn reconstruct_still(&self, still: &RgbdStill) -> Result<PointCloud, ReconstructionError> {
        let calibration = *still
            .depth
            .calibration()
            .ok_or(ReconstructionError::MissingCalibration)?;

        let depth = still.depth.convert_to_depth()?;
        let samples = depth.samples()?;
        let (depth_width, _) = depth.dimensions();
        Ok(self.reconstruct(&still.color, &samples, depth_width, &calibration))
    }

    /// Back-project every depth sample and keep the near foreground
    ///
    /// `samples` is a row-major depth map `depth_width` pixels wide. The color
    /// image is resampled to the depth map's grid so sample `i` and color pixel
    /// `i` coincide.
    pub fn reconstruct(
        &self,
        color: &RgbaImage,
        samples: &[f32],
        depth_width: usize,
        calibration: &CameraCalibration,
    ) -> PointCloud {
        if samples.is_empty() || depth_width == 0 {
            return PointCloud::default();
        }

        let depth_height = samples.len() / depth_width;
        let full_rows = depth_width * depth_height;
        if full_rows < samples.len() {
            debug!(
                "Ignoring {} samples past the last full row of width {}",
                samples.len() - full_rows,
                depth_width
            );
        }
        let samples = &samples[..full_rows];
        if samples.is_empty() {
            return PointCloud::default();
        }

        let intrinsics = calibration.intrinsics_for_width(depth_width);
        debug!(
            "Unprojecting {}x{} depth with fx={:.2} fy={:.2} cx={:.2} cy={:.2}",
            depth_width, depth_height, intrinsics.fx, intrinsics.fy, intrinsics.cx, intrinsics.cy
        );

        let Some(z_nearest) = nearest_depth(samples) else {
            return PointCloud::default();
        };
        let resized = resize_to_grid(color, depth_width as u32, depth_height as u32);
        let pixels = resized.as_raw();
        let cutoff = z_nearest + self.config.near_plane_margin;

        let mut points = Vec::new();
        let mut colors = Vec::new();
        for (index, &z) in samples.iter().enumerate() {
            if !(z.abs() < cutoff) {
                continue;
            }
            let pixel = Vec2::new((index % depth_width) as f32, (index / depth_width) as f32);
            points.push(intrinsics.unproject(pixel, z));

            let offset = index * 4;
            colors.push([
                pixels[offset],
                pixels[offset + 1],
                pixels[offset + 2],
                pixels[offset + 3],
            ]);
        }

        info!(
            "Reconstructed {} of {} points (z_nearest={:.3})",
            points.len(),
            samples.len(),
            z_nearest
        );
        PointCloud::new(points, colors)
    }
}

fn resize_to_grid(color: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    if color.dimensions() == (width, height) {
        return color.clone();
    }
    imageops::resize(color, width, height, FilterType::Triangle)
}

/// Nearest valid depth in a sample set, ignoring NaN
pub fn nearest_depth(samples: &[f32]) -> Option<f32> {
    let nearest = samples.iter().copied().fold(f32::INFINITY, f32::min);
    nearest.is_finite().then_some(nearest)
}

/// Camera-space centroid of a cloud, handy for framing a view
pub fn centroid(points: &[Vec3]) -> Option<Vec3> {
    if points.is_empty() {
        return None;
    }
    Some(points.iter().copied().sum::<Vec3>() / points.len() as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use depthkit_capture::{DepthBuffer, DepthData, Intrinsics, PixelFormat, fourcc};
    use image::Rgba;

    fn calibration(reference_width: u32) -> CameraCalibration {
        CameraCalibration::new(Intrinsics::new(100.0, 100.0, 1.0, 0.0), reference_width, reference_width)
    }

    fn solid(width: u32, height: u32, color: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba(color))
    }

    #[test]
    fn test_near_plane_cut() {
        let unprojector = Unprojector::default();
        let samples = [1.0, 1.2, 5.0];
        let cloud = unprojector.reconstruct(&solid(3, 1, [9, 9, 9, 255]), &samples, 3, &calibration(3));

        assert_eq!(cloud.len(), 2);
        let zs: Vec<f32> = cloud.points.iter().map(|p| p.z).collect();
        assert_eq!(zs, vec![1.0, 1.2]);
    }

    #[test]
    fn test_retention_matches_cut_for_every_sample() {
        let unprojector = Unprojector::default();
        let samples: Vec<f32> = (0..40).map(|i| 0.5 + i as f32 * 0.05).collect();
        let cloud = unprojector.reconstruct(&solid(8, 5, [0, 0, 0, 255]), &samples, 8, &calibration(8));

        let min = samples.iter().copied().fold(f32::INFINITY, f32::min);
        let expected: Vec<f32> = samples.iter().copied().filter(|z| z.abs() < min + 1.0).collect();
        let kept: Vec<f32> = cloud.points.iter().map(|p| p.z).collect();
        assert_eq!(kept, expected);
    }

    #[test]
    fn test_back_projection_formula() {
        let unprojector = Unprojector::default();
        let calibration = CameraCalibration::new(Intrinsics::new(2.0, 4.0, 1.0, 0.5), 2, 2);
        let samples = [1.0, 1.0, 1.5, 1.5];
        let cloud = unprojector.reconstruct(&solid(2, 2, [1, 1, 1, 1]), &samples, 2, &calibration);

        assert_eq!(cloud.points[0], Vec3::new(-0.5, -0.125, 1.0));
        assert_eq!(cloud.points[1], Vec3::new(0.0, -0.125, 1.0));
        assert_eq!(cloud.points[2], Vec3::new(-0.75, 0.1875, 1.5));
        assert_eq!(cloud.points[3], Vec3::new(0.0, 0.1875, 1.5));
    }

    #[test]
    fn test_intrinsics_scale_with_depth_resolution() {
        let unprojector = Unprojector::default();
        let samples = vec![1.0; 16];
        let color = solid(8, 8, [0, 0, 0, 255]);

        let native = CameraCalibration::new(Intrinsics::new(50.0, 50.0, 2.0, 2.0), 4, 4);
        let doubled = CameraCalibration::new(Intrinsics::new(100.0, 100.0, 4.0, 4.0), 8, 8);

        let a = unprojector.reconstruct(&color, &samples, 4, &native);
        let b = unprojector.reconstruct(&color, &samples, 4, &doubled);
        assert_eq!(a.points, b.points);
    }

    #[test]
    fn test_colors_align_with_depth_grid() {
        let unprojector = Unprojector::default();
        // Left half red, right half blue, at twice the depth resolution.
        let color = RgbaImage::from_fn(4, 2, |x, _| {
            if x < 2 { Rgba([255, 0, 0, 255]) } else { Rgba([0, 0, 255, 255]) }
        });
        let cloud = unprojector.reconstruct(&color, &[1.0, 1.0], 2, &calibration(4));
        assert_eq!(cloud.len(), 2);
        assert!(cloud.colors[0][0] > cloud.colors[0][2]);
        assert!(cloud.colors[1][2] > cloud.colors[1][0]);
    }

    #[test]
    fn test_nan_samples_are_dropped() {
        let unprojector = Unprojector::default();
        let cloud = unprojector.reconstruct(&solid(3, 1, [0; 4]), &[f32::NAN, 1.0, 1.5], 3, &calibration(3));
        assert_eq!(cloud.len(), 2);
    }

    #[test]
    fn test_custom_margin() {
        let unprojector = Unprojector::new(ReconstructionConfig {
            near_plane_margin: 0.1,
        });
        let cloud = unprojector.reconstruct(&solid(3, 1, [0; 4]), &[1.0, 1.05, 1.2], 3, &calibration(3));
        assert_eq!(cloud.len(), 2);
    }

    #[test]
    fn test_empty_depth_is_empty_cloud() {
        let unprojector = Unprojector::default();
        let cloud = unprojector.reconstruct(&solid(1, 1, [0; 4]), &[], 0, &calibration(1));
        assert!(cloud.is_empty());
    }

    #[test]
    fn test_partial_row_is_ignored() {
        let unprojector = Unprojector::default();
        // A trailing partial row must not set the nearest depth.
        let cloud = unprojector.reconstruct(&solid(2, 1, [0; 4]), &[5.0, 5.2, 0.1], 2, &calibration(2));
        let zs: Vec<f32> = cloud.points.iter().map(|p| p.z).collect();
        assert_eq!(zs, vec![5.0, 5.2]);

        let short = unprojector.reconstruct(&solid(1, 1, [0; 4]), &[1.0, 1.0], 3, &calibration(3));
        assert!(short.is_empty());
    }

    #[test]
    fn test_still_without_calibration_is_skipped() {
        let depth = DepthData::new(DepthBuffer::from_f32(1, 1, PixelFormat::DepthFloat32, &[1.0]));
        let still = RgbdStill::new(solid(1, 1, [0; 4]), depth);
        assert!(matches!(
            Unprojector::default().reconstruct_still(&still),
            Err(ReconstructionError::MissingCalibration)
        ));
    }

    #[test]
    fn test_still_with_unknown_format_fails() {
        let depth = DepthData::new(DepthBuffer::new(1, 1, fourcc(b"BGRA"), vec![0; 4]))
            .with_calibration(calibration(1));
        let still = RgbdStill::new(solid(1, 1, [0; 4]), depth);
        assert!(matches!(
            Unprojector::default().reconstruct_still(&still),
            Err(ReconstructionError::Decode(DecodeError::UnsupportedFormat { .. }))
        ));
    }

    #[test]
    fn test_still_disparity_is_converted_to_depth() {
        let disparity = DepthBuffer::from_f32(2, 1, PixelFormat::DisparityFloat32, &[1.0, 0.25]);
        let depth = DepthData::new(disparity).with_calibration(calibration(2));
        let still = RgbdStill::new(solid(2, 1, [0; 4]), depth);

        let cloud = Unprojector::default().reconstruct_still(&still).unwrap();
        // Depths are 1.0 and 4.0; only the near one survives the cut.
        assert_eq!(cloud.len(), 1);
        assert_eq!(cloud.points[0].z, 1.0);
    }

    #[test]
    fn test_helpers() {
        assert_eq!(nearest_depth(&[f32::NAN, 3.0, 2.0]), Some(2.0));
        assert_eq!(nearest_depth(&[f32::NAN]), None);
        assert_eq!(
            centroid(&[Vec3::ZERO, Vec3::new(2.0, 4.0, 6.0)]),
            Some(Vec3::new(1.0, 2.0, 3.0))
        );
    }
}
