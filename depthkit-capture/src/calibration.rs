//! Camera intrinsics and their reference dimensions.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Pinhole intrinsics in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Intrinsics {
    pub fx: f32,
    pub fy: f32,
    pub cx: f32,
    pub cy: f32,
}

impl Intrinsics {
    pub fn new(fx: f32, fy: f32, cx: f32, cy: f32) -> Self {
        Self { fx, fy, cx, cy }
    }

    /// Divide every parameter by `ratio` (an isotropic resize).
    pub fn scaled_down(self, ratio: f32) -> Self {
        Self {
            fx: self.fx / ratio,
            fy: self.fy / ratio,
            cx: self.cx / ratio,
            cy: self.cy / ratio,
        }
    }

    /// Back-project pixel `(u, v)` at depth `z` into camera space.
    #[inline]
    pub fn unproject(&self, pixel: Vec2, z: f32) -> Vec3 {
        Vec3::new(
            (pixel.x - self.cx) * z / self.fx,
            (pixel.y - self.cy) * z / self.fy,
            z,
        )
    }
}

/// Calibration delivered alongside a depth map.
///
/// The intrinsics are expressed against `reference_width` × `reference_height`,
/// which is usually the full color sensor resolution rather than the depth map's.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraCalibration {
    pub intrinsics: Intrinsics,
    pub reference_width: u32,
    pub reference_height: u32,
}

impl CameraCalibration {
    pub fn new(intrinsics: Intrinsics, reference_width: u32, reference_height: u32) -> Self {
        Self {
            intrinsics,
            reference_width,
            reference_height,
        }
    }

    /// Intrinsics rescaled for a depth map `depth_width` pixels wide.
    ///
    /// All four parameters are divided by `reference_width / depth_width`.
    pub fn intrinsics_for_width(&self, depth_width: usize) -> Intrinsics {
        let ratio = self.reference_width as f32 / depth_width as f32;
        self.intrinsics.scaled_down(ratio)
    }
}
