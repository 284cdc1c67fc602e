//! Depth data objects as delivered by a depth-capable camera.

use std::sync::Arc;

use tracing::debug;

use crate::buffer::DepthBuffer;
use crate::calibration::CameraCalibration;
use crate::decode::{DecodeError, decode};
use crate::filter::{fill_holes, is_hole};
use crate::format::PixelFormat;

/// A depth or disparity map plus the metadata that travels with it.
///
/// Cloning is cheap; the map itself is shared.
#[derive(Debug, Clone)]
pub struct DepthData {
    map: Arc<DepthBuffer>,
    calibration: Option<CameraCalibration>,
    filtered: bool,
}

impl DepthData {
    /// Wrap a depth map without calibration.
    pub fn new(map: DepthBuffer) -> Self {
        Self {
            map: Arc::new(map),
            calibration: None,
            filtered: false,
        }
    }

    /// Attach calibration data.
    pub fn with_calibration(mut self, calibration: CameraCalibration) -> Self {
        self.calibration = Some(calibration);
        self
    }

    /// The underlying depth or disparity map.
    pub fn depth_data_map(&self) -> &DepthBuffer {
        &self.map
    }

    pub fn calibration(&self) -> Option<&CameraCalibration> {
        self.calibration.as_ref()
    }

    /// Whether sensor holes were filled before delivery.
    pub fn is_filtered(&self) -> bool {
        self.filtered
    }

    pub fn dimensions(&self) -> (usize, usize) {
        self.map.dimensions()
    }

    /// The pixel encoding of the map, if it is one of the depth encodings.
    pub fn format(&self) -> Result<PixelFormat, DecodeError> {
        PixelFormat::from_fourcc(self.map.fourcc())
    }

    /// Decode the map into `f32` samples.
    pub fn samples(&self) -> Result<Vec<f32>, DecodeError> {
        decode(&self.map)
    }

    /// Disparity representation of this data.
    ///
    /// Returns a cheap clone when it already holds disparity, and an error
    /// when the map cannot be decoded.
    pub fn convert_to_disparity(&self) -> Result<DepthData, DecodeError> {
        self.convert(true)
    }

    /// Depth representation of this data; the inverse of
    /// [`convert_to_disparity`](Self::convert_to_disparity).
    pub fn convert_to_depth(&self) -> Result<DepthData, DecodeError> {
        self.convert(false)
    }

    /// Copy of this data with sensor holes filled.
    pub fn filled(&self) -> Result<DepthData, DecodeError> {
        let format = self.format()?;
        let mut samples = self.samples()?;
        let (width, height) = self.dimensions();
        let count = fill_holes(&mut samples, width);
        debug!("Filled {} depth holes", count);

        let target = if format.is_disparity() {
            PixelFormat::DisparityFloat32
        } else {
            PixelFormat::DepthFloat32
        };
        Ok(DepthData {
            map: Arc::new(DepthBuffer::from_f32(width, height, target, &samples)),
            calibration: self.calibration,
            filtered: true,
        })
    }

    fn convert(&self, to_disparity: bool) -> Result<DepthData, DecodeError> {
        let format = self.format()?;
        if format.is_disparity() == to_disparity {
            return Ok(self.clone());
        }

        let samples = self.samples()?;
        // Depth and disparity are reciprocal; invalid samples stay invalid.
        let converted: Vec<f32> = samples
            .into_iter()
            .map(|s| if is_hole(s) { f32::NAN } else { 1.0 / s })
            .collect();

        let target = if to_disparity {
            PixelFormat::DisparityFloat32
        } else {
            PixelFormat::DepthFloat32
        };
        let (width, height) = self.dimensions();
        Ok(DepthData {
            map: Arc::new(DepthBuffer::from_f32(width, height, target, &converted)),
            calibration: self.calibration,
            filtered: self.filtered,
        })
    }
}
