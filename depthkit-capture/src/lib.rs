//! Depthkit Capture - depth buffers and synchronized RGBD capture
//!
//! This crate provides the sensor-facing half of depthkit:
//!
//! - [`DepthBuffer`]: raw depth/disparity planes with scoped base-address locking
//! - [`decode`]: exact conversion of the four depth encodings to `f32` samples
//! - [`DepthData`]: a depth map with calibration, depth ↔ disparity conversion
//!   and hole filling
//! - [`CaptureSource`]: the capture collaborator interface delivering
//!   [`FramePair`]s, with a deterministic [`SyntheticDepthCamera`]
//!
//! ## Example
//!
//! ```ignore
//! use depthkit_capture::{CaptureSource, SyntheticDepthCamera};
//!
//! let mut camera = SyntheticDepthCamera::new();
//! while let Some(frame) = camera.next_frame()? {
//!     let samples = frame.depth.map(|d| d.samples()).transpose()?;
//!     // Process samples...
//! }
//! ```

mod buffer;
mod calibration;
mod decode;
mod depth_data;
mod filter;
mod format;
mod source;
mod synthetic;

pub use buffer::{BaseAddressGuard, DepthBuffer};
pub use calibration::{CameraCalibration, Intrinsics};
pub use decode::{DecodeError, decode, f16_to_f32, f32_to_f16};
pub use depth_data::DepthData;
pub use filter::{fill_holes, is_hole};
pub use format::{PixelFormat, fourcc, fourcc_to_string};
pub use source::{CameraPosition, CaptureError, CaptureSource, FaceObservation, FramePair};
pub use synthetic::SyntheticDepthCamera;
