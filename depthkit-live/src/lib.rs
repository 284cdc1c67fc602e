//! Depthkit Live - realtime depth stream processing
//!
//! Turns a stream of [`FramePair`](depthkit_capture::FramePair)s into
//! display-ready grayscale images and a proximity alert:
//!
//! - [`LiveToggles`]: user toggles, snapshotted once per frame as a [`FrameConfig`]
//! - [`render_depth`]: depth/disparity selection, resize/rotate and optional equalization
//! - [`mean_intensity`]: histogram-weighted mean over a region of interest
//! - [`ThresholdAlert`]: fixed-window rolling average with a strict threshold
//! - [`LatestImage`]: single-slot, last-value-wins handoff to the renderer
//! - [`RealtimeDepthPipeline`]: the serial processing worker tying it together
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use depthkit_live::{LogAlertSink, PipelineConfig, RealtimeDepthPipeline};
//!
//! let pipeline = RealtimeDepthPipeline::new(PipelineConfig::default(), Arc::new(LogAlertSink))?;
//! pipeline.on_frame(frame);
//! if let Some(published) = pipeline.latest_image().latest() {
//!     // Draw published.image...
//! }
//! ```

mod accumulator;
mod alert;
mod config;
mod equalize;
mod pipeline;
mod roi;
mod slot;
mod toggles;
mod transform;

pub use accumulator::{RollingAverage, ThresholdAlert};
pub use alert::{AlertSink, CountingAlertSink, LogAlertSink};
pub use config::{ConfigError, PipelineConfig, Roi, Rotation, Size};
pub use equalize::{equalize, histogram};
pub use pipeline::{
    FrameError, FrameOutcome, FrameProcessor, PipelineStats, RealtimeDepthPipeline, StatsSnapshot, render_depth,
};
pub use roi::mean_intensity;
pub use slot::{LatestImage, PublishedImage};
pub use toggles::{FrameConfig, LiveToggles};
pub use transform::{DrawableSize, fit_to_target, to_grayscale};
