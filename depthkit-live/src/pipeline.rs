//! Realtime depth pipeline: toggle snapshot, serial processing, publish, alert.

use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use depthkit_capture::{DecodeError, DepthData, FramePair};
use image::{DynamicImage, GrayImage};
use thiserror::Error;
use tracing::{debug, info};

use crate::accumulator::ThresholdAlert;
use crate::alert::AlertSink;
use crate::config::{PipelineConfig, Roi, Rotation, Size};
use crate::equalize::equalize;
use crate::roi::mean_intensity;
use crate::slot::LatestImage;
use crate::toggles::{FrameConfig, LiveToggles};
use crate::transform::{DrawableSize, fit_to_target, to_grayscale};

/// Why a single frame was not processed. Never fatal to the pipeline.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("Frame has no depth data")]
    MissingDepth,

    #[error("Disparity conversion unavailable: {0}")]
    Conversion(DecodeError),

    #[error("Depth decoding failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("Cannot build a {width}x{height} image")]
    EmptyImage { width: usize, height: usize },

    #[error("ROI statistics unavailable")]
    RoiUnavailable,
}

/// Render one depth map into the display image for the given toggles.
pub fn render_depth(
    depth: &DepthData,
    config: FrameConfig,
    target: Size,
    rotation: Rotation,
) -> Result<GrayImage, FrameError> {
    if target.width == 0 || target.height == 0 {
        return Err(FrameError::EmptyImage {
            width: target.width as usize,
            height: target.height as usize,
        });
    }

    let representation = if config.use_disparity {
        depth.convert_to_disparity().map_err(FrameError::Conversion)?
    } else {
        depth.clone()
    };

    let samples = representation.samples()?;
    let (width, height) = representation.dimensions();
    let gray = to_grayscale(&samples, width, height).ok_or(FrameError::EmptyImage { width, height })?;
    let fitted = fit_to_target(&gray, target, rotation);

    Ok(if config.apply_equalization {
        equalize(&fitted)
    } else {
        fitted
    })
}

/// Result of processing one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameOutcome {
    /// Generation of the published image.
    pub generation: u64,
    pub roi_mean: f32,
    /// Window average, when this frame fired the alert.
    pub alert: Option<f32>,
}

/// Per-frame processing state: ROI, rotation and the rolling alert.
///
/// Owned by the processing worker; only ever touched by one thread.
#[derive(Debug)]
pub struct FrameProcessor {
    roi: Roi,
    rotation: Rotation,
    alert: ThresholdAlert,
}

impl FrameProcessor {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            roi: config.roi,
            rotation: config.rotation,
            alert: ThresholdAlert::new(config.window_size, config.alert_threshold),
        }
    }

    /// Process one frame and publish its image to `latest`.
    ///
    /// The image is published before statistics run; any error leaves the
    /// rolling average untouched.
    #[tracing::instrument(skip_all, fields(frame = frame.frame_number))]
    pub fn process(
        &mut self,
        frame: &FramePair,
        config: FrameConfig,
        target: Size,
        latest: &LatestImage,
    ) -> Result<FrameOutcome, FrameError> {
        let depth = frame.depth.as_ref().ok_or(FrameError::MissingDepth)?;
        let image = DynamicImage::ImageLuma8(render_depth(depth, config, target, self.rotation)?);

        let roi_mean = mean_intensity(&image, self.roi);
        let generation = latest.publish(image.into_luma8(), frame.timestamp);
        let roi_mean = roi_mean.ok_or(FrameError::RoiUnavailable)?;

        Ok(FrameOutcome {
            generation,
            roi_mean,
            alert: self.alert.observe(roi_mean),
        })
    }

    pub fn alert(&self) -> &ThresholdAlert {
        &self.alert
    }
}

/// Counters kept by a running pipeline.
#[derive(Debug, Default)]
pub struct PipelineStats {
    submitted: AtomicU64,
    skipped: AtomicU64,
    superseded: AtomicU64,
    processed: AtomicU64,
    dropped: AtomicU64,
    alerts: AtomicU64,
    in_flight: AtomicU64,
    peak_in_flight: AtomicU64,
}

/// Point-in-time copy of [`PipelineStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    /// Frames handed to `on_frame`.
    pub submitted: u64,
    /// Frames without depth, never queued.
    pub skipped: u64,
    /// Queued frames replaced by a newer one before processing started.
    pub superseded: u64,
    pub processed: u64,
    /// Frames that failed during processing.
    pub dropped: u64,
    pub alerts: u64,
    /// Most frames ever processed at the same time.
    pub peak_in_flight: u64,
}

impl PipelineStats {
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            submitted: self.submitted.load(Ordering::Acquire),
            skipped: self.skipped.load(Ordering::Acquire),
            superseded: self.superseded.load(Ordering::Acquire),
            processed: self.processed.load(Ordering::Acquire),
            dropped: self.dropped.load(Ordering::Acquire),
            alerts: self.alerts.load(Ordering::Acquire),
            peak_in_flight: self.peak_in_flight.load(Ordering::Acquire),
        }
    }

    fn enter(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::AcqRel) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::AcqRel);
    }

    fn leave(&self) {
        self.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

struct FrameJob {
    frame: FramePair,
    config: FrameConfig,
    target: Size,
}

#[derive(Default)]
struct Queue {
    pending: Option<FrameJob>,
    busy: bool,
    closed: bool,
}

#[derive(Default)]
struct Shared {
    queue: Mutex<Queue>,
    ready: Condvar,
    idle: Condvar,
    stats: PipelineStats,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Queue> {
        self.queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Live depth processing with a single serial worker.
///
/// Frames go through a one-slot pending cell: a frame submitted while an
/// earlier one is still waiting replaces it. At most one frame is processed
/// at a time, and each frame is processed with the toggles captured when it
/// was submitted.
pub struct RealtimeDepthPipeline {
    shared: Arc<Shared>,
    toggles: Arc<LiveToggles>,
    drawable: Arc<DrawableSize>,
    latest: Arc<LatestImage>,
    worker: Option<JoinHandle<()>>,
}

impl RealtimeDepthPipeline {
    /// Start the processing worker.
    pub fn new(config: PipelineConfig, sink: Arc<dyn AlertSink>) -> io::Result<Self> {
        let shared = Arc::new(Shared::default());
        let latest = Arc::new(LatestImage::new());
        let processor = FrameProcessor::new(&config);

        let worker = {
            let shared = shared.clone();
            let latest = latest.clone();
            thread::Builder::new()
                .name("depth-processing".into())
                .spawn(move || run_worker(&shared, processor, &latest, sink.as_ref()))?
        };

        info!(
            "Realtime pipeline started (window {}, threshold {:.1}, ROI {:?})",
            config.window_size, config.alert_threshold, config.roi
        );
        Ok(Self {
            shared,
            toggles: Arc::new(LiveToggles::new(config.toggles)),
            drawable: Arc::new(DrawableSize::new(config.drawable_size)),
            latest,
            worker: Some(worker),
        })
    }

    /// Frame delivery callback from the capture side.
    ///
    /// Takes the toggle snapshot synchronously, then hands the frame to the
    /// worker without waiting for it. Returns `false` when the frame was not
    /// queued.
    pub fn on_frame(&self, frame: FramePair) -> bool {
        let stats = &self.shared.stats;
        stats.submitted.fetch_add(1, Ordering::AcqRel);

        if frame.depth.is_none() {
            stats.skipped.fetch_add(1, Ordering::AcqRel);
            debug!("Skipping frame {} without depth", frame.frame_number);
            return false;
        }

        let job = FrameJob {
            config: self.toggles.snapshot(),
            target: self.drawable.get(),
            frame,
        };

        let mut queue = self.shared.lock();
        if queue.closed {
            stats.skipped.fetch_add(1, Ordering::AcqRel);
            return false;
        }
        if let Some(old) = queue.pending.replace(job) {
            stats.superseded.fetch_add(1, Ordering::AcqRel);
            debug!("Frame {} superseded", old.frame.frame_number);
        }
        drop(queue);
        self.shared.ready.notify_one();
        true
    }

    pub fn toggles(&self) -> &Arc<LiveToggles> {
        &self.toggles
    }

    pub fn drawable_size(&self) -> &Arc<DrawableSize> {
        &self.drawable
    }

    /// The render side's view of processed images.
    pub fn latest_image(&self) -> &Arc<LatestImage> {
        &self.latest
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.shared.stats.snapshot()
    }

    /// Block until nothing is pending or in progress.
    pub fn wait_idle(&self) {
        let mut queue = self.shared.lock();
        while queue.pending.is_some() || queue.busy {
            queue = self
                .shared
                .idle
                .wait(queue)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
    }

    /// Stop accepting frames, let the worker drain, and return final counters.
    pub fn shutdown(&mut self) -> StatsSnapshot {
        self.shared.lock().closed = true;
        self.shared.ready.notify_all();

        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!("Processing worker panicked");
            }
            let stats = self.stats();
            info!(
                "Pipeline stopped: {} submitted, {} processed, {} superseded, {} skipped, {} dropped, {} alerts",
                stats.submitted, stats.processed, stats.superseded, stats.skipped, stats.dropped, stats.alerts
            );
        }
        self.stats()
    }
}

impl Drop for RealtimeDepthPipeline {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_worker(shared: &Shared, mut processor: FrameProcessor, latest: &LatestImage, sink: &dyn AlertSink) {
    loop {
        let job = {
            let mut queue = shared.lock();
            loop {
                if let Some(job) = queue.pending.take() {
                    queue.busy = true;
                    break job;
                }
                if queue.closed {
                    return;
                }
                queue = shared
                    .ready
                    .wait(queue)
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
            }
        };

        let stats = &shared.stats;
        stats.enter();
        match processor.process(&job.frame, job.config, job.target, latest) {
            Ok(outcome) => {
                stats.processed.fetch_add(1, Ordering::AcqRel);
                if let Some(average) = outcome.alert {
                    stats.alerts.fetch_add(1, Ordering::AcqRel);
                    sink.play_cue(average);
                }
            }
            Err(err) => {
                stats.dropped.fetch_add(1, Ordering::AcqRel);
                debug!("Dropped frame {}: {}", job.frame.frame_number, err);
            }
        }
        stats.leave();

        shared.lock().busy = false;
        shared.idle.notify_all();
    }
}
