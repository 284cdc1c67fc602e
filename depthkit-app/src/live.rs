//! Live run: capture thread → pipeline worker → render thread.

use std::error::Error;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use depthkit_capture::{CameraPosition, CaptureSource, SyntheticDepthCamera};
use depthkit_gpu::{GpuContext, ImageSurface};
use depthkit_live::{LatestImage, LogAlertSink, PipelineConfig, RealtimeDepthPipeline};
use tracing::{debug, info, warn};

const RENDER_INTERVAL: Duration = Duration::from_millis(16);

/// Options for a live run.
pub struct LiveOptions {
    /// Number of frames to capture; `None` runs until the source ends.
    pub frames: Option<u64>,
    pub fps: f32,
    pub camera: CameraPosition,
    /// Deliver frames as fast as possible instead of at `fps`.
    pub unpaced: bool,
    pub headless: bool,
}

pub fn run(options: LiveOptions, config: PipelineConfig) -> Result<(), Box<dyn Error>> {
    let gpu = if options.headless {
        None
    } else {
        Some(GpuContext::acquire()?)
    };

    let mut camera = SyntheticDepthCamera::new().with_frame_rate(options.fps);
    camera.change_camera(options.camera)?;

    let mut pipeline = RealtimeDepthPipeline::new(config, Arc::new(LogAlertSink))?;
    let rendering = AtomicBool::new(true);
    let latest = pipeline.latest_image().clone();

    thread::scope(|scope| -> Result<(), Box<dyn Error>> {
        let render = scope.spawn(|| render_loop(gpu.as_ref(), &latest, &rendering));

        let delivered = capture_loop(&mut camera, &pipeline, &options);
        // Frame handler is detached once the capture loop returns.
        camera.stop();
        rendering.store(false, Ordering::Release);

        let drawn = render.join().map_err(|_| "Render thread panicked")?;
        let delivered = delivered?;
        info!("Delivered {} frames, rendered {} images", delivered, drawn);
        Ok(())
    })?;

    pipeline.shutdown();
    Ok(())
}

fn capture_loop(
    camera: &mut SyntheticDepthCamera,
    pipeline: &RealtimeDepthPipeline,
    options: &LiveOptions,
) -> Result<u64, Box<dyn Error>> {
    let interval = Duration::from_secs_f32(1.0 / options.fps.max(1.0));
    let mut delivered = 0;

    while options.frames.is_none_or(|limit| delivered < limit) {
        let toggles = pipeline.toggles().snapshot();
        camera.set_depth_filter_enabled(toggles.filter_enabled);

        let Some(frame) = camera.next_frame()? else {
            break;
        };
        pipeline.on_frame(frame);
        delivered += 1;

        if !options.unpaced {
            thread::sleep(interval);
        }
    }
    Ok(delivered)
}

fn render_loop(gpu: Option<&GpuContext>, latest: &LatestImage, rendering: &AtomicBool) -> u64 {
    let mut surface = ImageSurface::new();
    let mut seen = 0;
    let mut drawn = 0;

    while rendering.load(Ordering::Acquire) {
        let generation = match gpu {
            Some(gpu) => surface.refresh(gpu, latest),
            None => latest.newer_than(seen).map(|image| image.generation),
        };
        if let Some(generation) = generation {
            if generation > seen + 1 && seen != 0 {
                debug!("Render skipped {} images", generation - seen - 1);
            }
            seen = generation;
            drawn += 1;
        }
        thread::sleep(RENDER_INTERVAL);
    }

    if drawn == 0 {
        warn!("No processed images reached the renderer");
    }
    drawn
}
