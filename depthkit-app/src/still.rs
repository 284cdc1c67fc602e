//! Still capture: one RGBD frame through the viewer.

use std::error::Error;

use depthkit_capture::{CameraPosition, CaptureSource, PixelFormat, SyntheticDepthCamera};
use depthkit_gpu::{GpuContext, PointCloudBuffer};
use depthkit_recon::reconstruction::centroid;
use depthkit_recon::{ReconstructionConfig, RgbdStill, StillViewer, Unprojector, ViewMode};
use tracing::{info, warn};

/// Options for a still run.
pub struct StillOptions {
    pub view: ViewMode,
    pub camera: CameraPosition,
    /// Capture time on the synthetic scene, in seconds.
    pub time: f64,
    /// Deliver disparity instead of depth.
    pub disparity: bool,
    pub headless: bool,
}

pub fn run(options: StillOptions, reconstruction: ReconstructionConfig) -> Result<(), Box<dyn Error>> {
    let format = if options.disparity {
        PixelFormat::DisparityFloat16
    } else {
        PixelFormat::DepthFloat16
    };
    let mut camera = SyntheticDepthCamera::new().with_format(format);
    camera.change_camera(options.camera)?;

    let gpu = if options.headless {
        None
    } else {
        Some(GpuContext::acquire()?)
    };

    let still = RgbdStill::from_frame(camera.capture_still(options.time)).ok_or("Captured still has no depth data")?;
    let mut viewer = StillViewer::new(Unprojector::new(reconstruction));
    viewer.set_view_mode(options.view)?;
    viewer.load_still(still)?;

    match viewer.model() {
        Some(model) => {
            let cloud = model.cloud();
            info!("Point cloud: {} points", cloud.len());
            if let (Some((min, max)), Some(center)) = (cloud.bounds(), centroid(&cloud.points)) {
                info!("Bounds {} .. {}, centroid {}", min, max, center);
            }
        }
        None if options.view == ViewMode::PointCloud => warn!("No point cloud was produced"),
        None => info!("Showing color image"),
    }

    if let (Some(gpu), Some(geometry)) = (&gpu, viewer.scene().point_cloud()) {
        if let Some(buffer) = PointCloudBuffer::upload(&gpu.device, geometry) {
            info!("Uploaded {} vertices", buffer.vertex_count);
        }
    }
    Ok(())
}
