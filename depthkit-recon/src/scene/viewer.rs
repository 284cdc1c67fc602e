//! Still-image viewer switching between the color image and its point cloud

use tracing::{info, warn};

use crate::ingest::RgbdStill;
use crate::reconstruction::{ReconstructionError, Unprojector};
use crate::scene::{PointCloudModel, SceneGraph};

/// What the still viewer shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Image,
    PointCloud,
}

/// Drives the still-image flow: still → unprojection → model → scene graph
#[derive(Debug)]
pub struct StillViewer {
    unprojector: Unprojector,
    scene: SceneGraph,
    still: Option<RgbdStill>,
    model: Option<PointCloudModel>,
    mode: ViewMode,
}

impl StillViewer {
    pub fn new(unprojector: Unprojector) -> Self {
        Self {
            unprojector,
            scene: SceneGraph::new(),
            still: None,
            model: None,
            mode: ViewMode::default(),
        }
    }

    /// Load a new still and refresh the current view
    ///
    /// The previous still and its cloud are discarded.
    pub fn load_still(&mut self, still: RgbdStill) -> Result<(), ReconstructionError> {
        let (width, height) = still.color_dimensions();
        info!("Loaded {}x{} still", width, height);
        self.still = Some(still);
        self.update_view()
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) -> Result<(), ReconstructionError> {
        self.mode = mode;
        self.update_view()
    }

    /// Rebuild the scene for the current mode
    ///
    /// The point cloud node is always detached first. A still without
    /// calibration leaves the scene empty rather than failing.
    pub fn update_view(&mut self) -> Result<(), ReconstructionError> {
        self.scene.detach_point_cloud();
        self.model = None;
        if self.mode != ViewMode::PointCloud {
            return Ok(());
        }
        let Some(still) = &self.still else {
            return Ok(());
        };

        match self.unprojector.reconstruct_still(still) {
            Ok(cloud) => {
                let model = PointCloudModel::new(cloud);
                self.scene.replace_point_cloud(model.geometry().clone());
                self.model = Some(model);
                Ok(())
            }
            Err(ReconstructionError::MissingCalibration) => {
                warn!("Still has no calibration data, skipping reconstruction");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    /// The model behind the attached point cloud node
    pub fn model(&self) -> Option<&PointCloudModel> {
        self.model.as_ref()
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }
}

impl Default for StillViewer {
    fn default() -> Self {
        Self::new(Unprojector::default())
    }
}
