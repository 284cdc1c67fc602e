//! Point cloud reconstruction from depth maps

pub mod unprojector;

pub use unprojector::{
    DEFAULT_NEAR_PLANE_MARGIN, ReconstructionConfig, ReconstructionError, Unprojector, centroid, nearest_depth,
};
