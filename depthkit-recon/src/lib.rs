//! Depthkit Reconstruction Crate
//!
//! This crate turns single RGBD stills into colored point clouds and keeps
//! them in a scene ready for rendering.
//!
//! ## Modules
//!
//! - [`ingest`]: RGBD still ingestion from captured frame pairs
//! - [`reconstruction`]: Unprojection through camera intrinsics with a near-plane cut
//! - [`scene`]: Point clouds, renderable geometry, scene graph and the still viewer

pub mod ingest;
pub mod reconstruction;
pub mod scene;

pub use ingest::RgbdStill;
pub use reconstruction::{ReconstructionConfig, ReconstructionError, Unprojector};
pub use scene::{PointCloud, PointCloudModel, SceneGraph, StillViewer, ViewMode};
