//! Scene representation for reconstructed stills
//!
//! Point clouds, their renderable geometry, and the scene graph the still
//! viewer attaches them to.

pub mod model;
pub mod point_cloud;
pub mod scene_graph;
pub mod viewer;

pub use model::{PointCloudGeometry, PointCloudModel, PointVertex};
pub use point_cloud::PointCloud;
pub use scene_graph::{NodeContent, NodeId, SceneGraph, SceneNode};
pub use viewer::{StillViewer, ViewMode};
