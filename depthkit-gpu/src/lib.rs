//! Depthkit GPU - the render collaborator boundary
//!
//! Acquires a wgpu device at startup and keeps two upload surfaces fed:
//! an [`ImageSurface`] mirroring the live pipeline's latest processed image,
//! and a [`PointCloudBuffer`] holding the still viewer's point cloud.

mod context;
mod points;
mod surface;

pub use context::{GpuContext, GpuError};
pub use points::{POINT_TOPOLOGY, PointCloudBuffer, point_vertex_layout};
pub use surface::{IMAGE_FORMAT, ImageSurface, image_extent};

pub use wgpu;
