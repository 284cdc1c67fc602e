//! Renderable point cloud geometry

use bytemuck::{Pod, Zeroable};

use crate::scene::PointCloud;

/// One point primitive as laid out in a vertex buffer
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct PointVertex {
    /// Camera-space position.
    pub position: [f32; 3],
    /// RGBA color, normalized to 0-1.
    pub color: [f32; 4],
}

impl PointVertex {
    pub fn new(position: glam::Vec3, color: [u8; 4]) -> Self {
        Self {
            position: position.to_array(),
            color: color.map(|c| c as f32 / 255.0),
        }
    }
}

/// Vertex-only geometry where every vertex is its own point primitive
///
/// There is no index buffer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloudGeometry {
    vertices: Vec<PointVertex>,
}

impl PointCloudGeometry {
    pub fn vertices(&self) -> &[PointVertex] {
        &self.vertices
    }

    /// Vertex data ready for upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn primitive_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// A reconstructed cloud together with its renderable geometry
#[derive(Debug, Clone)]
pub struct PointCloudModel {
    cloud: PointCloud,
    geometry: PointCloudGeometry,
}

impl PointCloudModel {
    /// Take ownership of a cloud and build its geometry
    pub fn new(cloud: PointCloud) -> Self {
        let vertices = cloud
            .iter()
            .map(|(position, color)| PointVertex::new(position, color))
            .collect();
        Self {
            cloud,
            geometry: PointCloudGeometry { vertices },
        }
    }

    pub fn cloud(&self) -> &PointCloud {
        &self.cloud
    }

    pub fn geometry(&self) -> &PointCloudGeometry {
        &self.geometry
    }
}
