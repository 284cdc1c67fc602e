//! Vertex buffer for reconstructed point clouds.

use depthkit_recon::scene::{PointCloudGeometry, PointVertex};
use wgpu::util::DeviceExt;

const ATTRIBUTES: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4];

/// Vertex layout matching [`PointVertex`].
pub fn point_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<PointVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &ATTRIBUTES,
    }
}

/// Each vertex is drawn as its own point; there is no index buffer.
pub const POINT_TOPOLOGY: wgpu::PrimitiveTopology = wgpu::PrimitiveTopology::PointList;

/// GPU copy of a point cloud's geometry.
pub struct PointCloudBuffer {
    pub buffer: wgpu::Buffer,
    pub vertex_count: u32,
}

impl PointCloudBuffer {
    /// Upload geometry. Empty geometry uploads nothing.
    pub fn upload(device: &wgpu::Device, geometry: &PointCloudGeometry) -> Option<Self> {
        if geometry.is_empty() {
            return None;
        }
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Point Cloud Vertex Buffer"),
            contents: geometry.vertex_bytes(),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Some(Self {
            buffer,
            vertex_count: geometry.primitive_count() as u32,
        })
    }
}
