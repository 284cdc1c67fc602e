//! Scene graph holding the viewing camera and at most one point cloud

use std::collections::BTreeMap;
use std::f32::consts::PI;

use glam::{Quat, Vec3};
use tracing::debug;

use crate::scene::PointCloudGeometry;

/// Camera z offset; the camera sits just behind the origin looking down +z.
pub const CAMERA_Z: f32 = -0.1;
/// Near clipping plane of the viewing camera.
pub const CAMERA_Z_NEAR: f32 = 0.1;

/// Stable identifier of a node in a [`SceneGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

/// What a node renders
#[derive(Debug, Clone, PartialEq)]
pub enum NodeContent {
    Camera { z_near: f32 },
    PointCloud(PointCloudGeometry),
}

/// A positioned node
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub content: NodeContent,
    pub position: Vec3,
    pub rotation: Quat,
}

impl SceneNode {
    pub fn new(content: NodeContent) -> Self {
        Self {
            content,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn is_point_cloud(&self) -> bool {
        matches!(self.content, NodeContent::PointCloud(_))
    }
}

/// A flat scene graph rooted at an implicit origin
///
/// The graph exclusively owns its nodes. The point cloud slot is replaced,
/// never accumulated: attaching a new cloud always detaches the previous one.
#[derive(Debug)]
pub struct SceneGraph {
    nodes: BTreeMap<NodeId, SceneNode>,
    next_id: u64,
    camera: NodeId,
    point_cloud: Option<NodeId>,
}

impl SceneGraph {
    /// Create a scene with its viewing camera
    ///
    /// The camera is flipped about X so negative z lies in front of it.
    pub fn new() -> Self {
        let mut scene = Self {
            nodes: BTreeMap::new(),
            next_id: 0,
            camera: NodeId(0),
            point_cloud: None,
        };
        let camera = SceneNode::new(NodeContent::Camera {
            z_near: CAMERA_Z_NEAR,
        })
        .with_position(Vec3::new(0.0, 0.0, CAMERA_Z))
        .with_rotation(Quat::from_axis_angle(Vec3::X, PI));
        scene.camera = scene.insert(camera);
        scene
    }

    fn insert(&mut self, node: SceneNode) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, node);
        id
    }

    /// Attach a point cloud, detaching any previous one first
    pub fn replace_point_cloud(&mut self, geometry: PointCloudGeometry) -> NodeId {
        self.detach_point_cloud();
        let count = geometry.primitive_count();
        let id = self.insert(SceneNode::new(NodeContent::PointCloud(geometry)));
        self.point_cloud = Some(id);
        debug!("Attached point cloud node {:?} with {} points", id, count);
        id
    }

    /// Detach and return the current point cloud node
    pub fn detach_point_cloud(&mut self) -> Option<SceneNode> {
        let id = self.point_cloud.take()?;
        let node = self.nodes.remove(&id);
        debug!("Detached point cloud node {:?}", id);
        node
    }

    /// Geometry of the attached point cloud, if any
    pub fn point_cloud(&self) -> Option<&PointCloudGeometry> {
        let id = self.point_cloud?;
        match &self.nodes.get(&id)?.content {
            NodeContent::PointCloud(geometry) => Some(geometry),
            NodeContent::Camera { .. } => None,
        }
    }

    pub fn camera(&self) -> Option<&SceneNode> {
        self.nodes.get(&self.camera)
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    /// Number of point cloud nodes currently in the graph
    pub fn point_cloud_node_count(&self) -> usize {
        self.nodes.values().filter(|n| n.is_point_cloud()).count()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{PointCloud, PointCloudModel};

    fn geometry(n: usize) -> PointCloudGeometry {
        let cloud = PointCloud::new(vec![Vec3::ONE; n], vec![[255; 4]; n]);
        PointCloudModel::new(cloud).geometry().clone()
    }

    #[test]
    fn test_new_scene_has_camera_only() {
        let scene = SceneGraph::new();
        assert_eq!(scene.node_count(), 1);
        assert_eq!(scene.point_cloud_node_count(), 0);

        let camera = scene.camera().unwrap();
        assert_eq!(camera.position, Vec3::new(0.0, 0.0, CAMERA_Z));
        // Flipped about X: +y maps to -y.
        let up = camera.rotation * Vec3::Y;
        assert!((up - Vec3::NEG_Y).length() < 1e-6);
    }

    #[test]
    fn test_repeated_replacement_keeps_single_point_cloud() {
        let mut scene = SceneGraph::new();
        let first = scene.replace_point_cloud(geometry(3));
        let second = scene.replace_point_cloud(geometry(3));

        assert_ne!(first, second);
        assert_eq!(scene.point_cloud_node_count(), 1);
        assert_eq!(scene.node_count(), 2);
        assert!(scene.node(first).is_none());
        assert_eq!(scene.point_cloud().unwrap().primitive_count(), 3);
    }

    #[test]
    fn test_detach_point_cloud() {
        let mut scene = SceneGraph::new();
        assert!(scene.detach_point_cloud().is_none());

        scene.replace_point_cloud(geometry(2));
        let node = scene.detach_point_cloud().unwrap();
        assert!(node.is_point_cloud());
        assert!(scene.point_cloud().is_none());
        assert_eq!(scene.point_cloud_node_count(), 0);
    }
}
