//! Reconstructed point clouds

use glam::Vec3;

/// Index-aligned camera-space points and their RGBA colors
///
/// Replaced wholesale on every reconstruction; never updated incrementally.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    pub points: Vec<Vec3>,
    pub colors: Vec<[u8; 4]>,
}

impl PointCloud {
    pub fn new(points: Vec<Vec3>, colors: Vec<[u8; 4]>) -> Self {
        debug_assert_eq!(points.len(), colors.len());
        Self { points, colors }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterate over `(point, color)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (Vec3, [u8; 4])> + '_ {
        self.points.iter().copied().zip(self.colors.iter().copied())
    }

    /// Axis-aligned bounds, or `None` for an empty cloud
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.points.first()?;
        Some(
            self.points
                .iter()
                .fold((first, first), |(min, max), p| (min.min(*p), max.max(*p))),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_cloud() {
        let cloud = PointCloud::default();
        assert!(cloud.is_empty());
        assert!(cloud.bounds().is_none());
    }

    #[test]
    fn test_bounds_and_iteration() {
        let cloud = PointCloud::new(
            vec![Vec3::new(1.0, -2.0, 3.0), Vec3::new(-1.0, 4.0, 0.5)],
            vec![[1, 2, 3, 4], [5, 6, 7, 8]],
        );
        let (min, max) = cloud.bounds().unwrap();
        assert_eq!(min, Vec3::new(-1.0, -2.0, 0.5));
        assert_eq!(max, Vec3::new(1.0, 4.0, 3.0));

        let colors: Vec<[u8; 4]> = cloud.iter().map(|(_, c)| c).collect();
        assert_eq!(colors, vec![[1, 2, 3, 4], [5, 6, 7, 8]]);
    }
}
