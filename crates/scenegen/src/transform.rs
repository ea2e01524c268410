use crate::types::{BoundingBox, Point};

/// Yaw rotation about `+z` followed by a translation. Scenes are ground
/// planar, so pitch and roll are not modeled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidTransform {
    /// Radians, counter-clockwise seen from above.
    pub yaw: f32,
    pub translation: [f32; 3],
}

impl RigidTransform {
    pub const IDENTITY: RigidTransform = RigidTransform {
        yaw: 0.0,
        translation: [0.0; 3],
    };

    #[inline]
    pub fn new(yaw: f32, translation: [f32; 3]) -> Self {
        Self { yaw, translation }
    }

    /// Map one local position into the world frame.
    #[inline]
    pub fn apply_xyz(&self, [x, y, z]: [f32; 3]) -> [f32; 3] {
        let (s, c) = self.yaw.sin_cos();
        let [tx, ty, tz] = self.translation;
        [x * c - y * s + tx, x * s + y * c + ty, z + tz]
    }

    /// Map local points into the world frame; intensity passes through.
    pub fn apply(&self, local: &[Point]) -> Vec<Point> {
        let (s, c) = self.yaw.sin_cos();
        let [tx, ty, tz] = self.translation;

        local
            .iter()
            .map(|&[x, y, z, i]| [x * c - y * s + tx, x * s + y * c + ty, z + tz, i])
            .collect()
    }

    /// Oriented box for an object whose geometric center sits at
    /// `local_center` in its own frame and whose extents are `size`.
    ///
    /// Derived from the known dimensions rather than the sampled points,
    /// which may under- or overshoot the true extents.
    #[inline]
    pub fn bounding_box(&self, local_center: [f32; 3], size: [f32; 3]) -> BoundingBox {
        BoundingBox {
            center: self.apply_xyz(local_center),
            size,
            rotation: self.yaw,
        }
    }
}
