//! Scene data model: points, placed objects, bounds and scene metadata.

use serde::{Deserialize, Serialize};

/// One sample `[x, y, z, intensity]`. Intensity is a synthetic reflectivity
/// proxy in `[0, 1]`.
pub type Point = [f32; 4];

/// Broad class of a placed object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    TrafficLight,
    Vehicle,
    Building,
    StreetFurniture,
    Infrastructure,
}

/// Vehicle body class. Fixes both the box dimensions and the point density.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleClass {
    Sedan,
    Suv,
    Truck,
    Compact,
}

impl VehicleClass {
    pub const ALL: [VehicleClass; 4] = [
        VehicleClass::Sedan,
        VehicleClass::Suv,
        VehicleClass::Truck,
        VehicleClass::Compact,
    ];

    /// Length, width, height in meters.
    #[inline]
    pub fn dimensions(self) -> [f32; 3] {
        match self {
            VehicleClass::Sedan => [4.5, 1.8, 1.4],
            VehicleClass::Suv => [4.8, 2.0, 1.8],
            VehicleClass::Truck => [6.5, 2.4, 2.5],
            VehicleClass::Compact => [3.8, 1.6, 1.2],
        }
    }

    /// Points sampled per vehicle of this class.
    #[inline]
    pub fn point_density(self) -> usize {
        match self {
            VehicleClass::Sedan => 250,
            VehicleClass::Suv => 300,
            VehicleClass::Truck => 400,
            VehicleClass::Compact => 200,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FurnitureKind {
    LampPost,
    Bench,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfrastructureKind {
    LightPole,
}

/// Box centered on `center`, axis-aligned in the object's local frame and
/// rotated by `rotation` (yaw, radians) in the world frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub center: [f32; 3],
    pub size: [f32; 3],
    pub rotation: f32,
}

/// One placed entity. Created once during composition and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    #[serde(rename = "type")]
    pub kind: ObjectKind,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_type: Option<VehicleClass>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub furniture_type: Option<FurnitureKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infrastructure_type: Option<InfrastructureKind>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub parked: bool,
    pub position: [f32; 3],
    pub rotation: f32,
    pub size: [f32; 3],
    pub bounding_box: BoundingBox,
    pub num_points: usize,
}

/// Axis-aligned extents of every point in a scene.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SceneBounds {
    pub x_min: f32,
    pub x_max: f32,
    pub y_min: f32,
    pub y_max: f32,
    pub z_min: f32,
    pub z_max: f32,
}

impl SceneBounds {
    /// Tight bounds over `points`. An empty slice yields all-zero bounds.
    pub fn from_points(points: &[Point]) -> Self {
        let Some(first) = points.first() else {
            return Self::default();
        };

        let mut b = Self {
            x_min: first[0],
            x_max: first[0],
            y_min: first[1],
            y_max: first[1],
            z_min: first[2],
            z_max: first[2],
        };

        for p in &points[1..] {
            b.x_min = b.x_min.min(p[0]);
            b.x_max = b.x_max.max(p[0]);
            b.y_min = b.y_min.min(p[1]);
            b.y_max = b.y_max.max(p[1]);
            b.z_min = b.z_min.min(p[2]);
            b.z_max = b.z_max.max(p[2]);
        }

        b
    }

    /// Inclusive containment test on the three spatial axes.
    #[inline]
    pub fn contains(&self, p: &Point) -> bool {
        (self.x_min..=self.x_max).contains(&p[0])
            && (self.y_min..=self.y_max).contains(&p[1])
            && (self.z_min..=self.z_max).contains(&p[2])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneMetadata {
    pub total_points: usize,
    pub num_objects: usize,
    pub scene_bounds: SceneBounds,
}

/// A fully composed scene. `points[i]` carries label `labels[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub scene_type: String,
    pub points: Vec<Point>,
    pub labels: Vec<String>,
    pub scene_objects: Vec<SceneObject>,
    pub metadata: SceneMetadata,
}

impl Scene {
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points carrying `label`, in row order.
    pub fn points_labeled<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a Point> + 'a {
        self.points
            .iter()
            .zip(self.labels.iter())
            .filter(move |(_, l)| l.as_str() == label)
            .map(|(p, _)| p)
    }

    pub fn object(&self, id: &str) -> Option<&SceneObject> {
        self.scene_objects.iter().find(|o| o.id == id)
    }
}
