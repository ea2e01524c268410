//! Procedural generator for labeled 3D point-cloud scenes.
//!
//! A preset and a point budget go in; a [`Scene`] comes out: points
//! `[x, y, z, intensity]`, one label per point, the placed objects with
//! their bounding boxes, and scene metadata. Scenes can be packed into an
//! Arrow [`PointTable`] and written as Parquet, ASCII PLY and JSON.
//!
//! Coordinates are meters, z up. Every object is sampled in its local frame
//! and placed by a yaw rotation about z followed by a translation.
//!
//! Label values:
//! - object points carry the id of their object (`car_north_1`, `building_east`,
//!   `parked_car_r2_s4`, ...);
//! - surface fill points carry `road_surface`, `parking_surface` or `ground`.
//!
//! Generation is infallible and deterministic for a given RNG state; only
//! table building, export and annotation storage return [`Error`].

pub mod annotations;
pub mod api;
pub mod cache;
pub mod camera;
pub mod compose;
pub mod error;
pub mod export;
pub mod preset;
pub mod sampler;
pub mod table;
pub mod transform;
pub mod types;

pub use crate::cache::SceneCache;
pub use crate::compose::{generate, generate_named};
pub use crate::error::{Error, Result};
pub use crate::export::{export_scene, ExportFormat, SampleIndex};
pub use crate::preset::{PresetInfo, PresetKind};
pub use crate::table::PointTable;
pub use crate::types::{BoundingBox, ObjectKind, Point, Scene, SceneBounds, SceneObject};
