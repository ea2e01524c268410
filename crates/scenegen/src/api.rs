//! Request and response shapes of the generation endpoint, and the presets
//! catalogue. Routing lives elsewhere; these types are what it serializes.

use std::time::Instant;

use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::compose;
use crate::error::Result;
use crate::preset::{PresetInfo, PresetKind};
use crate::table::{generation_timestamp, PointTable};
use crate::types::{Point, SceneBounds};

pub const DEFAULT_PRESET: &str = "traffic_scene";
pub const DEFAULT_NUM_POINTS: usize = 10_000;

fn default_preset() -> String {
    DEFAULT_PRESET.to_owned()
}

fn default_num_points() -> usize {
    DEFAULT_NUM_POINTS
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    #[serde(default = "default_preset")]
    pub preset: String,
    #[serde(default = "default_num_points")]
    pub num_points: usize,
    #[serde(default = "default_true")]
    pub include_labels: bool,
}

impl Default for GenerateRequest {
    fn default() -> Self {
        Self {
            preset: default_preset(),
            num_points: default_num_points(),
            include_labels: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    pub num_points: usize,
    /// Echo of the requested name, even when it fell back.
    pub preset: String,
    pub generation_time_ms: f64,
    pub bounds: SceneBounds,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub points: Vec<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    pub metadata: ResponseMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresetCatalogue {
    pub presets: Vec<PresetInfo>,
}

/// Compose a scene for `preset` and pack it with a generation timestamp
/// shared by every row.
pub fn generate_table<R: Rng + ?Sized>(
    preset: &str,
    num_points: usize,
    rng: &mut R,
) -> Result<PointTable> {
    let scene = compose::generate_named(preset, num_points, rng);
    PointTable::from_scene(&scene, Some(generation_timestamp()))
}

pub fn generate<R: Rng + ?Sized>(req: &GenerateRequest, rng: &mut R) -> Result<GenerateResponse> {
    let start = Instant::now();
    let table = generate_table(&req.preset, req.num_points, rng)?;
    let elapsed_ms = start.elapsed().as_secs_f64() * 1e3;

    debug!(
        "generated {} points for {:?} in {elapsed_ms:.2} ms",
        table.num_rows(),
        req.preset
    );

    let points: Vec<Point> = table.points().collect();
    let labels = req
        .include_labels
        .then(|| table.label_values().map(str::to_owned).collect());

    Ok(GenerateResponse {
        metadata: ResponseMetadata {
            num_points: table.num_rows(),
            preset: req.preset.clone(),
            generation_time_ms: (elapsed_ms * 100.0).round() / 100.0,
            bounds: SceneBounds::from_points(&points),
        },
        labels,
        points,
    })
}

pub fn presets() -> PresetCatalogue {
    PresetCatalogue {
        presets: PresetKind::NAMED.iter().map(|p| p.info()).collect(),
    }
}
