//! Annotation persistence and KITTI label export.
//!
//! Stored layout: one pretty-printed JSON document per project at
//! `<root>/<project_id>_annotations.json`. Saving stamps the document's
//! `metadata` block with the save time and totals.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::export::{atomic_write, is_safe_name};

pub const ANNOTATION_VERSION: &str = "1.0";
const FILE_SUFFIX: &str = "_annotations.json";

/// Free-form fields the UI attaches that this crate does not interpret.
pub type Extra = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationBox {
    #[serde(default)]
    pub label: String,
    pub center: [f32; 3],
    pub size: [f32; 3],
    #[serde(default)]
    pub rotation: f32,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segmentation {
    #[serde(default)]
    pub label: String,
    /// Point references as the UI sent them (indices or coordinates);
    /// only their count is interpreted.
    #[serde(default)]
    pub points: Vec<serde_json::Value>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<f64>,
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_boxes: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_points_segmented: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotations {
    #[serde(default)]
    pub boxes: Vec<AnnotationBox>,
    #[serde(default)]
    pub segmentations: Vec<Segmentation>,
    #[serde(default)]
    pub metadata: AnnotationMetadata,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Annotations {
    /// What a project with nothing saved yet looks like.
    pub fn empty() -> Self {
        Self {
            metadata: AnnotationMetadata {
                created_at: Some(now_secs()),
                version: ANNOTATION_VERSION.to_owned(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn total_points_segmented(&self) -> usize {
        self.segmentations.iter().map(|s| s.points.len()).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SaveStats {
    pub boxes: usize,
    pub segmented_points: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveReceipt {
    pub status: String,
    pub saved_at: f64,
    pub stats: SaveStats,
}

pub trait AnnotationStore {
    /// The stored document, or `None` if the project has never been saved.
    fn load_saved(&self, project_id: &str) -> Result<Option<Annotations>>;

    fn save(&self, project_id: &str, annotations: &Annotations) -> Result<SaveReceipt>;

    /// Like [`load_saved`](Self::load_saved), but an unsaved project yields
    /// [`Annotations::empty`].
    fn load(&self, project_id: &str) -> Result<Annotations> {
        Ok(self
            .load_saved(project_id)?
            .unwrap_or_else(Annotations::empty))
    }
}

/// Project ids become file names, so only `[A-Za-z0-9_-]` is accepted.
pub fn validate_project_id(id: &str) -> Result<()> {
    if is_safe_name(id) {
        Ok(())
    } else {
        Err(Error::InvalidProjectId(id.to_owned()))
    }
}

/// One JSON document per project inside `root`.
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    root: PathBuf,
}

impl JsonDirStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, project_id: &str) -> Result<PathBuf> {
        validate_project_id(project_id)?;
        Ok(self.root.join(format!("{project_id}{FILE_SUFFIX}")))
    }
}

impl AnnotationStore for JsonDirStore {
    fn load_saved(&self, project_id: &str) -> Result<Option<Annotations>> {
        let path = self.path_for(project_id)?;

        let bytes = match fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("no annotations stored for {project_id:?}");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| Error::MalformedAnnotations {
                project: project_id.to_owned(),
                source,
            })
    }

    fn save(&self, project_id: &str, annotations: &Annotations) -> Result<SaveReceipt> {
        let path = self.path_for(project_id)?;
        fs::create_dir_all(&self.root)?;

        let saved_at = now_secs();
        let stats = SaveStats {
            boxes: annotations.boxes.len(),
            segmented_points: annotations.total_points_segmented(),
        };

        let mut doc = annotations.clone();
        doc.metadata = AnnotationMetadata {
            created_at: None,
            saved_at: Some(saved_at),
            version: ANNOTATION_VERSION.to_owned(),
            total_boxes: Some(stats.boxes),
            total_points_segmented: Some(stats.segmented_points),
        };

        atomic_write(&path, |tmp| {
            let mut w = BufWriter::new(tmp);
            serde_json::to_writer_pretty(&mut w, &doc)?;
            w.flush()?;
            Ok(())
        })?;

        info!(
            "saved {} boxes, {} segmented points for {project_id:?}",
            stats.boxes, stats.segmented_points
        );

        Ok(SaveReceipt {
            status: "saved".to_owned(),
            saved_at,
            stats,
        })
    }
}

/// One KITTI label line per box: truncation, occlusion, alpha and the 2D box
/// are zeroed, followed by size, center and yaw.
pub fn to_kitti(annotations: &Annotations) -> String {
    annotations
        .boxes
        .iter()
        .map(|b| {
            let [l, w, h] = b.size;
            let [x, y, z] = b.center;
            format!(
                "{} 0 0 0 0 0 0 0 {l} {w} {h} {x} {y} {z} {}",
                b.label, b.rotation
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KittiExport {
    pub format: String,
    pub content: String,
    pub filename: String,
}

/// KITTI export of a saved project, or `None` if nothing was ever saved.
pub fn export_kitti<S: AnnotationStore + ?Sized>(
    store: &S,
    project_id: &str,
) -> Result<Option<KittiExport>> {
    Ok(store.load_saved(project_id)?.map(|a| KittiExport {
        format: "kitti".to_owned(),
        content: to_kitti(&a),
        filename: format!("{project_id}.txt"),
    }))
}

fn now_secs() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1e6
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(label: &str, center: [f32; 3], size: [f32; 3], rotation: f32) -> AnnotationBox {
        AnnotationBox {
            label: label.into(),
            center,
            size,
            rotation,
            extra: Extra::new(),
        }
    }

    #[test]
    fn kitti_line_layout() {
        let a = Annotations {
            boxes: vec![
                bbox("car", [10.0, -2.5, 0.7], [4.5, 1.8, 1.4], 0.25),
                bbox("traffic_light", [5.0, 5.0, 4.0], [0.3, 0.2, 0.4], 0.0),
            ],
            ..Default::default()
        };

        let text = to_kitti(&a);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "car 0 0 0 0 0 0 0 4.5 1.8 1.4 10 -2.5 0.7 0.25");
        assert_eq!(lines[1], "traffic_light 0 0 0 0 0 0 0 0.3 0.2 0.4 5 5 4 0");
        assert!(!text.ends_with('\n'));
        assert_eq!(to_kitti(&Annotations::default()), "");
    }

    #[test]
    fn project_ids_are_restricted() {
        assert!(validate_project_id("demo_01-a").is_ok());
        for bad in ["", "../etc", "a/b", "a.b", "a b"] {
            assert!(matches!(
                validate_project_id(bad),
                Err(Error::InvalidProjectId(_))
            ));
        }
        assert!(validate_project_id(&"x".repeat(129)).is_err());
    }

    #[test]
    fn missing_box_rotation_defaults_to_zero() {
        let b: AnnotationBox = serde_json::from_str(
            r##"{"label":"bench","center":[1,2,3],"size":[1.6,0.4,0.4],"color":"#fff"}"##,
        )
        .unwrap();
        assert_eq!(b.rotation, 0.0);
        assert_eq!(b.extra["color"], "#fff");
    }

    #[test]
    fn loose_documents_deserialize() {
        let a: Annotations = serde_json::from_str(
            r#"{"boxes":[{"center":[0,0,0],"size":[1,1,1],"id":"b1"}],
                "segmentations":[{"points":[[1.0,2.0,3.0],[4.0,5.0,6.0]]}],
                "annotator":"ana"}"#,
        )
        .unwrap();

        assert_eq!(a.boxes[0].label, "");
        assert_eq!(a.boxes[0].extra["id"], "b1");
        assert_eq!(a.total_points_segmented(), 2);
        assert_eq!(a.extra["annotator"], "ana");
    }
}
