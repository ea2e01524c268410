//! Format exporters and the sample-set index.
//!
//! Each preset is written as `<stem>.parquet`, `<stem>.ply` and
//! `<stem>.json`; row `i` refers to the same physical point in all three.
//! A shared `metadata.json` lists every preset and its files.
//!
//! All files go through [`atomic_write`]: the bytes land in a temporary
//! sibling which is then renamed over the target, so readers never see a
//! truncated file.

pub mod json;
pub mod parquet;
pub mod ply;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::{Error, Result};
use crate::preset::PresetKind;
use crate::table::PointTable;
use crate::types::Scene;

pub use self::json::{from_json_str, read_json_file, to_json_string, write_json_file};
pub use self::parquet::{read_parquet_file, write_parquet_file};
pub use self::ply::{parse_ply, write_ply, write_ply_file};

pub const INDEX_FILE: &str = "metadata.json";
pub const INDEX_VERSION: &str = "1.0";
pub const GENERATOR_NAME: &str = "High-Performance Sample Generator";

const MAX_NAME_LEN: usize = 128;

/// Names that end up in file names: `[A-Za-z0-9_-]`, 1 to 128 bytes.
pub(crate) fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_NAME_LEN
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

pub fn validate_file_stem(stem: &str) -> Result<()> {
    if is_safe_name(stem) {
        Ok(())
    } else {
        Err(Error::InvalidFileStem(stem.to_owned()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Parquet,
    Ply,
    Json,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Parquet, ExportFormat::Ply, ExportFormat::Json];

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Parquet => "parquet",
            ExportFormat::Ply => "ply",
            ExportFormat::Json => "json",
        }
    }

    pub fn usage_note(self) -> &'static str {
        match self {
            ExportFormat::Parquet => "Fastest loading, use for production",
            ExportFormat::Ply => "Standard format, good for visualization tools",
            ExportFormat::Json => "Human readable, includes full metadata",
        }
    }

    pub fn file_name(self, stem: &str) -> String {
        format!("{stem}.{}", self.extension())
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Write into a temporary file next to `path`, then rename it into place.
pub fn atomic_write<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut NamedTempFile) -> Result<()>,
{
    let dir = match path.parent() {
        Some(d) if !d.as_os_str().is_empty() => d,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    write(&mut tmp)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;

    Ok(())
}

/// File names of one preset inside the output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetFiles {
    pub parquet: String,
    pub ply: String,
    pub json: String,
}

impl PresetFiles {
    pub fn for_stem(stem: &str) -> Self {
        Self {
            parquet: ExportFormat::Parquet.file_name(stem),
            ply: ExportFormat::Ply.file_name(stem),
            json: ExportFormat::Json.file_name(stem),
        }
    }

    pub fn get(&self, format: ExportFormat) -> &str {
        match format {
            ExportFormat::Parquet => &self.parquet,
            ExportFormat::Ply => &self.ply,
            ExportFormat::Json => &self.json,
        }
    }
}

/// Write `scene` in every format under `dir`. Every format is attempted even
/// if an earlier one fails; the first failure is returned.
///
/// `stem` must be a plain name so every file lands directly inside `dir`.
pub fn export_scene(dir: &Path, stem: &str, scene: &Scene) -> Result<PresetFiles> {
    validate_file_stem(stem)?;
    fs::create_dir_all(dir)?;

    let files = PresetFiles::for_stem(stem);
    let table = PointTable::from_scene(scene, None)?;
    let mut first_err = None;

    for format in ExportFormat::ALL {
        let path = dir.join(files.get(format));
        let res = match format {
            ExportFormat::Parquet => write_parquet_file(&path, &table),
            ExportFormat::Ply => write_ply_file(&path, &table),
            ExportFormat::Json => write_json_file(&path, scene),
        };

        match res {
            Ok(()) => info!("wrote {} ({} pts)", path.display(), table.num_rows()),
            Err(e) => {
                warn!("failed to write {}: {e}", path.display());
                first_err.get_or_insert(e);
            }
        }
    }

    match first_err {
        Some(e) => Err(e),
        None => Ok(files),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub id: String,
    pub name: String,
    pub description: String,
    pub files: PresetFiles,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageNotes {
    pub parquet: String,
    pub ply: String,
    pub json: String,
}

/// Contents of `metadata.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleIndex {
    pub version: String,
    pub generator: String,
    pub formats: Vec<ExportFormat>,
    pub presets: Vec<IndexEntry>,
    pub usage: UsageNotes,
}

impl SampleIndex {
    pub fn for_presets(presets: &[PresetKind]) -> Self {
        let presets = presets
            .iter()
            .map(|p| {
                let info = p.info();
                IndexEntry {
                    id: info.id.to_owned(),
                    name: info.name.to_owned(),
                    description: info.description.to_owned(),
                    files: PresetFiles::for_stem(info.id),
                }
            })
            .collect();

        Self {
            version: INDEX_VERSION.to_owned(),
            generator: GENERATOR_NAME.to_owned(),
            formats: ExportFormat::ALL.to_vec(),
            presets,
            usage: UsageNotes {
                parquet: ExportFormat::Parquet.usage_note().to_owned(),
                ply: ExportFormat::Ply.usage_note().to_owned(),
                json: ExportFormat::Json.usage_note().to_owned(),
            },
        }
    }

    pub fn write(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(INDEX_FILE);
        atomic_write(&path, |tmp| {
            serde_json::to_writer_pretty(tmp, self)?;
            Ok(())
        })?;
        Ok(path)
    }

    pub fn read(dir: &Path) -> Result<Self> {
        let bytes = fs::read(dir.join(INDEX_FILE))?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
