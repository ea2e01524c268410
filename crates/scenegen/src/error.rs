use std::io;

use arrow_schema::ArrowError;
use parquet::errors::ParquetError;

/// Errors surfaced by table building, export and annotation storage.
///
/// Scene generation itself never fails: unknown presets fall back to the
/// generic scene and budget underflow is clamped.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("arrow error: {0}")]
    Arrow(#[from] ArrowError),

    #[error("parquet error: {0}")]
    Parquet(#[from] ParquetError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("column `{column}` has {actual} rows, expected {expected}")]
    ColumnLength {
        column: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("column `{0}` is missing, has the wrong type, or contains nulls")]
    Column(&'static str),

    #[error("malformed PLY: {0}")]
    Ply(String),

    #[error("invalid file stem {0:?}")]
    InvalidFileStem(String),

    #[error("invalid project id {0:?}")]
    InvalidProjectId(String),

    #[error("stored annotations for project {project:?} are malformed: {source}")]
    MalformedAnnotations {
        project: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<tempfile::PersistError> for Error {
    fn from(e: tempfile::PersistError) -> Self {
        Error::Io(e.error)
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
