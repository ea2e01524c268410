//! Columnar point table backed by an Arrow `RecordBatch`.
//!
//! Schema (all columns non-nullable, equal length):
//!
//! | column      | type    |                                   |
//! |-------------|---------|-----------------------------------|
//! | `x`         | Float32 |                                   |
//! | `y`         | Float32 |                                   |
//! | `z`         | Float32 |                                   |
//! | `intensity` | Float32 | `[0, 1]`                          |
//! | `label`     | Utf8    | object id or surface label        |
//! | `timestamp` | Float64 | optional; one value for all rows  |

use std::collections::HashMap;
use std::sync::Arc;

use arrow::record_batch::RecordBatch;
use arrow_array::{Array, ArrayRef, Float32Array, Float64Array, StringArray};
use arrow_schema::{DataType, Field, Schema, SchemaRef};

use crate::error::{Error, Result};
use crate::types::{Point, Scene};

pub const COL_X: &str = "x";
pub const COL_Y: &str = "y";
pub const COL_Z: &str = "z";
pub const COL_INTENSITY: &str = "intensity";
pub const COL_LABEL: &str = "label";
pub const COL_TIMESTAMP: &str = "timestamp";

/// Seconds since the Unix epoch, microsecond resolution.
pub fn generation_timestamp() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1e6
}

pub fn schema(with_timestamp: bool) -> SchemaRef {
    let mut fields = vec![
        Field::new(COL_X, DataType::Float32, false),
        Field::new(COL_Y, DataType::Float32, false),
        Field::new(COL_Z, DataType::Float32, false),
        Field::new(COL_INTENSITY, DataType::Float32, false),
        Field::new(COL_LABEL, DataType::Utf8, false),
    ];

    if with_timestamp {
        fields.push(
            Field::new(COL_TIMESTAMP, DataType::Float64, false)
                .with_metadata(HashMap::from([("unit".to_owned(), "s".to_owned())])),
        );
    }

    Arc::new(Schema::new(fields))
}

#[derive(Debug, Clone)]
pub struct PointTable {
    batch: RecordBatch,
    x: Float32Array,
    y: Float32Array,
    z: Float32Array,
    intensity: Float32Array,
    label: StringArray,
    timestamp: Option<Float64Array>,
}

fn f32_column(batch: &RecordBatch, name: &'static str) -> Result<Float32Array> {
    batch
        .column_by_name(name)
        .filter(|c| c.null_count() == 0)
        .and_then(|c| c.as_any().downcast_ref::<Float32Array>())
        .cloned()
        .ok_or(Error::Column(name))
}

impl PointTable {
    pub fn from_scene(scene: &Scene, timestamp: Option<f64>) -> Result<Self> {
        Self::from_parts(&scene.points, &scene.labels, timestamp)
    }

    /// Pack points and their labels row by row.
    pub fn from_parts(points: &[Point], labels: &[String], timestamp: Option<f64>) -> Result<Self> {
        if labels.len() != points.len() {
            return Err(Error::ColumnLength {
                column: COL_LABEL,
                expected: points.len(),
                actual: labels.len(),
            });
        }

        let column = |k: usize| -> ArrayRef {
            Arc::new(Float32Array::from_iter_values(points.iter().map(|p| p[k])))
        };

        let mut columns = vec![
            column(0),
            column(1),
            column(2),
            column(3),
            Arc::new(StringArray::from_iter_values(labels.iter())) as ArrayRef,
        ];

        if let Some(ts) = timestamp {
            columns.push(Arc::new(Float64Array::from_value(ts, points.len())));
        }

        let batch = RecordBatch::try_new(schema(timestamp.is_some()), columns)?;
        Self::try_from_batch(batch)
    }

    /// Wrap an existing batch after checking column names, types and nulls.
    pub fn try_from_batch(batch: RecordBatch) -> Result<Self> {
        let label = batch
            .column_by_name(COL_LABEL)
            .filter(|c| c.null_count() == 0)
            .and_then(|c| c.as_any().downcast_ref::<StringArray>())
            .cloned()
            .ok_or(Error::Column(COL_LABEL))?;

        let timestamp = match batch.column_by_name(COL_TIMESTAMP) {
            None => None,
            Some(c) => Some(
                c.as_any()
                    .downcast_ref::<Float64Array>()
                    .filter(|a| a.null_count() == 0)
                    .cloned()
                    .ok_or(Error::Column(COL_TIMESTAMP))?,
            ),
        };

        Ok(Self {
            x: f32_column(&batch, COL_X)?,
            y: f32_column(&batch, COL_Y)?,
            z: f32_column(&batch, COL_Z)?,
            intensity: f32_column(&batch, COL_INTENSITY)?,
            label,
            timestamp,
            batch,
        })
    }

    #[inline]
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.num_rows() == 0
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn x(&self) -> &Float32Array {
        &self.x
    }

    pub fn y(&self) -> &Float32Array {
        &self.y
    }

    pub fn z(&self) -> &Float32Array {
        &self.z
    }

    pub fn intensity(&self) -> &Float32Array {
        &self.intensity
    }

    pub fn labels(&self) -> &StringArray {
        &self.label
    }

    pub fn timestamp(&self) -> Option<&Float64Array> {
        self.timestamp.as_ref()
    }

    /// Row `i` as `[x, y, z, intensity]`.
    #[inline]
    pub fn point(&self, i: usize) -> Point {
        [
            self.x.value(i),
            self.y.value(i),
            self.z.value(i),
            self.intensity.value(i),
        ]
    }

    pub fn points(&self) -> impl ExactSizeIterator<Item = Point> + '_ {
        (0..self.num_rows()).map(|i| self.point(i))
    }

    pub fn label_values(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        (0..self.num_rows()).map(|i| self.label.value(i))
    }
}
