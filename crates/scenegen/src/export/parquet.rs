//! Parquet export of the point table (Snappy-compressed, one row group per
//! write) and reload into a [`PointTable`].

use std::fs::File;
use std::path::Path;

use arrow::compute::concat_batches;
use arrow::record_batch::RecordBatch;
use arrow_schema::ArrowError;
use ::parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use ::parquet::arrow::ArrowWriter;
use ::parquet::basic::Compression;
use ::parquet::file::properties::WriterProperties;

use crate::error::Result;
use crate::table::PointTable;

pub fn write_parquet_file<P: AsRef<Path>>(path: P, table: &PointTable) -> Result<()> {
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();

    super::atomic_write(path.as_ref(), |tmp| {
        let mut writer = ArrowWriter::try_new(tmp, table.batch().schema(), Some(props))?;
        writer.write(table.batch())?;
        writer.close()?;
        Ok(())
    })
}

pub fn read_parquet_file<P: AsRef<Path>>(path: P) -> Result<PointTable> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(path)?)?;
    let schema = builder.schema().clone();

    let batches = builder
        .build()?
        .collect::<Result<Vec<RecordBatch>, ArrowError>>()?;

    PointTable::try_from_batch(concat_batches(&schema, &batches)?)
}
