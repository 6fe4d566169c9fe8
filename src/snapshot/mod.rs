//! Snapshot codec (Arrow/Parquet)
//!
//! A snapshot is a single Parquet file holding one row per step:
//!
//! ```text
//! step (Int64, non-null) | <metric> (Int64 | Float64, nullable) | ...
//! ```
//!
//! Metric columns appear in first-seen order. A column is `Int64` when every
//! recorded value is an integer, otherwise `Float64` with integers widened.
//! Each write replaces the whole file.

use crate::config::SnapshotCompression;
use crate::train_log::{MetricTable, MetricValue};
use crate::{Error, Result};
use arrow::array::{Array, ArrayRef, Float64Array, Int64Array, RecordBatch};
use arrow::datatypes::{DataType, Field, Schema};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// Name of the step index column
pub const STEP_COLUMN: &str = "step";

/// File extension of snapshot files
pub const SNAPSHOT_EXTENSION: &str = "parquet";

/// Build a record batch from a metric table.
///
/// # Errors
///
/// Returns error if a metric is named like the step index column or Arrow
/// rejects the assembled columns
pub fn to_record_batch(table: &MetricTable) -> Result<RecordBatch> {
    if table.columns().iter().any(|c| c == STEP_COLUMN) {
        return Err(Error::InvalidInput(format!(
            "Metric column '{STEP_COLUMN}' collides with the step index"
        )));
    }

    let mut fields = Vec::with_capacity(table.columns().len() + 1);
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(table.columns().len() + 1);

    fields.push(Field::new(STEP_COLUMN, DataType::Int64, false));
    arrays.push(Arc::new(Int64Array::from_iter_values(table.steps())));

    for column in table.columns() {
        let cells: Vec<Option<MetricValue>> = table
            .rows()
            .map(|(_, row)| row.get(column).copied())
            .collect();

        if cells.iter().flatten().all(|v| v.is_int()) {
            let values: Int64Array = cells
                .iter()
                .copied()
                .map(|c| c.and_then(MetricValue::as_i64))
                .collect();
            fields.push(Field::new(column, DataType::Int64, true));
            arrays.push(Arc::new(values));
        } else {
            let values: Float64Array = cells
                .iter()
                .copied()
                .map(|c| c.map(MetricValue::as_f64))
                .collect();
            fields.push(Field::new(column, DataType::Float64, true));
            arrays.push(Arc::new(values));
        }
    }

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
}

/// Write `table` to `path`, truncating any previous snapshot.
///
/// # Errors
///
/// Returns error if the file cannot be created or Parquet encoding fails
pub fn write_snapshot<P: AsRef<Path>>(
    path: P,
    table: &MetricTable,
    compression: SnapshotCompression,
) -> Result<()> {
    let batch = to_record_batch(table)?;
    let props = WriterProperties::builder()
        .set_compression(compression.to_parquet()?)
        .build();

    let file = File::create(path.as_ref())?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

/// Load a snapshot written by [`write_snapshot`] back into a table.
///
/// # Errors
///
/// Returns error if the file cannot be read or does not have the
/// step/metric layout
pub fn read_snapshot<P: AsRef<Path>>(path: P) -> Result<MetricTable> {
    let file = File::open(path.as_ref())?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut table = MetricTable::new();
    for batch in reader {
        append_batch(&mut table, &batch?)?;
    }
    Ok(table)
}

fn append_batch(table: &mut MetricTable, batch: &RecordBatch) -> Result<()> {
    let schema = batch.schema();
    let steps = batch
        .column_by_name(STEP_COLUMN)
        .and_then(|c| c.as_any().downcast_ref::<Int64Array>())
        .ok_or_else(|| {
            Error::StorageError(format!("Snapshot has no Int64 '{STEP_COLUMN}' column"))
        })?;

    let mut metric_columns = Vec::with_capacity(schema.fields().len());
    for (field, array) in schema.fields().iter().zip(batch.columns()) {
        if field.name() == STEP_COLUMN {
            continue;
        }
        match field.data_type() {
            DataType::Int64 | DataType::Float64 => {
                table.ensure_column(field.name());
                metric_columns.push((field.name(), array));
            }
            other => {
                return Err(Error::StorageError(format!(
                    "Unsupported type {other} for metric column '{}'",
                    field.name()
                )))
            }
        }
    }

    for row in 0..batch.num_rows() {
        if steps.is_null(row) {
            return Err(Error::StorageError(format!("Null step at row {row}")));
        }
        let fields = metric_columns
            .iter()
            .filter_map(|(name, array)| cell(array, row).map(|v| (name.to_string(), v)));
        table.merge(steps.value(row), fields.collect::<Vec<_>>());
    }
    Ok(())
}

fn cell(array: &ArrayRef, row: usize) -> Option<MetricValue> {
    if array.is_null(row) {
        return None;
    }
    if let Some(ints) = array.as_any().downcast_ref::<Int64Array>() {
        return Some(MetricValue::Int(ints.value(row)));
    }
    array
        .as_any()
        .downcast_ref::<Float64Array>()
        .map(|floats| MetricValue::Float(floats.value(row)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_table() -> MetricTable {
        let mut table = MetricTable::new();
        table.merge(
            0,
            vec![
                ("loss".to_string(), MetricValue::Float(2.5)),
                ("tokens".to_string(), MetricValue::Int(512)),
            ],
        );
        table.merge(100, vec![("loss".to_string(), MetricValue::Float(1.25))]);
        table.merge(
            50,
            vec![
                ("tokens".to_string(), MetricValue::Int(1024)),
                ("mixed".to_string(), MetricValue::Int(1)),
            ],
        );
        table.merge(60, vec![("mixed".to_string(), MetricValue::Float(0.5))]);
        table
    }

    #[test]
    fn test_record_batch_layout() {
        let batch = to_record_batch(&sample_table()).unwrap();
        let schema = batch.schema();

        assert_eq!(batch.num_rows(), 4);
        let names: Vec<_> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(names, vec!["step", "loss", "tokens", "mixed"]);
        assert_eq!(schema.field(0).data_type(), &DataType::Int64);
        assert!(!schema.field(0).is_nullable());
        assert_eq!(schema.field(1).data_type(), &DataType::Float64);
        assert_eq!(schema.field(2).data_type(), &DataType::Int64);
        assert_eq!(schema.field(3).data_type(), &DataType::Float64);

        let steps = batch.column(0).as_any().downcast_ref::<Int64Array>().unwrap();
        assert_eq!(steps.values().to_vec(), vec![0, 100, 50, 60]);

        let tokens = batch.column(2).as_any().downcast_ref::<Int64Array>().unwrap();
        assert_eq!(tokens.null_count(), 2);
        assert_eq!(tokens.value(2), 1024);
    }

    #[test]
    fn test_empty_table_batch() {
        let batch = to_record_batch(&MetricTable::new()).unwrap();
        assert_eq!(batch.num_rows(), 0);
        assert_eq!(batch.num_columns(), 1);
    }

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("train.parquet");
        let table = sample_table();

        write_snapshot(&path, &table, SnapshotCompression::default()).unwrap();
        let loaded = read_snapshot(&path).unwrap();

        assert_eq!(loaded.steps().collect::<Vec<_>>(), vec![0, 100, 50, 60]);
        assert_eq!(loaded.columns(), ["loss", "tokens", "mixed"]);
        assert_eq!(loaded.value(0, "tokens"), Some(MetricValue::Int(512)));
        assert_eq!(loaded.value(100, "tokens"), None);
        // Integer cell in a float column reloads as a float
        assert_eq!(loaded.value(50, "mixed"), Some(MetricValue::Float(1.0)));
    }

    #[test]
    fn test_reload_keeps_column_order_for_late_cells() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("order.parquet");

        let mut table = MetricTable::new();
        table.merge(0, vec![("a".to_string(), MetricValue::Int(1))]);
        table.merge(1, vec![("b".to_string(), MetricValue::Int(2))]);
        table.merge(0, vec![("c".to_string(), MetricValue::Int(3))]);

        write_snapshot(&path, &table, SnapshotCompression::default()).unwrap();
        let loaded = read_snapshot(&path).unwrap();
        assert_eq!(loaded.columns(), ["a", "b", "c"]);
        assert_eq!(loaded.value(0, "c"), Some(MetricValue::Int(3)));
    }

    #[test]
    fn test_write_overwrites_previous_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("eval.parquet");

        write_snapshot(&path, &sample_table(), SnapshotCompression::Uncompressed).unwrap();
        let mut small = MetricTable::new();
        small.merge(7, vec![("acc".to_string(), MetricValue::Float(0.9))]);
        write_snapshot(&path, &small, SnapshotCompression::Uncompressed).unwrap();

        let loaded = read_snapshot(&path).unwrap();
        assert_eq!(loaded, small);
    }

    #[test]
    fn test_read_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = read_snapshot(dir.path().join("absent.parquet"));
        match result {
            Err(Error::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            other => panic!("expected NotFound IO error, got {other:?}"),
        }
    }

    #[test]
    fn test_metric_named_step_is_rejected_not_dropped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("clash.parquet");

        let mut table = MetricTable::new();
        table.merge(
            0,
            vec![
                ("step".to_string(), MetricValue::Int(99)),
                ("loss".to_string(), MetricValue::Float(1.0)),
            ],
        );

        assert!(matches!(to_record_batch(&table), Err(Error::InvalidInput(_))));
        let err = write_snapshot(&path, &table, SnapshotCompression::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(!path.exists());
    }

    #[test]
    fn test_read_rejects_foreign_layout() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("foreign.parquet");

        let schema = Arc::new(Schema::new(vec![Field::new("id", DataType::Int64, false)]));
        let batch =
            RecordBatch::try_new(schema.clone(), vec![Arc::new(Int64Array::from(vec![1, 2]))])
                .unwrap();
        let mut writer = ArrowWriter::try_new(File::create(&path).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let err = read_snapshot(&path).unwrap_err();
        assert!(err.to_string().contains("no Int64 'step' column"));
    }
}
