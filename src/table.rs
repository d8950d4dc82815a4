//! In-memory table shared by the loader, cleaner and exporter.
//!
//! A [`Table`] is a single Arrow [`RecordBatch`] plus a row index. The index
//! holds one label per row, starting at `0..n` on load. Removing rows keeps
//! the labels of the survivors, so after cleanup the index may have gaps.

use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, AsArray, BooleanArray, RecordBatch, RecordBatchOptions, UInt64Array,
};
use arrow::compute::filter;
use arrow::datatypes::{Field, Schema, SchemaRef, UInt64Type};
use arrow::error::ArrowError;

/// Table loaded from an input file.
#[derive(Debug, Clone)]
pub struct Table {
    batch: RecordBatch,
    index: UInt64Array,
}

impl Table {
    /// Wrap a batch with the default `0..n` row labels.
    pub fn new(batch: RecordBatch) -> Self {
        let index = UInt64Array::from_iter_values(0..batch.num_rows() as u64);
        Self { batch, index }
    }

    /// Wrap a batch with explicit row labels.
    pub fn with_index(batch: RecordBatch, index: UInt64Array) -> Result<Self, ArrowError> {
        if index.len() != batch.num_rows() {
            return Err(ArrowError::InvalidArgumentError(format!(
                "index has {} labels but table has {} rows",
                index.len(),
                batch.num_rows()
            )));
        }
        Ok(Self { batch, index })
    }

    /// Build a table from named columns, all marked nullable.
    ///
    /// `row_count` is only consulted when `columns` is empty.
    pub fn from_columns(
        columns: Vec<(String, ArrayRef)>,
        row_count: usize,
    ) -> Result<Self, ArrowError> {
        let fields: Vec<Field> = columns
            .iter()
            .map(|(name, array)| Field::new(name, array.data_type().clone(), true))
            .collect();
        let arrays: Vec<ArrayRef> = columns.into_iter().map(|(_, array)| array).collect();
        let options = RecordBatchOptions::new().with_row_count(Some(row_count));
        let batch =
            RecordBatch::try_new_with_options(Arc::new(Schema::new(fields)), arrays, &options)?;
        Ok(Self::new(batch))
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn num_columns(&self) -> usize {
        self.batch.num_columns()
    }

    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn column(&self, idx: usize) -> &ArrayRef {
        self.batch.column(idx)
    }

    /// Column names in order.
    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    /// Row labels in order.
    pub fn index(&self) -> &UInt64Array {
        &self.index
    }

    /// Keep only the rows where `mask` is true. Returns the number removed.
    pub fn retain(&mut self, mask: &BooleanArray) -> Result<usize, ArrowError> {
        let before = self.num_rows();
        let columns = self
            .batch
            .columns()
            .iter()
            .map(|col| filter(col.as_ref(), mask))
            .collect::<Result<Vec<_>, _>>()?;
        let kept = mask.true_count();
        let options = RecordBatchOptions::new().with_row_count(Some(kept));
        self.batch = RecordBatch::try_new_with_options(self.batch.schema(), columns, &options)?;
        self.index = filter(&self.index, mask)?
            .as_primitive::<UInt64Type>()
            .clone();
        Ok(before - self.num_rows())
    }

    /// Replace the column at `idx`, keeping its name. The type may change.
    pub fn replace_column(&mut self, idx: usize, array: ArrayRef) -> Result<(), ArrowError> {
        if array.len() != self.num_rows() {
            return Err(ArrowError::InvalidArgumentError(format!(
                "replacement column has {} rows, expected {}",
                array.len(),
                self.num_rows()
            )));
        }

        let schema = self.batch.schema();
        let fields: Vec<Field> = schema
            .fields()
            .iter()
            .enumerate()
            .map(|(i, f)| {
                if i == idx {
                    Field::new(f.name(), array.data_type().clone(), true)
                } else {
                    f.as_ref().clone()
                }
            })
            .collect();

        let mut columns = self.batch.columns().to_vec();
        columns[idx] = array;

        let options = RecordBatchOptions::new().with_row_count(Some(self.num_rows()));
        self.batch =
            RecordBatch::try_new_with_options(Arc::new(Schema::new(fields)), columns, &options)?;
        Ok(())
    }
}
