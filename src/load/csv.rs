//! CSV reader built on the Arrow CSV decoder.

use std::fs::File;
use std::io::{BufReader, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

use arrow::compute::concat_batches;
use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::{DataType, Field, Schema};
use regex::Regex;

use super::{normalize_headers, MISSING_MARKERS};
use crate::error::LoadError;
use crate::table::Table;

/// Rows decoded per Arrow batch before concatenation.
const BATCH_SIZE: usize = 8192;

/// Regex matching a whole cell that is one of the missing-value markers.
fn null_regex() -> Result<Regex, regex::Error> {
    let alternatives: Vec<String> = MISSING_MARKERS.iter().map(|m| regex::escape(m)).collect();
    Regex::new(&format!("^(?:{})$", alternatives.join("|")))
}

/// Column type to decode with, given the inferred one.
///
/// Inference types date and time columns by pattern alone, so a value such as
/// `2024-02-30` would fail the decode of the whole file. Those columns stay
/// text and are left to type normalization. A column with no values at all
/// infers as `Null` and is kept as text too.
fn text_if_unsafe(inferred: &DataType) -> DataType {
    match inferred {
        DataType::Null
        | DataType::Date32
        | DataType::Date64
        | DataType::Time32(_)
        | DataType::Time64(_)
        | DataType::Timestamp(_, _) => DataType::Utf8,
        other => other.clone(),
    }
}

/// Read a CSV file with a header row, inferring column types from every row.
pub(super) fn read(path: &Path) -> Result<Table, LoadError> {
    let mut file = File::open(path).map_err(|e| LoadError::read(path, e))?;

    let null_regex = null_regex().map_err(|e| LoadError::read(path, e))?;
    let format = Format::default()
        .with_header(true)
        .with_null_regex(null_regex);

    let (inferred, records) = format
        .clone()
        .infer_schema(&mut file, None)
        .map_err(|e| LoadError::read(path, e))?;
    file.seek(SeekFrom::Start(0))
        .map_err(|e| LoadError::read(path, e))?;

    tracing::debug!(records, columns = inferred.fields().len(), "inferred CSV schema");

    let headers = normalize_headers(
        inferred
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect(),
    );

    let fields: Vec<Field> = inferred
        .fields()
        .iter()
        .zip(headers)
        .map(|(field, name)| Field::new(name, text_if_unsafe(field.data_type()), true))
        .collect();
    let schema = Arc::new(Schema::new(fields));

    let reader = ReaderBuilder::new(schema.clone())
        .with_format(format)
        .with_batch_size(BATCH_SIZE)
        .build(BufReader::new(file))
        .map_err(|e| LoadError::read(path, e))?;

    let batches = reader
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| LoadError::read(path, e))?;
    let batch = concat_batches(&schema, &batches).map_err(|e| LoadError::read(path, e))?;

    Ok(Table::new(batch))
}
