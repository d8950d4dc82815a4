//! Cell-by-cell column building for the spreadsheet and JSON readers.
//!
//! Those formats hand us loosely typed cells rather than text, so each column
//! is collected as [`Cell`]s first and typed once the whole column is known.

use std::sync::Arc;

use arrow::array::{
    ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray, TimestampNanosecondArray,
    UInt64Array,
};
use arrow::error::ArrowError;
use chrono::NaiveDateTime;

use crate::table::Table;

/// A single loosely typed input value.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Cell {
    Empty,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    DateTime(NaiveDateTime),
}

impl Cell {
    fn render(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Int(v) => Some(v.to_string()),
            Cell::Float(v) => Some(v.to_string()),
            Cell::Bool(v) => Some(v.to_string()),
            Cell::Text(s) => Some(s.clone()),
            Cell::DateTime(dt) => Some(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }
}

/// Column type chosen from the kinds of cells present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Int,
    Float,
    Bool,
    DateTime,
    Text,
}

fn column_kind(cells: &[Cell]) -> Kind {
    let mut kind: Option<Kind> = None;

    for cell in cells {
        let cell_kind = match cell {
            Cell::Empty => continue,
            Cell::Int(_) => Kind::Int,
            Cell::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => Kind::Int,
            Cell::Float(_) => Kind::Float,
            Cell::Bool(_) => Kind::Bool,
            Cell::DateTime(_) => Kind::DateTime,
            Cell::Text(_) => return Kind::Text,
        };

        kind = match (kind, cell_kind) {
            (None, k) => Some(k),
            (Some(a), b) if a == b => Some(a),
            (Some(Kind::Int), Kind::Float) | (Some(Kind::Float), Kind::Int) => Some(Kind::Float),
            _ => return Kind::Text,
        };
    }

    // All-empty columns carry no type information
    kind.unwrap_or(Kind::Text)
}

/// Build a typed Arrow array from a column of cells.
pub(crate) fn build_array(cells: &[Cell]) -> ArrayRef {
    match column_kind(cells) {
        Kind::Int => Arc::new(
            cells
                .iter()
                .map(|c| match c {
                    Cell::Int(v) => Some(*v),
                    Cell::Float(f) => Some(*f as i64),
                    _ => None,
                })
                .collect::<Int64Array>(),
        ),
        Kind::Float => Arc::new(
            cells
                .iter()
                .map(|c| match c {
                    Cell::Int(v) => Some(*v as f64),
                    Cell::Float(f) if !f.is_nan() => Some(*f),
                    _ => None,
                })
                .collect::<Float64Array>(),
        ),
        Kind::Bool => Arc::new(
            cells
                .iter()
                .map(|c| match c {
                    Cell::Bool(b) => Some(*b),
                    _ => None,
                })
                .collect::<BooleanArray>(),
        ),
        Kind::DateTime => Arc::new(
            cells
                .iter()
                .map(|c| match c {
                    Cell::DateTime(dt) => dt.and_utc().timestamp_nanos_opt(),
                    _ => None,
                })
                .collect::<TimestampNanosecondArray>(),
        ),
        Kind::Text => Arc::new(cells.iter().map(Cell::render).collect::<StringArray>()),
    }
}

/// Assemble a table from headers and column-major cells.
pub(crate) fn build_table(
    headers: Vec<String>,
    columns: Vec<Vec<Cell>>,
    row_count: usize,
    index: Option<Vec<u64>>,
) -> Result<Table, ArrowError> {
    let named: Vec<(String, ArrayRef)> = headers
        .into_iter()
        .zip(columns.iter())
        .map(|(name, cells)| (name, build_array(cells)))
        .collect();

    let table = Table::from_columns(named, row_count)?;
    match index {
        Some(labels) => Table::with_index(table.batch().clone(), UInt64Array::from(labels)),
        None => Ok(table),
    }
}
