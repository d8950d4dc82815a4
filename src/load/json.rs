//! JSON reader.
//!
//! Three layouts are accepted:
//! - records: `[{"a": 1, "b": "x"}, {"a": 2, "b": "y"}]`
//! - columns keyed by row label: `{"a": {"0": 1, "1": 2}, "b": {"0": "x", "1": "y"}}`
//! - columns as arrays: `{"a": [1, 2], "b": ["x", "y"]}`
//!
//! The second is what the JSON exporter writes, so exported tables load back
//! with their row labels.

use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde_json::{Map, Value};

use super::cells::{build_table, Cell};
use super::normalize_headers;
use crate::error::LoadError;
use crate::table::Table;

/// Column-major cells plus optional row labels, before typing.
struct Columns {
    headers: Vec<String>,
    cells: Vec<Vec<Cell>>,
    row_count: usize,
    index: Option<Vec<u64>>,
}

pub(super) fn read(path: &Path) -> Result<Table, LoadError> {
    let file = File::open(path).map_err(|e| LoadError::read(path, e))?;
    let value: Value =
        serde_json::from_reader(BufReader::new(file)).map_err(|e| LoadError::read(path, e))?;

    let columns = parse(value).map_err(|reason| LoadError::read(path, reason))?;

    build_table(
        normalize_headers(columns.headers),
        columns.cells,
        columns.row_count,
        columns.index,
    )
    .map_err(|e| LoadError::read(path, e))
}

fn parse(value: Value) -> Result<Columns, String> {
    match value {
        Value::Array(records) => parse_records(records),
        Value::Object(map) if map.values().all(Value::is_object) => parse_labelled_columns(map),
        Value::Object(map) if map.values().all(Value::is_array) => parse_array_columns(map),
        Value::Object(_) => Err("expected every column to be an object or an array".to_string()),
        _ => Err("expected a JSON array or object at the top level".to_string()),
    }
}

fn parse_records(records: Vec<Value>) -> Result<Columns, String> {
    let mut headers: Vec<String> = Vec::new();
    let mut cells: Vec<Vec<Cell>> = Vec::new();

    for (row_idx, record) in records.iter().enumerate() {
        let Value::Object(fields) = record else {
            return Err(format!("record {row_idx} is not an object"));
        };

        for (key, value) in fields {
            let col_idx = match headers.iter().position(|h| h == key) {
                Some(idx) => idx,
                None => {
                    // Columns first seen late are undefined for earlier rows
                    headers.push(key.clone());
                    cells.push(vec![Cell::Empty; row_idx]);
                    headers.len() - 1
                }
            };
            cells[col_idx].push(to_cell(value));
        }

        for column in cells.iter_mut() {
            if column.len() == row_idx {
                column.push(Cell::Empty);
            }
        }
    }

    Ok(Columns {
        headers,
        cells,
        row_count: records.len(),
        index: None,
    })
}

fn parse_labelled_columns(map: Map<String, Value>) -> Result<Columns, String> {
    // Row labels in first-seen order across all columns
    let mut labels: Vec<String> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for column in map.values() {
        if let Value::Object(rows) = column {
            for label in rows.keys() {
                if seen.insert(label.as_str()) {
                    labels.push(label.clone());
                }
            }
        }
    }

    let mut headers = Vec::with_capacity(map.len());
    let mut cells = Vec::with_capacity(map.len());
    for (name, column) in &map {
        let Value::Object(rows) = column else {
            continue;
        };
        headers.push(name.clone());
        cells.push(
            labels
                .iter()
                .map(|label| rows.get(label).map_or(Cell::Empty, to_cell))
                .collect(),
        );
    }

    let index = labels
        .iter()
        .map(|label| label.parse::<u64>())
        .collect::<Result<Vec<_>, _>>()
        .ok();
    if index.is_none() {
        tracing::warn!("row labels are not integers, renumbering from 0");
    }

    Ok(Columns {
        headers,
        cells,
        row_count: labels.len(),
        index,
    })
}

fn parse_array_columns(map: Map<String, Value>) -> Result<Columns, String> {
    let mut headers = Vec::with_capacity(map.len());
    let mut cells: Vec<Vec<Cell>> = Vec::with_capacity(map.len());

    for (name, column) in &map {
        let Value::Array(values) = column else {
            continue;
        };
        headers.push(name.clone());
        cells.push(values.iter().map(to_cell).collect());
    }

    let row_count = cells.first().map_or(0, Vec::len);
    if cells.iter().any(|c| c.len() != row_count) {
        return Err("all column arrays must be the same length".to_string());
    }

    Ok(Columns {
        headers,
        cells,
        row_count,
        index: None,
    })
}

fn to_cell(value: &Value) -> Cell {
    match value {
        Value::Null => Cell::Empty,
        Value::Bool(b) => Cell::Bool(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Cell::Int(i),
            None => n.as_f64().map_or(Cell::Empty, Cell::Float),
        },
        Value::String(s) => Cell::Text(s.clone()),
        nested => Cell::Text(nested.to_string()),
    }
}
