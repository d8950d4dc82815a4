//! Row-filtering cleanup operations.
//!
//! Each operation mutates the [`Table`] in place and reports how many rows it
//! removed. Exactly one operation runs per session iteration.
//!
//! ## Operations
//!
//! - [`Cleanup::MissingValues`] drops every row with an undefined cell
//! - [`Cleanup::WrongTypes`] coerces columns to numbers or timestamps, then
//!   drops every row with an undefined cell
//! - [`Cleanup::Duplicates`] drops rows equal to an earlier row

pub mod coerce;

use std::collections::HashSet;

use arrow::array::{Array, ArrayRef, AsArray, BooleanArray};
use arrow::compute::{and, is_not_null};
use arrow::datatypes::{DataType, Float32Type, Float64Type};
use arrow::error::ArrowError;
use arrow::row::{RowConverter, SortField};
use tracing::debug;

use crate::error::CleanError;
use crate::table::Table;

/// Column name fragments that exempt a column from type normalization.
pub const PROTECTED_NAME_PARTS: &[&str] = &["id", "code", "number"];

/// Cleanup operations offered by the session menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cleanup {
    /// Drop rows containing an undefined cell
    MissingValues,
    /// Coerce columns to numeric or date/time, dropping rows that fail
    WrongTypes,
    /// Drop exact duplicate rows
    Duplicates,
}

impl Cleanup {
    /// All operations in menu order.
    pub const ALL: [Cleanup; 3] = [
        Cleanup::MissingValues,
        Cleanup::WrongTypes,
        Cleanup::Duplicates,
    ];

    /// Look up an operation by its menu number (1-based).
    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            1 => Some(Cleanup::MissingValues),
            2 => Some(Cleanup::WrongTypes),
            3 => Some(Cleanup::Duplicates),
            _ => None,
        }
    }

    /// Menu number (1-based).
    pub fn code(self) -> u64 {
        match self {
            Cleanup::MissingValues => 1,
            Cleanup::WrongTypes => 2,
            Cleanup::Duplicates => 3,
        }
    }

    /// Menu text.
    pub fn label(self) -> &'static str {
        match self {
            Cleanup::MissingValues => "Missing values",
            Cleanup::WrongTypes => "Fix/drop wrong data types",
            Cleanup::Duplicates => "Duplicates",
        }
    }
}

/// Which coercion replaced a column during type normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    Numeric,
    DateTime,
}

/// Outcome of a cleanup operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanReport {
    /// Rows dropped from the table
    pub rows_removed: usize,
    /// Columns whose type changed, in column order
    pub converted: Vec<(String, Coercion)>,
}

/// Run `cleanup` against `table`.
pub fn apply(cleanup: Cleanup, table: &mut Table) -> Result<CleanReport, CleanError> {
    let report = match cleanup {
        Cleanup::MissingValues => CleanReport {
            rows_removed: drop_missing(table)?,
            converted: Vec::new(),
        },
        Cleanup::WrongTypes => normalize_types(table)?,
        Cleanup::Duplicates => CleanReport {
            rows_removed: drop_duplicates(table)?,
            converted: Vec::new(),
        },
    };

    debug!(
        ?cleanup,
        rows_removed = report.rows_removed,
        converted = report.converted.len(),
        rows_left = table.num_rows(),
        "cleanup finished"
    );
    Ok(report)
}

/// Whether type normalization must leave the named column alone.
pub fn is_protected(column_name: &str) -> bool {
    let lower = column_name.to_lowercase();
    PROTECTED_NAME_PARTS.iter().any(|part| lower.contains(part))
}

/// Drop every row that has a null (or NaN) in any column.
pub fn drop_missing(table: &mut Table) -> Result<usize, CleanError> {
    let mask = complete_rows(table)?;
    Ok(table.retain(&mask)?)
}

/// Coerce unprotected columns, then drop rows left with an undefined cell.
///
/// Numeric coercion is tried first; date/time only when no value converts to
/// a number. A column is replaced when at least one value converts.
pub fn normalize_types(table: &mut Table) -> Result<CleanReport, CleanError> {
    let mut converted = Vec::new();

    for (idx, name) in table.column_names().into_iter().enumerate() {
        if is_protected(&name) {
            debug!(column = %name, "skipping protected column");
            continue;
        }

        let column = table.column(idx).clone();
        let coerced = coerce::to_numeric(&column)
            .filter(|c| coerce::present(c) > 0)
            .map(|c| (c, Coercion::Numeric))
            .or_else(|| {
                coerce::to_datetime(&column)
                    .filter(|c| coerce::present(c) > 0)
                    .map(|c| (c, Coercion::DateTime))
            });

        let Some((replacement, coercion)) = coerced else {
            debug!(column = %name, "no values coerce, leaving column as is");
            continue;
        };

        if replacement.data_type() != column.data_type() {
            debug!(
                column = %name,
                ?coercion,
                data_type = %replacement.data_type(),
                "coerced column"
            );
            table.replace_column(idx, replacement)?;
            converted.push((name, coercion));
        }
    }

    Ok(CleanReport {
        rows_removed: drop_missing(table)?,
        converted,
    })
}

/// Drop rows that repeat an earlier row across all columns.
///
/// Undefined cells compare equal to each other. The first occurrence is kept.
pub fn drop_duplicates(table: &mut Table) -> Result<usize, CleanError> {
    if table.num_columns() == 0 || table.num_rows() == 0 {
        return Ok(0);
    }

    let fields: Vec<SortField> = table
        .schema()
        .fields()
        .iter()
        .map(|f| SortField::new(f.data_type().clone()))
        .collect();
    let converter = RowConverter::new(fields)?;
    let rows = converter.convert_columns(table.batch().columns())?;

    let mut seen = HashSet::with_capacity(rows.num_rows());
    let first_seen: Vec<bool> = rows.iter().map(|row| seen.insert(row)).collect();

    Ok(table.retain(&BooleanArray::from(first_seen))?)
}

/// Mask of rows with no undefined cell.
fn complete_rows(table: &Table) -> Result<BooleanArray, ArrowError> {
    let mut mask = BooleanArray::from(vec![true; table.num_rows()]);

    for column in table.batch().columns() {
        mask = and(&mask, &is_not_null(column.as_ref())?)?;
        if let Some(not_nan) = not_nan(column) {
            mask = and(&mask, &not_nan)?;
        }
    }

    Ok(mask)
}

/// For float columns, a mask that is false where the value is NaN.
fn not_nan(column: &ArrayRef) -> Option<BooleanArray> {
    let mask: Vec<bool> = match column.data_type() {
        DataType::Float32 => column
            .as_primitive::<Float32Type>()
            .iter()
            .map(|v| v.map_or(true, |f| !f.is_nan()))
            .collect(),
        DataType::Float64 => column
            .as_primitive::<Float64Type>()
            .iter()
            .map(|v| v.map_or(true, |f| !f.is_nan()))
            .collect(),
        _ => return None,
    };
    Some(BooleanArray::from(mask))
}
