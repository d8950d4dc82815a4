//! Best-effort column coercion.
//!
//! Both coercions return `None` when the column's type is out of scope, and
//! otherwise an array of the same length where any value that did not convert
//! is null.

use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, AsArray, Float64Array, Int64Array, TimestampNanosecondArray,
};
use arrow::datatypes::DataType;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Layouts tried for values that carry a time of day.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
];

/// Layouts tried for plain dates.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y", "%d %b %Y", "%b %d %Y", "%B %d %Y",
    "%d %B %Y",
];

/// Numeric view of `column`.
///
/// Numeric and boolean columns come back unchanged. Text columns are parsed
/// value by value: the result is `Int64` when every present value is an
/// integer, `Float64` otherwise. Other types return `None`.
pub fn to_numeric(column: &ArrayRef) -> Option<ArrayRef> {
    let data_type = column.data_type();
    if data_type.is_numeric() || data_type == &DataType::Boolean {
        return Some(column.clone());
    }

    let values: Vec<Option<&str>> = match data_type {
        DataType::Utf8 => column.as_string::<i32>().iter().collect(),
        DataType::LargeUtf8 => column.as_string::<i64>().iter().collect(),
        _ => return None,
    };

    let ints: Option<Vec<Option<i64>>> = values
        .iter()
        .map(|v| match v {
            None => Some(None),
            Some(s) => s.trim().parse::<i64>().ok().map(Some),
        })
        .collect();
    if let Some(ints) = ints {
        return Some(Arc::new(Int64Array::from(ints)));
    }

    let floats: Float64Array = values
        .iter()
        .map(|v| {
            v.and_then(|s| s.trim().parse::<f64>().ok())
                .filter(|f| !f.is_nan())
        })
        .collect();
    Some(Arc::new(floats))
}

/// Timestamp view of a text `column`, nanosecond precision, no time zone.
///
/// Temporal columns come back unchanged; non-text columns return `None`.
pub fn to_datetime(column: &ArrayRef) -> Option<ArrayRef> {
    let data_type = column.data_type();
    if data_type.is_temporal() {
        return Some(column.clone());
    }

    let parsed: TimestampNanosecondArray = match data_type {
        DataType::Utf8 => column
            .as_string::<i32>()
            .iter()
            .map(|v| v.and_then(parse_datetime))
            .collect(),
        DataType::LargeUtf8 => column
            .as_string::<i64>()
            .iter()
            .map(|v| v.and_then(parse_datetime))
            .collect(),
        _ => return None,
    };
    Some(Arc::new(parsed))
}

/// Parse one value into nanoseconds since the Unix epoch.
///
/// Values with a UTC offset are normalized to UTC.
pub fn parse_datetime(value: &str) -> Option<i64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return dt.naive_utc().and_utc().timestamp_nanos_opt();
    }

    let naive = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;

    naive.and_utc().timestamp_nanos_opt()
}

/// Number of present values in a coerced column.
pub fn present(column: &ArrayRef) -> usize {
    column.len() - column.null_count()
}
