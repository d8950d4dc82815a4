//! Input loading.
//!
//! This module handles:
//! - Resolving the input path and checking it exists
//! - Dispatching on the lower-cased file extension
//! - Reading CSV, spreadsheet (`.xls`/`.xlsx`) and JSON files into a [`Table`]
//!
//! All readers share the same header cleanup (blank and repeated names) and,
//! for text based cells, the same set of missing-value markers.

mod cells;
mod csv;
mod excel;
mod json;

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, info};

use crate::error::LoadError;
use crate::table::Table;

/// Cell contents treated as undefined when reading CSV and spreadsheet text.
pub const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Comma-separated values
    Csv,
    /// Excel workbook, first sheet
    Spreadsheet,
    /// JSON records or columns
    Json,
}

impl SourceFormat {
    /// Match a lower-cased extension including its leading dot.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            ".csv" => Some(SourceFormat::Csv),
            ".xls" | ".xlsx" => Some(SourceFormat::Spreadsheet),
            ".json" => Some(SourceFormat::Json),
            _ => None,
        }
    }
}

/// Lower-cased extension of `path` with its leading dot, or an empty string.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_lowercase()))
        .unwrap_or_default()
}

/// Load the table stored at `path`.
///
/// An empty path names the working directory, which exists but has no
/// supported extension.
pub fn load(path: impl AsRef<Path>) -> Result<Table, LoadError> {
    let path = path.as_ref();
    let path = if path.as_os_str().is_empty() {
        Path::new(".")
    } else {
        path
    };

    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let extension = extension_of(path);
    let format = SourceFormat::from_extension(&extension)
        .ok_or(LoadError::UnsupportedFileType { extension })?;

    debug!(path = %path.display(), ?format, "reading input");

    let table = match format {
        SourceFormat::Csv => csv::read(path)?,
        SourceFormat::Spreadsheet => excel::read(path)?,
        SourceFormat::Json => json::read(path)?,
    };

    info!(
        path = %path.display(),
        rows = table.num_rows(),
        columns = table.num_columns(),
        "loaded table"
    );
    Ok(table)
}

/// Whether a text cell holds one of the missing-value markers.
pub(crate) fn is_missing_marker(value: &str) -> bool {
    MISSING_MARKERS.contains(&value)
}

/// Give blank headers a positional name and suffix repeated ones.
///
/// `["a", "", "a"]` becomes `["a", "Unnamed: 1", "a.1"]`.
pub(crate) fn normalize_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut headers = Vec::with_capacity(raw.len());

    for (idx, name) in raw.into_iter().enumerate() {
        let base = if name.trim().is_empty() {
            format!("Unnamed: {idx}")
        } else {
            name
        };

        let mut candidate = base.clone();
        let mut suffix = 0;
        while seen.contains(&candidate) {
            suffix += 1;
            candidate = format!("{base}.{suffix}");
        }
        seen.insert(candidate.clone());
        headers.push(candidate);
    }

    headers
}
