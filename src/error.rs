//! Error types for cliner.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for cliner operations.
///
/// Every variant except [`Error::Io`] is recoverable: the session prints it
/// and starts over from the path prompt.
#[derive(Error, Debug)]
pub enum Error {
    /// Error loading the input table
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Error applying a cleanup operation
    #[error(transparent)]
    Clean(#[from] CleanError),

    /// Error writing the output file
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Invalid menu selection
    #[error(transparent)]
    Choice(#[from] ChoiceError),

    /// Console I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to loading an input file.
#[derive(Error, Debug)]
pub enum LoadError {
    /// Path does not exist
    #[error("file not found.")]
    FileNotFound { path: PathBuf },

    /// Extension is not one of the supported readers
    #[error("Unsupported file type: {extension}")]
    UnsupportedFileType { extension: String },

    /// File exists but could not be parsed
    #[error("failed to read {}: {reason}", path.display())]
    Read { path: PathBuf, reason: String },
}

impl LoadError {
    pub(crate) fn read(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        LoadError::Read {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Errors raised while cleaning a table.
#[derive(Error, Debug)]
pub enum CleanError {
    /// Arrow compute kernel failure
    #[error("cleanup failed: {0}")]
    Arrow(String),
}

impl From<arrow::error::ArrowError> for CleanError {
    fn from(err: arrow::error::ArrowError) -> Self {
        CleanError::Arrow(err.to_string())
    }
}

/// Errors raised while writing an output file.
#[derive(Error, Debug)]
pub enum ExportError {
    /// I/O error creating or writing the file
    #[error("export failed: {0}")]
    Io(#[from] std::io::Error),

    /// Arrow encoder or cast failure
    #[error("export failed: {0}")]
    Arrow(String),

    /// Spreadsheet writer failure
    #[error("export failed: {0}")]
    Xlsx(String),

    /// JSON serialization failure
    #[error("export failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<arrow::error::ArrowError> for ExportError {
    fn from(err: arrow::error::ArrowError) -> Self {
        ExportError::Arrow(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for ExportError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        ExportError::Xlsx(err.to_string())
    }
}

/// Errors related to menu input.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ChoiceError {
    /// Input is empty or not made of digits
    #[error("Please enter a valid {menu} option.")]
    NotNumeric { menu: &'static str, input: String },

    /// Number is not one of the listed options
    #[error("Please enter a valid {menu} option.")]
    OutOfRange { menu: &'static str, value: u64 },
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
