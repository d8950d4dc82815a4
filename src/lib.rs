//! cliner - Interactive cleanup for tabular files.
//!
//! This library loads CSV, spreadsheet and JSON files into an Arrow-backed
//! [`Table`], applies one of three cleanups (drop missing values, normalize
//! column types, drop duplicate rows) and exports the result as CSV, XLSX,
//! JSON or HTML.
//!
//! # Example
//!
//! ```no_run
//! use cliner::clean::{self, Cleanup};
//! use cliner::cli::{ExportFormat, Exporter};
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut table = cliner::load::load("sales.csv")?;
//!     let report = clean::apply(Cleanup::Duplicates, &mut table)?;
//!     println!("removed {} rows", report.rows_removed);
//!     Exporter::export_to_dir(".", ExportFormat::Json, &table)?;
//!     Ok(())
//! }
//! ```

pub mod clean;
pub mod cli;
pub mod error;
pub mod load;
pub mod table;

pub use error::{Error, Result};
pub use table::Table;
