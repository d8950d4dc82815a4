//! Export functionality for cleaned tables.
//!
//! Every format is written to a fixed file name, `pycliner_output.<ext>`,
//! replacing any earlier output. Row labels are only written by the JSON
//! exporter, which keys each column's values by label.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::csv::WriterBuilder;
use arrow::datatypes::{
    DataType, Date32Type, Float64Type, Int64Type, TimeUnit, TimestampNanosecondType,
};
use arrow::util::display::{ArrayFormatter, FormatOptions};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use serde_json::{Map, Number, Value};

use crate::error::ExportError;
use crate::table::Table;

/// File stem shared by every output format.
pub const OUTPUT_STEM: &str = "pycliner_output";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Days between the Excel epoch (1899-12-30) and the Unix epoch.
const EXCEL_UNIX_EPOCH_DAYS: f64 = 25569.0;
const NANOS_PER_DAY: f64 = 86_400_000_000_000.0;

/// Export file formats, in menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values
    Csv,
    /// Excel workbook
    Xlsx,
    /// JSON object of columns keyed by row label
    Json,
    /// HTML table
    Html,
}

impl ExportFormat {
    /// All formats in menu order.
    pub const ALL: [ExportFormat; 4] = [
        ExportFormat::Csv,
        ExportFormat::Xlsx,
        ExportFormat::Json,
        ExportFormat::Html,
    ];

    /// Look up a format by its menu number (1-based).
    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            1 => Some(ExportFormat::Csv),
            2 => Some(ExportFormat::Xlsx),
            3 => Some(ExportFormat::Json),
            4 => Some(ExportFormat::Html),
            _ => None,
        }
    }

    /// Menu number (1-based).
    pub fn code(self) -> u64 {
        match self {
            ExportFormat::Csv => 1,
            ExportFormat::Xlsx => 2,
            ExportFormat::Json => 3,
            ExportFormat::Html => 4,
        }
    }

    /// File extension without the dot. Also used as the menu text.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Json => "json",
            ExportFormat::Html => "html",
        }
    }

    /// Fixed output file name for this format.
    pub fn file_name(self) -> String {
        format!("{OUTPUT_STEM}.{}", self.extension())
    }
}

/// Exports tables to various file formats.
pub struct Exporter;

impl Exporter {
    /// Export `table` into `dir` under the fixed file name for `format`.
    ///
    /// Returns the path written.
    pub fn export_to_dir<P: AsRef<Path>>(
        dir: P,
        format: ExportFormat,
        table: &Table,
    ) -> Result<PathBuf, ExportError> {
        let path = dir.as_ref().join(format.file_name());
        let rows = Self::export(&path, format, table)?;
        tracing::info!(path = %path.display(), ?format, rows, "exported table");
        Ok(path)
    }

    /// Export `table` to `path`. Returns the number of rows written.
    pub fn export<P: AsRef<Path>>(
        path: P,
        format: ExportFormat,
        table: &Table,
    ) -> Result<usize, ExportError> {
        let path = path.as_ref();

        match format {
            ExportFormat::Csv => Self::export_csv(path, table)?,
            ExportFormat::Xlsx => Self::export_xlsx(path, table)?,
            ExportFormat::Json => Self::export_json(path, table)?,
            ExportFormat::Html => Self::export_html(path, table)?,
        }

        Ok(table.num_rows())
    }

    /// Export to CSV with a header row and no index column.
    fn export_csv(path: &Path, table: &Table) -> Result<(), ExportError> {
        let file = File::create(path)?;

        let mut writer = WriterBuilder::new()
            .with_header(true)
            .with_timestamp_format(TIMESTAMP_FORMAT.to_string())
            .with_date_format(DATE_FORMAT.to_string())
            .build(BufWriter::new(file));
        writer.write(table.batch())?;

        writer.into_inner().flush()?;
        Ok(())
    }

    /// Export to a single-sheet workbook with a bold header row.
    fn export_xlsx(path: &Path, table: &Table) -> Result<(), ExportError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        let header_format = Format::new().set_bold();

        for (col_idx, field) in table.schema().fields().iter().enumerate() {
            let col = sheet_col(col_idx)?;
            worksheet.write_string_with_format(0, col, field.name(), &header_format)?;
            write_sheet_column(worksheet, col, table.column(col_idx))?;
        }

        workbook.save(path)?;
        Ok(())
    }

    /// Export to JSON: `{"column": {"label": value, ...}, ...}`.
    ///
    /// Timestamps and dates are written as milliseconds since the Unix epoch.
    fn export_json(path: &Path, table: &Table) -> Result<(), ExportError> {
        let labels: Vec<String> = table
            .index()
            .values()
            .iter()
            .map(|label| label.to_string())
            .collect();

        let mut root = Map::new();
        for (col_idx, field) in table.schema().fields().iter().enumerate() {
            let values = json_values(table.column(col_idx))?;
            let column: Map<String, Value> = labels.iter().cloned().zip(values).collect();
            root.insert(field.name().clone(), Value::Object(column));
        }

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &Value::Object(root))?;
        writer.flush()?;
        Ok(())
    }

    /// Export to an HTML table without an index column.
    fn export_html(path: &Path, table: &Table) -> Result<(), ExportError> {
        let formatters = table
            .batch()
            .columns()
            .iter()
            .map(|col| {
                let null = if col.data_type().is_temporal() {
                    "NaT"
                } else {
                    "NaN"
                };
                let options = FormatOptions::default()
                    .with_null(null)
                    .with_timestamp_format(Some(TIMESTAMP_FORMAT))
                    .with_date_format(Some(DATE_FORMAT));
                ArrayFormatter::try_new(col.as_ref(), &options)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        writeln!(writer, "<table border=\"1\" class=\"dataframe\">")?;
        writeln!(writer, "  <thead>")?;
        writeln!(writer, "    <tr style=\"text-align: right;\">")?;
        for field in table.schema().fields() {
            writeln!(writer, "      <th>{}</th>", escape_html(field.name()))?;
        }
        writeln!(writer, "    </tr>")?;
        writeln!(writer, "  </thead>")?;
        writeln!(writer, "  <tbody>")?;

        for row_idx in 0..table.num_rows() {
            writeln!(writer, "    <tr>")?;
            for formatter in &formatters {
                let value = formatter.value(row_idx).try_to_string()?;
                writeln!(writer, "      <td>{}</td>", escape_html(&value))?;
            }
            writeln!(writer, "    </tr>")?;
        }

        writeln!(writer, "  </tbody>")?;
        writeln!(writer, "</table>")?;

        writer.flush()?;
        Ok(())
    }
}

/// Worksheet row for data row `row_idx` (row 0 is the header).
fn sheet_row(row_idx: usize) -> Result<u32, ExportError> {
    u32::try_from(row_idx + 1)
        .map_err(|_| ExportError::Xlsx(format!("row {row_idx} exceeds the worksheet limit")))
}

fn sheet_col(col_idx: usize) -> Result<u16, ExportError> {
    u16::try_from(col_idx)
        .map_err(|_| ExportError::Xlsx(format!("column {col_idx} exceeds the worksheet limit")))
}

/// Write one column below its header. Undefined cells are left blank.
fn write_sheet_column(
    worksheet: &mut Worksheet,
    col: u16,
    column: &ArrayRef,
) -> Result<(), ExportError> {
    let data_type = column.data_type();

    match data_type {
        DataType::Boolean => {
            for (row_idx, value) in column.as_boolean().iter().enumerate() {
                if let Some(b) = value {
                    worksheet.write_boolean(sheet_row(row_idx)?, col, b)?;
                }
            }
        }
        DataType::Timestamp(_, _) => {
            let datetime_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");
            let nanos = cast(column, &DataType::Timestamp(TimeUnit::Nanosecond, None))?;
            for (row_idx, value) in nanos
                .as_primitive::<TimestampNanosecondType>()
                .iter()
                .enumerate()
            {
                if let Some(ns) = value {
                    let serial = ns as f64 / NANOS_PER_DAY + EXCEL_UNIX_EPOCH_DAYS;
                    worksheet.write_number_with_format(
                        sheet_row(row_idx)?,
                        col,
                        serial,
                        &datetime_format,
                    )?;
                }
            }
        }
        DataType::Date32 | DataType::Date64 => {
            let date_format = Format::new().set_num_format("yyyy-mm-dd");
            let days = cast(column, &DataType::Date32)?;
            for (row_idx, value) in days.as_primitive::<Date32Type>().iter().enumerate() {
                if let Some(d) = value {
                    let serial = f64::from(d) + EXCEL_UNIX_EPOCH_DAYS;
                    worksheet.write_number_with_format(
                        sheet_row(row_idx)?,
                        col,
                        serial,
                        &date_format,
                    )?;
                }
            }
        }
        dt if dt.is_numeric() => {
            let floats = cast(column, &DataType::Float64)?;
            for (row_idx, value) in floats.as_primitive::<Float64Type>().iter().enumerate() {
                if let Some(f) = value.filter(|f| f.is_finite()) {
                    worksheet.write_number(sheet_row(row_idx)?, col, f)?;
                }
            }
        }
        _ => {
            let formatter = ArrayFormatter::try_new(column.as_ref(), &FormatOptions::default())?;
            for row_idx in 0..column.len() {
                if column.is_valid(row_idx) {
                    let text = formatter.value(row_idx).try_to_string()?;
                    worksheet.write_string(sheet_row(row_idx)?, col, text)?;
                }
            }
        }
    }

    Ok(())
}

/// JSON scalar for every row of `column`; undefined cells are `null`.
fn json_values(column: &ArrayRef) -> Result<Vec<Value>, ExportError> {
    let data_type = column.data_type();

    let values: Vec<Value> = match data_type {
        DataType::Boolean => column
            .as_boolean()
            .iter()
            .map(|v| v.map_or(Value::Null, Value::Bool))
            .collect(),
        dt if dt.is_integer() => {
            let ints = cast(column, &DataType::Int64)?;
            ints.as_primitive::<Int64Type>()
                .iter()
                .map(|v| v.map_or(Value::Null, |i| Value::Number(i.into())))
                .collect()
        }
        dt if dt.is_numeric() => {
            let floats = cast(column, &DataType::Float64)?;
            floats
                .as_primitive::<Float64Type>()
                .iter()
                .map(|v| v.and_then(Number::from_f64).map_or(Value::Null, Value::Number))
                .collect()
        }
        DataType::Timestamp(_, _) => {
            let millis = cast(column, &DataType::Timestamp(TimeUnit::Millisecond, None))?;
            epoch_millis(&millis)?
        }
        DataType::Date32 | DataType::Date64 => {
            let millis = cast(column, &DataType::Date64)?;
            epoch_millis(&millis)?
        }
        _ => {
            let formatter = ArrayFormatter::try_new(column.as_ref(), &FormatOptions::default())?;
            (0..column.len())
                .map(|row_idx| {
                    if column.is_null(row_idx) {
                        Ok(Value::Null)
                    } else {
                        formatter.value(row_idx).try_to_string().map(Value::String)
                    }
                })
                .collect::<Result<Vec<_>, _>>()?
        }
    };

    Ok(values)
}

/// Millisecond temporal column as JSON integers.
fn epoch_millis(column: &ArrayRef) -> Result<Vec<Value>, ExportError> {
    let ints = cast(column, &DataType::Int64)?;
    Ok(ints
        .as_primitive::<Int64Type>()
        .iter()
        .map(|v| v.map_or(Value::Null, |ms| Value::Number(ms.into())))
        .collect())
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
