//! Spreadsheet reader for `.xls` and `.xlsx` workbooks.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use chrono::NaiveDateTime;

use super::cells::{build_table, Cell};
use super::{is_missing_marker, normalize_headers};
use crate::error::LoadError;
use crate::table::Table;

/// Read the first worksheet. Its first row holds the column names.
pub(super) fn read(path: &Path) -> Result<Table, LoadError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| LoadError::read(path, e))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| LoadError::read(path, "workbook has no worksheets"))?
        .map_err(|e| LoadError::read(path, e))?;

    let width = range.width();
    let mut rows = range.rows();

    let headers = match rows.next() {
        Some(header_row) => normalize_headers(header_row.iter().map(|c| c.to_string()).collect()),
        None => Vec::new(),
    };

    let mut columns: Vec<Vec<Cell>> = vec![Vec::new(); width];
    let mut row_count = 0;
    for row in rows {
        for (col_idx, data) in row.iter().enumerate() {
            columns[col_idx].push(to_cell(data));
        }
        row_count += 1;
    }

    tracing::debug!(rows = row_count, columns = width, "read worksheet");

    build_table(headers, columns, row_count, None).map_err(|e| LoadError::read(path, e))
}

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::Int(v) => Cell::Int(*v),
        Data::Float(v) => Cell::Float(*v),
        Data::Bool(v) => Cell::Bool(*v),
        Data::String(s) if is_missing_marker(s) => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::DateTime(dt) => dt.as_datetime().map_or(Cell::Empty, Cell::DateTime),
        Data::DateTimeIso(s) => s
            .parse::<NaiveDateTime>()
            .map_or_else(|_| Cell::Text(s.clone()), Cell::DateTime),
        Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Array, AsArray};
    use arrow::datatypes::{DataType, Int64Type, TimeUnit};
    use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
    use tempfile::tempdir;

    fn write_workbook(path: &Path) {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");

        worksheet.write_string(0, 0, "qty").unwrap();
        worksheet.write_string(0, 1, "label").unwrap();
        worksheet.write_string(0, 2, "when").unwrap();
        worksheet.write_string(0, 3, "").unwrap();

        worksheet.write_number(1, 0, 3).unwrap();
        worksheet.write_string(1, 1, "alpha").unwrap();
        let date = ExcelDateTime::from_ymd(2024, 3, 1).unwrap();
        worksheet.write_datetime_with_format(1, 2, &date, &date_format).unwrap();
        worksheet.write_boolean(1, 3, true).unwrap();

        worksheet.write_number(2, 0, 4).unwrap();
        worksheet.write_string(2, 1, "NA").unwrap();
        worksheet.write_boolean(2, 3, false).unwrap();

        workbook.save(path).unwrap();
    }

    #[test]
    fn test_read_first_sheet() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("book.xlsx");
        write_workbook(&path);

        let table = read(&path).unwrap();

        assert_eq!(table.num_rows(), 2);
        assert_eq!(
            table.column_names(),
            vec!["qty", "label", "when", "Unnamed: 3"]
        );

        let schema = table.schema();
        assert_eq!(schema.field(0).data_type(), &DataType::Int64);
        assert_eq!(schema.field(1).data_type(), &DataType::Utf8);
        assert_eq!(
            schema.field(2).data_type(),
            &DataType::Timestamp(TimeUnit::Nanosecond, None)
        );
        assert_eq!(schema.field(3).data_type(), &DataType::Boolean);

        assert_eq!(table.column(0).as_primitive::<Int64Type>().value(1), 4);
        // "NA" text and the blank date cell are both undefined
        assert!(table.column(1).is_null(1));
        assert!(table.column(2).is_null(1));
    }

    #[test]
    fn test_read_corrupt_workbook() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"not a zip archive").unwrap();

        assert!(matches!(read(&path), Err(LoadError::Read { .. })));
    }

    #[test]
    fn test_to_cell() {
        assert_eq!(to_cell(&Data::Empty), Cell::Empty);
        assert_eq!(to_cell(&Data::String("null".into())), Cell::Empty);
        assert_eq!(to_cell(&Data::String("x".into())), Cell::Text("x".into()));
        assert_eq!(to_cell(&Data::Float(1.5)), Cell::Float(1.5));
        assert!(matches!(
            to_cell(&Data::DateTimeIso("2024-01-02T03:04:05".into())),
            Cell::DateTime(_)
        ));
    }
}
