//! Spreadsheet decoding via `calamine`.
//!
//! Probes the uploaded payload by content rather than trusting its file
//! name, so a renamed CSV is rejected up front instead of failing row by
//! row. Both the legacy binary format and the zip-based format are
//! accepted.

use std::io::Cursor;

use calamine::{Data, DataType, Range, Reader, open_workbook_auto_from_rs};

use crate::domain::ports::{CellValue, RowSource, RowSourceError, SheetRow, WorkbookDecoder};

/// Workbook decoder backed by `calamine`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalamineDecoder;

impl WorkbookDecoder for CalamineDecoder {
    fn open(&self, payload: Vec<u8>) -> Result<Box<dyn RowSource>, RowSourceError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(payload))
            .map_err(|err| RowSourceError::malformed(err.to_string()))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| RowSourceError::malformed("workbook has no worksheets"))?
            .map_err(|err| RowSourceError::malformed(err.to_string()))?;
        Ok(Box::new(RangeRowSource::new(range)))
    }
}

/// Forward-only cursor over a materialised worksheet range.
struct RangeRowSource {
    range: Range<Data>,
    // Index of the next row to yield; starts past the header row.
    next: usize,
}

impl RangeRowSource {
    fn new(range: Range<Data>) -> Self {
        Self { range, next: 1 }
    }
}

impl RowSource for RangeRowSource {
    fn next_row(&mut self) -> Result<Option<SheetRow>, RowSourceError> {
        let Some(cells) = self.range.rows().nth(self.next) else {
            return Ok(None);
        };
        self.next += 1;
        Ok(Some(cells.iter().map(convert_cell).collect()))
    }
}

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::String(text) => CellValue::Text(text.clone()),
        Data::Float(value) => CellValue::Number(*value),
        Data::Int(value) => CellValue::Number(*value as f64),
        Data::Bool(value) => CellValue::Text(value.to_string()),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_date()
            .map_or(CellValue::Empty, CellValue::Date),
        Data::DurationIso(_) | Data::Error(_) | Data::Empty => CellValue::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_xlsxwriter::Workbook;

    fn sample_workbook() -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Name").unwrap();
        sheet.write_string(0, 1, "Date of Birth").unwrap();
        sheet.write_string(0, 2, "NIC Number").unwrap();
        sheet.write_string(1, 0, "Alice Perera").unwrap();
        sheet.write_string(1, 1, "1990-03-14").unwrap();
        sheet.write_number(1, 2, 902_345_678.0).unwrap();
        sheet.write_string(2, 0, "Bob Silva").unwrap();
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn decodes_rows_and_skips_the_header() {
        let mut source = CalamineDecoder.open(sample_workbook()).unwrap();

        let first = source.next_row().unwrap().unwrap();
        assert_eq!(first[0], CellValue::Text("Alice Perera".into()));
        assert_eq!(first[1], CellValue::Text("1990-03-14".into()));
        assert_eq!(first[2], CellValue::Number(902_345_678.0));

        let second = source.next_row().unwrap().unwrap();
        assert_eq!(second[0], CellValue::Text("Bob Silva".into()));

        assert!(source.next_row().unwrap().is_none());
    }

    #[test]
    fn rejects_payloads_that_are_not_spreadsheets() {
        let result = CalamineDecoder.open(b"name,dob,nic\n".to_vec());
        assert!(matches!(result, Err(RowSourceError::Malformed { .. })));
    }

    #[test]
    fn header_only_sheets_yield_no_rows() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Name").unwrap();
        let payload = workbook.save_to_buffer().unwrap();

        let mut source = CalamineDecoder.open(payload).unwrap();
        assert!(source.next_row().unwrap().is_none());
    }

    #[test]
    fn empty_cells_convert_to_empty_values() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Name").unwrap();
        sheet.write_string(0, 2, "NIC Number").unwrap();
        sheet.write_string(1, 2, "851112223V").unwrap();
        let payload = workbook.save_to_buffer().unwrap();

        let mut source = CalamineDecoder.open(payload).unwrap();
        let row = source.next_row().unwrap().unwrap();
        assert_eq!(row[0], CellValue::Empty);
        assert_eq!(row[2], CellValue::Text("851112223V".into()));
    }

    #[test]
    fn date_conversion_keeps_the_calendar_day() {
        assert_eq!(
            convert_cell(&Data::DateTimeIso("1985-11-12T00:00:00".into())),
            CellValue::Date(NaiveDate::from_ymd_opt(1985, 11, 12).unwrap()),
        );
    }
}
