//! Ports for decoding tabular uploads into raw rows.
//!
//! A [`WorkbookDecoder`] probes an uploaded payload and, when it recognises
//! a supported spreadsheet format, returns a lazy forward-only [`RowSource`]
//! over the first worksheet with the header row already skipped. The source
//! owns whatever handle the decode requires and releases it on drop.

use chrono::NaiveDate;

use super::define_port_error;

define_port_error! {
    /// Failures raised while opening or walking a row source.
    pub enum RowSourceError {
        /// The payload is not a recognised tabular format.
        Malformed { message: String } => "unrecognised spreadsheet payload: {message}",
        /// The underlying stream failed mid-sequence.
        Io { message: String } => "spreadsheet read failed: {message}",
    }
}

/// One untyped cell of a raw row.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Empty,
}

/// One raw data row: an ordered list of heterogeneous cells.
pub type SheetRow = Vec<CellValue>;

/// Lazy, forward-only, non-restartable sequence of data rows.
pub trait RowSource: Send {
    /// Yield the next data row, or `None` once the sheet is exhausted.
    fn next_row(&mut self) -> Result<Option<SheetRow>, RowSourceError>;
}

/// Format-probing opener for uploaded spreadsheet payloads.
#[cfg_attr(test, mockall::automock)]
pub trait WorkbookDecoder: Send + Sync {
    /// Open a payload and return its data rows (header already skipped).
    fn open(&self, payload: Vec<u8>) -> Result<Box<dyn RowSource>, RowSourceError>;
}

/// In-memory row source over pre-built rows; the test and fixture seam.
#[derive(Debug, Default)]
pub struct VecRowSource {
    rows: std::vec::IntoIter<SheetRow>,
    /// Error to surface after the prepared rows run out, for stream-failure
    /// scenarios.
    trailing_error: Option<RowSourceError>,
}

impl VecRowSource {
    /// Build a source yielding these rows then ending cleanly.
    pub fn new(rows: Vec<SheetRow>) -> Self {
        Self {
            rows: rows.into_iter(),
            trailing_error: None,
        }
    }

    /// Build a source yielding these rows then failing with `error`.
    pub fn failing_after(rows: Vec<SheetRow>, error: RowSourceError) -> Self {
        Self {
            rows: rows.into_iter(),
            trailing_error: Some(error),
        }
    }
}

impl RowSource for VecRowSource {
    fn next_row(&mut self) -> Result<Option<SheetRow>, RowSourceError> {
        match self.rows.next() {
            Some(row) => Ok(Some(row)),
            None => match self.trailing_error.take() {
                Some(error) => Err(error),
                None => Ok(None),
            },
        }
    }
}
