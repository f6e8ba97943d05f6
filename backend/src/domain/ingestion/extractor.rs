//! Row extraction: one raw row to a validated customer draft.
//!
//! Extraction is a pure function of a single row. Validation order is
//! fixed: name, NIC, (duplicate check, done by the orchestrator because it
//! needs the repository), then date of birth.

use chrono::NaiveDate;

use crate::domain::customer::CustomerDraft;
use crate::domain::ports::{CellValue, SheetRow};

/// Strict pattern for text date-of-birth cells.
const DATE_FORMAT: &str = "%Y-%m-%d";

const NAME_COLUMN: usize = 0;
const DOB_COLUMN: usize = 1;
const NIC_COLUMN: usize = 2;

/// A row-scoped extraction failure. Never aborts the job.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowError {
    #[error("Name is mandatory")]
    MissingName,
    #[error("NIC number is mandatory")]
    MissingNic,
    #[error("Customer with NIC {nic} already exists")]
    DuplicateNic { nic: String },
    #[error("Invalid date format for date of birth. Use YYYY-MM-DD format")]
    InvalidDate,
    /// The duplicate check itself failed; still row-scoped.
    #[error("NIC lookup failed: {message}")]
    NicLookup { message: String },
}

/// Mandatory fields of a row, with the date cell still unresolved.
#[derive(Debug, Clone, PartialEq)]
pub struct RowFields {
    pub name: String,
    pub nic_number: String,
    date_of_birth: CellValue,
}

impl RowFields {
    /// Finish extraction by resolving the date-of-birth cell.
    pub fn into_draft(self) -> Result<CustomerDraft, RowError> {
        let date_of_birth = parse_date_of_birth(&self.date_of_birth)?;
        Ok(CustomerDraft {
            name: self.name,
            date_of_birth,
            nic_number: self.nic_number,
        })
    }
}

/// Read and validate the mandatory name and NIC columns.
pub fn mandatory_fields(row: &SheetRow) -> Result<RowFields, RowError> {
    let name = cell_text(row.get(NAME_COLUMN)).ok_or(RowError::MissingName)?;
    let nic_number = cell_text(row.get(NIC_COLUMN)).ok_or(RowError::MissingNic)?;
    let date_of_birth = row.get(DOB_COLUMN).cloned().unwrap_or(CellValue::Empty);
    Ok(RowFields {
        name,
        nic_number,
        date_of_birth,
    })
}

/// Resolve a date-of-birth cell: date-typed cells convert directly, text
/// cells parse strictly against `YYYY-MM-DD`.
fn parse_date_of_birth(cell: &CellValue) -> Result<NaiveDate, RowError> {
    if let CellValue::Date(date) = cell {
        return Ok(*date);
    }
    let text = cell_text(Some(cell)).ok_or(RowError::InvalidDate)?;
    NaiveDate::parse_from_str(&text, DATE_FORMAT).map_err(|_| RowError::InvalidDate)
}

/// Coerce a cell to non-blank text.
///
/// Numeric cells take their integer text form (NIC columns arrive as
/// numbers from some producers); date cells render as `YYYY-MM-DD`.
fn cell_text(cell: Option<&CellValue>) -> Option<String> {
    let text = match cell? {
        CellValue::Text(text) => text.trim().to_owned(),
        CellValue::Number(value) => format!("{}", value.trunc() as i64),
        CellValue::Date(date) => date.format(DATE_FORMAT).to_string(),
        CellValue::Empty => return None,
    };
    if text.is_empty() { None } else { Some(text) }
}
