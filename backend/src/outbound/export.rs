//! Workbook export via `rust_xlsxwriter`.

use rust_xlsxwriter::{Workbook, XlsxError};
use thiserror::Error;

use crate::domain::ExportCustomer;

const HEADERS: [&str; 4] = ["Name", "Date of Birth", "NIC Number", "Mobile Numbers"];
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Failure while building the export workbook.
#[derive(Debug, Error)]
#[error("failed to build export workbook: {0}")]
pub struct ExportError(#[from] XlsxError);

/// Render customers to an XLSX workbook with a single `Customers` sheet.
///
/// Dates are written as `YYYY-MM-DD` text and mobile numbers joined with
/// `", "`, matching the upload format the ingestion pipeline accepts.
pub fn write_customer_workbook(customers: &[ExportCustomer]) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Customers")?;

    for (column, header) in HEADERS.iter().enumerate() {
        sheet.write_string(0, column as u16, *header)?;
    }
    for (index, customer) in customers.iter().enumerate() {
        let row = (index + 1) as u32;
        sheet.write_string(row, 0, &customer.name)?;
        sheet.write_string(row, 1, customer.date_of_birth.format(DATE_FORMAT).to_string())?;
        sheet.write_string(row, 2, &customer.nic_number)?;
        sheet.write_string(row, 3, customer.mobile_numbers.join(", "))?;
    }

    Ok(workbook.save_to_buffer()?)
}
