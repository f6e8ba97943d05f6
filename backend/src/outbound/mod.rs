//! Outbound adapters: implementations of the domain ports against real
//! infrastructure.

pub mod export;
pub mod persistence;
pub mod workbook;
