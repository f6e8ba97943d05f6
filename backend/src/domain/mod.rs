//! Domain entities, ports, and services.
//!
//! Purpose: strongly typed customer aggregates and the orchestration
//! services over them, free of transport and persistence concerns.
//! Inbound adapters live in `api`, outbound adapters in `outbound`.

pub mod customer;
mod customer_service;
pub mod error;
pub mod ingestion;
pub mod ports;

pub use self::customer::{
    Address, AddressDraft, AddressId, City, CityId, Country, CountryId, Customer, CustomerDraft,
    CustomerId, ExportCustomer,
};
pub use self::customer_service::{AddressInput, CustomerInput, CustomerService};
pub use self::error::{DomainError, DomainErrorValidationError, ErrorCode};
pub use self::ingestion::{
    BulkIngestionService, IngestionJobs, IngestionOutcome, IngestionReport, JobSnapshot, JobStatus,
};
