//! Shared application state handed to the HTTP handlers.

use std::sync::Arc;

use crate::domain::ports::WorkbookDecoder;
use crate::domain::{BulkIngestionService, CustomerService, IngestionJobs};
use crate::outbound::persistence::{DieselCustomerRepository, DieselReferenceRepository};

/// The customer service as wired against PostgreSQL.
pub type Customers = CustomerService<DieselCustomerRepository, DieselReferenceRepository>;

/// The bulk ingestion service as wired against PostgreSQL.
pub type Ingestion = BulkIngestionService<DieselCustomerRepository>;

/// Everything a request handler can reach.
#[derive(Clone)]
pub struct AppState {
    pub customers: Arc<Customers>,
    pub ingestion: Arc<Ingestion>,
    pub decoder: Arc<dyn WorkbookDecoder>,
    pub jobs: IngestionJobs,
}
