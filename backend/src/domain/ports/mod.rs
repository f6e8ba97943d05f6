//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod customer_repository;
mod progress;
mod reference_repository;
mod row_source;

#[cfg(test)]
pub use customer_repository::MockCustomerRepository;
pub use customer_repository::{CustomerPage, CustomerPersistenceError, CustomerRepository};
#[cfg(test)]
pub use progress::MockIngestionProgress;
pub use progress::{IngestionProgress, TracingProgress};
#[cfg(test)]
pub use reference_repository::MockReferenceRepository;
pub use reference_repository::{ReferencePersistenceError, ReferenceRepository};
#[cfg(test)]
pub use row_source::MockWorkbookDecoder;
pub use row_source::{
    CellValue, RowSource, RowSourceError, SheetRow, VecRowSource, WorkbookDecoder,
};
