//! PostgreSQL persistence adapters.
//!
//! Implements the domain's repository ports with Diesel over an async
//! connection pool. Row structs and the generated schema stay private to
//! this module; only the adapters and pool types are exported.

mod diesel_customer_repository;
mod diesel_error;
mod diesel_reference_repository;
mod models;
mod pool;
pub(crate) mod schema;

pub use diesel_customer_repository::DieselCustomerRepository;
pub use diesel_reference_repository::DieselReferenceRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
