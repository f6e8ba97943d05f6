//! Shared Diesel error mapping for the persistence adapters.

use tracing::debug;

use crate::domain::ports::{CustomerPersistenceError, ReferencePersistenceError};

use super::pool::PoolError;

/// Map pool errors to customer repository errors.
pub(crate) fn map_customer_pool_error(error: PoolError) -> CustomerPersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            CustomerPersistenceError::connection(message)
        }
    }
}

/// Map Diesel errors to customer repository errors.
///
/// Unique-constraint violations get their own variant so callers can turn
/// them into conflicts instead of opaque query failures.
pub(crate) fn map_customer_diesel_error(error: diesel::result::Error) -> CustomerPersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    let message = error.to_string();
    debug!(%message, "customer diesel operation failed");
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            CustomerPersistenceError::unique_violation(info.message().to_owned())
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            CustomerPersistenceError::connection(message)
        }
        _ => CustomerPersistenceError::query(message),
    }
}

/// Map pool errors to reference repository errors.
pub(crate) fn map_reference_pool_error(error: PoolError) -> ReferencePersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            ReferencePersistenceError::connection(message)
        }
    }
}

/// Map Diesel errors to reference repository errors.
pub(crate) fn map_reference_diesel_error(
    error: diesel::result::Error,
) -> ReferencePersistenceError {
    let message = error.to_string();
    debug!(%message, "reference diesel operation failed");
    ReferencePersistenceError::query(message)
}
