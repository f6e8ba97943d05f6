//! Port abstraction for shared city/country reference data.
//!
//! Both lookups are idempotent upserts: the adapter inserts with a
//! conflict-ignoring write and re-fetches, so repeated resolution of the
//! same name never creates duplicate rows, even across concurrent callers.

use async_trait::async_trait;

use crate::domain::customer::{City, Country};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by reference data adapters.
    pub enum ReferencePersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "reference repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "reference repository query failed: {message}",
    }
}

/// Port for get-or-create access to countries and cities.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReferenceRepository: Send + Sync {
    /// Return the country with this name, creating it if absent.
    async fn get_or_create_country(
        &self,
        name: &str,
    ) -> Result<Country, ReferencePersistenceError>;

    /// Return the city with this (name, country) pair, creating it if absent.
    async fn get_or_create_city(
        &self,
        name: &str,
        country: &Country,
    ) -> Result<City, ReferencePersistenceError>;
}
