//! Port abstraction for customer persistence adapters and their errors.
//!
//! The repository owns the whole customer aggregate: the core row, the
//! mobile-number set, the symmetric family-link set, and the ordered
//! address list. Collection replacement methods swap the stored collection
//! wholesale inside one transaction.

use async_trait::async_trait;

use crate::domain::customer::{Customer, CustomerDraft, CustomerId};
use crate::domain::{AddressDraft, ExportCustomer};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by customer repository adapters.
    pub enum CustomerPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "customer repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "customer repository query failed: {message}",
        /// A uniqueness constraint rejected the write (NIC collision).
        UniqueViolation { message: String } =>
            "customer uniqueness constraint violated: {message}",
    }
}

/// A page of customers plus the total row count for pagination envelopes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerPage {
    pub customers: Vec<Customer>,
    pub total: u64,
}

/// Port for customer aggregate persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Persist a new customer with its collections in one transaction.
    async fn insert(
        &self,
        draft: &CustomerDraft,
        mobile_numbers: &[String],
        family_member_ids: &[CustomerId],
        addresses: &[AddressDraft],
    ) -> Result<CustomerId, CustomerPersistenceError>;

    /// Persist a batch of bare drafts (no collections) as one atomic write.
    ///
    /// Returns the number of rows inserted. The whole batch succeeds or
    /// fails together; callers must not assume partial application.
    async fn insert_batch(&self, drafts: &[CustomerDraft])
    -> Result<u64, CustomerPersistenceError>;

    /// Point-in-time check whether a NIC number is already persisted.
    async fn exists_by_nic(&self, nic_number: &str) -> Result<bool, CustomerPersistenceError>;

    /// Check whether a customer id exists.
    async fn exists_by_id(&self, id: CustomerId) -> Result<bool, CustomerPersistenceError>;

    /// Fetch a customer with full detail (mobiles, family ids, addresses).
    async fn find_by_id(&self, id: CustomerId)
    -> Result<Option<Customer>, CustomerPersistenceError>;

    /// Fetch a page of customers ordered by id.
    async fn list(&self, offset: i64, limit: i64)
    -> Result<CustomerPage, CustomerPersistenceError>;

    /// Update the core columns (name, date of birth, NIC).
    async fn update_core(
        &self,
        id: CustomerId,
        draft: &CustomerDraft,
    ) -> Result<(), CustomerPersistenceError>;

    /// Replace the mobile-number set.
    async fn replace_mobile_numbers(
        &self,
        id: CustomerId,
        numbers: &[String],
    ) -> Result<(), CustomerPersistenceError>;

    /// Replace the family-link set.
    ///
    /// Links are stored as canonical unordered pairs, so both directions of
    /// the association change atomically with this call.
    async fn replace_family_links(
        &self,
        id: CustomerId,
        family_member_ids: &[CustomerId],
    ) -> Result<(), CustomerPersistenceError>;

    /// Replace the ordered address list; removed addresses are deleted.
    async fn replace_addresses(
        &self,
        id: CustomerId,
        addresses: &[AddressDraft],
    ) -> Result<(), CustomerPersistenceError>;

    /// Delete a customer, its addresses, and every family link touching it.
    ///
    /// Returns `false` when the id was not present.
    async fn delete(&self, id: CustomerId) -> Result<bool, CustomerPersistenceError>;

    /// Fetch every customer in export shape, ordered by id.
    async fn export_rows(&self) -> Result<Vec<ExportCustomer>, CustomerPersistenceError>;
}
