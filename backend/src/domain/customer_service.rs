//! Customer CRUD orchestration service.
//!
//! Owns single-record behaviour: NIC conflict checks, city/country
//! resolution for addresses, family-link replacement, and detail reads.
//! Bulk ingestion has its own service; the two share the repository ports.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use crate::domain::DomainError;
use crate::domain::customer::{City, Customer, CustomerDraft, CustomerId, ExportCustomer};
use crate::domain::ports::{
    CustomerPage, CustomerPersistenceError, CustomerRepository, ReferencePersistenceError,
    ReferenceRepository,
};
use crate::domain::AddressDraft;

/// A new or replacement customer payload, already shape-validated by the
/// transport layer but not yet business-validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerInput {
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub nic_number: String,
    /// `None` leaves the stored set untouched on update.
    pub mobile_numbers: Option<Vec<String>>,
    /// `None` leaves the stored links untouched on update.
    pub family_member_ids: Option<Vec<CustomerId>>,
    /// `None` leaves the stored addresses untouched on update.
    pub addresses: Option<Vec<AddressInput>>,
}

/// An address payload carrying unresolved city/country names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressInput {
    pub line_one: String,
    pub line_two: Option<String>,
    pub city_name: String,
    pub country_name: String,
}

/// Domain service implementing single-record customer operations.
pub struct CustomerService<R, G> {
    customers: Arc<R>,
    references: Arc<G>,
}

impl<R, G> CustomerService<R, G>
where
    R: CustomerRepository,
    G: ReferenceRepository,
{
    /// Create a new service over the persistence ports.
    pub fn new(customers: Arc<R>, references: Arc<G>) -> Self {
        Self {
            customers,
            references,
        }
    }

    /// Create a customer with its collections; NIC must be unused.
    pub async fn create(&self, input: CustomerInput) -> Result<Customer, DomainError> {
        validate_input(&input)?;
        if self
            .customers
            .exists_by_nic(&input.nic_number)
            .await
            .map_err(map_customer_error)?
        {
            return Err(nic_conflict(&input.nic_number));
        }

        let family_member_ids = match &input.family_member_ids {
            Some(ids) => self.require_family_members(ids).await?,
            None => Vec::new(),
        };
        let addresses = self
            .resolve_addresses(input.addresses.as_deref().unwrap_or_default())
            .await?;

        let draft = CustomerDraft {
            name: input.name,
            date_of_birth: input.date_of_birth,
            nic_number: input.nic_number,
        };
        let id = self
            .customers
            .insert(
                &draft,
                input.mobile_numbers.as_deref().unwrap_or_default(),
                &family_member_ids,
                &addresses,
            )
            .await
            .map_err(map_customer_error)?;
        self.require(id).await
    }

    /// Replace a customer's core fields and any supplied collections.
    pub async fn update(
        &self,
        id: CustomerId,
        input: CustomerInput,
    ) -> Result<Customer, DomainError> {
        validate_input(&input)?;
        let existing = self.require(id).await?;

        if existing.nic_number != input.nic_number
            && self
                .customers
                .exists_by_nic(&input.nic_number)
                .await
                .map_err(map_customer_error)?
        {
            return Err(nic_conflict(&input.nic_number));
        }

        let draft = CustomerDraft {
            name: input.name,
            date_of_birth: input.date_of_birth,
            nic_number: input.nic_number,
        };
        self.customers
            .update_core(id, &draft)
            .await
            .map_err(map_customer_error)?;

        if let Some(numbers) = &input.mobile_numbers {
            self.customers
                .replace_mobile_numbers(id, numbers)
                .await
                .map_err(map_customer_error)?;
        }
        if let Some(ids) = &input.family_member_ids {
            // Unknown ids are skipped rather than rejected on update.
            let known = self.known_family_members(id, ids).await?;
            self.customers
                .replace_family_links(id, &known)
                .await
                .map_err(map_customer_error)?;
        }
        if let Some(addresses) = &input.addresses {
            let resolved = self.resolve_addresses(addresses).await?;
            self.customers
                .replace_addresses(id, &resolved)
                .await
                .map_err(map_customer_error)?;
        }
        self.require(id).await
    }

    /// Fetch one customer with full detail.
    pub async fn get(&self, id: CustomerId) -> Result<Customer, DomainError> {
        self.require(id).await
    }

    /// Fetch one page of customers.
    pub async fn list(&self, page: i64, per_page: i64) -> Result<CustomerPage, DomainError> {
        let per_page = per_page.clamp(1, 200);
        let offset = page.max(0) * per_page;
        self.customers
            .list(offset, per_page)
            .await
            .map_err(map_customer_error)
    }

    /// Delete a customer, cascading addresses and family links.
    pub async fn delete(&self, id: CustomerId) -> Result<(), DomainError> {
        let deleted = self
            .customers
            .delete(id)
            .await
            .map_err(map_customer_error)?;
        if deleted {
            Ok(())
        } else {
            Err(customer_not_found(id))
        }
    }

    /// Fetch every customer in export shape, ordered by id.
    pub async fn export(&self) -> Result<Vec<ExportCustomer>, DomainError> {
        self.customers
            .export_rows()
            .await
            .map_err(map_customer_error)
    }

    /// Resolve a (city, country) name pair to reference rows, creating
    /// missing rows idempotently.
    pub async fn resolve_city(
        &self,
        city_name: &str,
        country_name: &str,
    ) -> Result<City, DomainError> {
        if city_name.trim().is_empty() || country_name.trim().is_empty() {
            return Err(DomainError::invalid_request(
                "City and country names must be provided",
            ));
        }
        let country = self
            .references
            .get_or_create_country(country_name)
            .await
            .map_err(map_reference_error)?;
        self.references
            .get_or_create_city(city_name, &country)
            .await
            .map_err(map_reference_error)
    }

    async fn resolve_addresses(
        &self,
        inputs: &[AddressInput],
    ) -> Result<Vec<AddressDraft>, DomainError> {
        let mut drafts = Vec::with_capacity(inputs.len());
        for input in inputs {
            let city = self
                .resolve_city(&input.city_name, &input.country_name)
                .await?;
            drafts.push(AddressDraft {
                line_one: input.line_one.clone(),
                line_two: input.line_two.clone(),
                city_id: city.id,
            });
        }
        Ok(drafts)
    }

    /// On create, every family member must exist.
    async fn require_family_members(
        &self,
        ids: &[CustomerId],
    ) -> Result<Vec<CustomerId>, DomainError> {
        for &member in ids {
            if !self
                .customers
                .exists_by_id(member)
                .await
                .map_err(map_customer_error)?
            {
                return Err(DomainError::not_found(format!(
                    "Family member not found with id: {member}"
                )));
            }
        }
        Ok(ids.to_vec())
    }

    /// On update, unknown family ids (and self references) are dropped.
    async fn known_family_members(
        &self,
        own_id: CustomerId,
        ids: &[CustomerId],
    ) -> Result<Vec<CustomerId>, DomainError> {
        let mut known = Vec::with_capacity(ids.len());
        for &member in ids {
            if member == own_id {
                continue;
            }
            if self
                .customers
                .exists_by_id(member)
                .await
                .map_err(map_customer_error)?
            {
                known.push(member);
            }
        }
        Ok(known)
    }

    async fn require(&self, id: CustomerId) -> Result<Customer, DomainError> {
        self.customers
            .find_by_id(id)
            .await
            .map_err(map_customer_error)?
            .ok_or_else(|| customer_not_found(id))
    }
}

fn validate_input(input: &CustomerInput) -> Result<(), DomainError> {
    if input.name.trim().is_empty() {
        return Err(DomainError::invalid_request("Name is mandatory"));
    }
    if input.nic_number.trim().is_empty() {
        return Err(DomainError::invalid_request("NIC number is mandatory"));
    }
    if input.date_of_birth >= Utc::now().date_naive() {
        return Err(DomainError::invalid_request(
            "Date of birth must be in the past",
        ));
    }
    Ok(())
}

fn nic_conflict(nic: &str) -> DomainError {
    DomainError::conflict(format!("Customer with NIC {nic} already exists"))
}

fn customer_not_found(id: CustomerId) -> DomainError {
    DomainError::not_found(format!("Customer not found with id: {id}"))
}

fn map_customer_error(error: CustomerPersistenceError) -> DomainError {
    match error {
        CustomerPersistenceError::UniqueViolation { message } => {
            DomainError::conflict(format!("Duplicate customer record: {message}"))
        }
        other => DomainError::internal(other.to_string()),
    }
}

fn map_reference_error(error: ReferencePersistenceError) -> DomainError {
    DomainError::internal(error.to_string())
}

#[cfg(test)]
mod tests;
