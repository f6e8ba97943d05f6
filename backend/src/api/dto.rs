//! Request and response payloads for the customer API.
//!
//! Wire types stay separate from the domain entities so serde attributes
//! and OpenAPI annotations never leak inward.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Address, AddressInput, Customer, CustomerId, CustomerInput};

/// A customer as returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDto {
    pub id: CustomerId,
    #[schema(example = "Alice Perera")]
    pub name: String,
    #[schema(example = "1990-03-14")]
    pub date_of_birth: NaiveDate,
    #[schema(example = "902345678V")]
    pub nic_number: String,
    pub mobile_numbers: Vec<String>,
    pub family_member_ids: Vec<CustomerId>,
    pub addresses: Vec<AddressDto>,
}

/// An address as returned by the API, with its city and country resolved.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddressDto {
    pub id: i64,
    #[schema(example = "12 High Street")]
    pub line_one: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_two: Option<String>,
    #[schema(example = "Colombo")]
    pub city: String,
    #[schema(example = "Sri Lanka")]
    pub country: String,
}

impl From<Customer> for CustomerDto {
    fn from(customer: Customer) -> Self {
        Self {
            id: customer.id,
            name: customer.name,
            date_of_birth: customer.date_of_birth,
            nic_number: customer.nic_number,
            mobile_numbers: customer.mobile_numbers,
            family_member_ids: customer.family_member_ids,
            addresses: customer.addresses.into_iter().map(AddressDto::from).collect(),
        }
    }
}

impl From<Address> for AddressDto {
    fn from(address: Address) -> Self {
        Self {
            id: address.id,
            line_one: address.line_one,
            line_two: address.line_two,
            city: address.city.name,
            country: address.city.country.name,
        }
    }
}

/// Payload for creating or updating a customer.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRequest {
    #[schema(example = "Alice Perera")]
    pub name: String,
    #[schema(example = "1990-03-14")]
    pub date_of_birth: NaiveDate,
    #[schema(example = "902345678V")]
    pub nic_number: String,
    /// Omit to leave the stored numbers untouched on update.
    #[serde(default)]
    pub mobile_numbers: Option<Vec<String>>,
    /// Omit to leave the stored links untouched on update.
    #[serde(default)]
    pub family_member_ids: Option<Vec<CustomerId>>,
    /// Omit to leave the stored addresses untouched on update.
    #[serde(default)]
    pub addresses: Option<Vec<AddressRequest>>,
}

/// Address payload carrying city and country by name.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddressRequest {
    pub line_one: String,
    #[serde(default)]
    pub line_two: Option<String>,
    #[schema(example = "Colombo")]
    pub city: String,
    #[schema(example = "Sri Lanka")]
    pub country: String,
}

impl From<CustomerRequest> for CustomerInput {
    fn from(request: CustomerRequest) -> Self {
        Self {
            name: request.name,
            date_of_birth: request.date_of_birth,
            nic_number: request.nic_number,
            mobile_numbers: request.mobile_numbers,
            family_member_ids: request.family_member_ids,
            addresses: request
                .addresses
                .map(|addresses| addresses.into_iter().map(AddressInput::from).collect()),
        }
    }
}

impl From<AddressRequest> for AddressInput {
    fn from(request: AddressRequest) -> Self {
        Self {
            line_one: request.line_one,
            line_two: request.line_two,
            city_name: request.city,
            country_name: request.country,
        }
    }
}

/// One page of customers.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPageDto {
    pub customers: Vec<CustomerDto>,
    /// Total matching records across all pages.
    pub total: u64,
    pub page: i64,
    pub per_page: i64,
}

/// Pagination query parameters.
#[derive(Debug, Clone, Copy, Deserialize, utoipa::IntoParams)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_per_page")]
    pub per_page: i64,
}

fn default_page() -> i64 {
    0
}

fn default_per_page() -> i64 {
    50
}

/// Acknowledgement returned when a bulk upload is accepted.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkUploadAccepted {
    pub job_id: Uuid,
    #[schema(example = "File upload accepted for processing")]
    pub message: String,
}
