//! Customer aggregate and its reference data.
//!
//! `Customer` owns its addresses (they are deleted with it) and holds
//! non-owning references to other customers as family members. Cities and
//! countries are shared reference data and are never deleted here.

use chrono::NaiveDate;

/// Surrogate identifier for a customer record.
pub type CustomerId = i64;
/// Surrogate identifier for an address record.
pub type AddressId = i64;
/// Surrogate identifier for a city record.
pub type CityId = i64;
/// Surrogate identifier for a country record.
pub type CountryId = i64;

/// A persisted customer with its full detail graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub date_of_birth: NaiveDate,
    /// Natural business key; globally unique.
    pub nic_number: String,
    /// Unordered, unique per customer.
    pub mobile_numbers: Vec<String>,
    /// Ids of family members; symmetric association.
    pub family_member_ids: Vec<CustomerId>,
    /// Ordered list of owned addresses.
    pub addresses: Vec<Address>,
}

/// An address owned by exactly one customer, referencing one city.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub id: AddressId,
    pub line_one: String,
    pub line_two: Option<String>,
    pub city: City,
}

/// A city, scoped to one country. Shared by many addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct City {
    pub id: CityId,
    pub name: String,
    pub country: Country,
}

/// A country with a globally unique name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Country {
    pub id: CountryId,
    pub name: String,
}

/// A validated customer record awaiting persistence.
///
/// Bulk ingestion produces drafts with no mobiles, family links, or
/// addresses; the single-record path fills the collections in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerDraft {
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub nic_number: String,
}

/// The flattened shape a customer takes in spreadsheet exports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportCustomer {
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub nic_number: String,
    pub mobile_numbers: Vec<String>,
}

/// A new address awaiting persistence, already resolved to a city.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressDraft {
    pub line_one: String,
    pub line_two: Option<String>,
    pub city_id: CityId,
}
