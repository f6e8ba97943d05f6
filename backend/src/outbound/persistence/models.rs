//! Internal Diesel row structs for database operations.
//!
//! Implementation details of the persistence layer; never exposed to the
//! domain. They exist solely to satisfy Diesel's type requirements for
//! queries and mutations.

use chrono::NaiveDate;
use diesel::prelude::*;

use super::schema::{
    addresses, cities, countries, customer_mobile_numbers, customers, family_links,
};

/// Row struct for reading from the customers table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = customers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CustomerRow {
    pub id: i64,
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub nic_number: String,
}

/// Insertable struct for creating customer rows.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = customers)]
pub(crate) struct NewCustomerRow<'a> {
    pub name: &'a str,
    pub date_of_birth: NaiveDate,
    pub nic_number: &'a str,
}

/// Changeset struct for updating the customer core columns.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = customers)]
pub(crate) struct CustomerChangeset<'a> {
    pub name: &'a str,
    pub date_of_birth: NaiveDate,
    pub nic_number: &'a str,
}

/// Insertable struct for the mobile-number set.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = customer_mobile_numbers)]
pub(crate) struct NewMobileNumberRow<'a> {
    pub customer_id: i64,
    pub mobile_number: &'a str,
}

/// Insertable struct for canonical family edges.
#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = family_links)]
pub(crate) struct NewFamilyLinkRow {
    pub first_customer_id: i64,
    pub second_customer_id: i64,
}

/// Row struct for reading from the addresses table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = addresses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AddressRow {
    pub id: i64,
    #[expect(dead_code, reason = "owner id is implied by the query filter")]
    pub customer_id: i64,
    pub line_one: String,
    pub line_two: Option<String>,
    #[expect(dead_code, reason = "city arrives joined as a CityRow")]
    pub city_id: i64,
    #[expect(dead_code, reason = "ordering is applied in the query")]
    pub position: i32,
}

/// Insertable struct for address rows.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = addresses)]
pub(crate) struct NewAddressRow<'a> {
    pub customer_id: i64,
    pub line_one: &'a str,
    pub line_two: Option<&'a str>,
    pub city_id: i64,
    pub position: i32,
}

/// Row struct for reading from the cities table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = cities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CityRow {
    pub id: i64,
    pub name: String,
    #[expect(dead_code, reason = "country arrives joined as a CountryRow")]
    pub country_id: i64,
}

/// Insertable struct for city rows.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = cities)]
pub(crate) struct NewCityRow<'a> {
    pub name: &'a str,
    pub country_id: i64,
}

/// Row struct for reading from the countries table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = countries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CountryRow {
    pub id: i64,
    pub name: String,
}

/// Insertable struct for country rows.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = countries)]
pub(crate) struct NewCountryRow<'a> {
    pub name: &'a str,
}
