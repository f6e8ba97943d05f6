//! Diesel-backed implementation of the customer repository port.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{CustomerPage, CustomerPersistenceError, CustomerRepository};
use crate::domain::{
    Address, AddressDraft, City, Country, Customer, CustomerDraft, CustomerId, ExportCustomer,
};

use super::diesel_error::{map_customer_diesel_error, map_customer_pool_error};
use super::models::{
    AddressRow, CityRow, CountryRow, CustomerChangeset, CustomerRow, NewAddressRow,
    NewCustomerRow, NewFamilyLinkRow, NewMobileNumberRow,
};
use super::pool::DbPool;
use super::schema::{addresses, cities, countries, customer_mobile_numbers, customers, family_links};

/// Customer repository backed by PostgreSQL via Diesel.
#[derive(Clone)]
pub struct DieselCustomerRepository {
    pool: DbPool,
}

impl DieselCustomerRepository {
    /// Create a repository over the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Family edges are stored once per pair with the smaller id first.
fn canonical_pair(a: CustomerId, b: CustomerId) -> NewFamilyLinkRow {
    NewFamilyLinkRow {
        first_customer_id: a.min(b),
        second_customer_id: a.max(b),
    }
}

fn family_link_rows(id: CustomerId, family_member_ids: &[CustomerId]) -> Vec<NewFamilyLinkRow> {
    let pairs: BTreeSet<(CustomerId, CustomerId)> = family_member_ids
        .iter()
        .filter(|other| **other != id)
        .map(|other| {
            let row = canonical_pair(id, *other);
            (row.first_customer_id, row.second_customer_id)
        })
        .collect();
    pairs
        .into_iter()
        .map(|(first, second)| NewFamilyLinkRow {
            first_customer_id: first,
            second_customer_id: second,
        })
        .collect()
}

fn mobile_number_rows<'a>(
    id: CustomerId,
    numbers: &'a [String],
) -> Vec<NewMobileNumberRow<'a>> {
    let unique: BTreeSet<&str> = numbers.iter().map(String::as_str).collect();
    unique
        .into_iter()
        .map(|number| NewMobileNumberRow {
            customer_id: id,
            mobile_number: number,
        })
        .collect()
}

fn address_rows<'a>(id: CustomerId, drafts: &'a [AddressDraft]) -> Vec<NewAddressRow<'a>> {
    drafts
        .iter()
        .enumerate()
        .map(|(index, draft)| NewAddressRow {
            customer_id: id,
            line_one: &draft.line_one,
            line_two: draft.line_two.as_deref(),
            city_id: draft.city_id,
            position: i32::try_from(index).unwrap_or(i32::MAX),
        })
        .collect()
}

async fn insert_mobile_numbers(
    conn: &mut AsyncPgConnection,
    id: CustomerId,
    numbers: &[String],
) -> Result<(), diesel::result::Error> {
    let rows = mobile_number_rows(id, numbers);
    if !rows.is_empty() {
        diesel::insert_into(customer_mobile_numbers::table)
            .values(&rows)
            .execute(conn)
            .await?;
    }
    Ok(())
}

async fn insert_family_links(
    conn: &mut AsyncPgConnection,
    id: CustomerId,
    family_member_ids: &[CustomerId],
) -> Result<(), diesel::result::Error> {
    let rows = family_link_rows(id, family_member_ids);
    if !rows.is_empty() {
        diesel::insert_into(family_links::table)
            .values(&rows)
            .on_conflict_do_nothing()
            .execute(conn)
            .await?;
    }
    Ok(())
}

async fn insert_addresses(
    conn: &mut AsyncPgConnection,
    id: CustomerId,
    drafts: &[AddressDraft],
) -> Result<(), diesel::result::Error> {
    let rows = address_rows(id, drafts);
    if !rows.is_empty() {
        diesel::insert_into(addresses::table)
            .values(&rows)
            .execute(conn)
            .await?;
    }
    Ok(())
}

/// A canonical edge names this customer on either side, so a load has to
/// merge partners found in both directions.
fn merge_family_ids(
    mut outgoing: Vec<CustomerId>,
    incoming: Vec<CustomerId>,
) -> Vec<CustomerId> {
    outgoing.extend(incoming);
    outgoing.sort_unstable();
    outgoing
}

async fn load_family_member_ids(
    conn: &mut AsyncPgConnection,
    id: CustomerId,
) -> Result<Vec<CustomerId>, diesel::result::Error> {
    let outgoing: Vec<CustomerId> = family_links::table
        .filter(family_links::first_customer_id.eq(id))
        .select(family_links::second_customer_id)
        .load(conn)
        .await?;
    let incoming: Vec<CustomerId> = family_links::table
        .filter(family_links::second_customer_id.eq(id))
        .select(family_links::first_customer_id)
        .load(conn)
        .await?;
    Ok(merge_family_ids(outgoing, incoming))
}

async fn load_mobile_numbers(
    conn: &mut AsyncPgConnection,
    id: CustomerId,
) -> Result<Vec<String>, diesel::result::Error> {
    customer_mobile_numbers::table
        .filter(customer_mobile_numbers::customer_id.eq(id))
        .order(customer_mobile_numbers::mobile_number.asc())
        .select(customer_mobile_numbers::mobile_number)
        .load(conn)
        .await
}

async fn load_addresses(
    conn: &mut AsyncPgConnection,
    id: CustomerId,
) -> Result<Vec<Address>, diesel::result::Error> {
    let rows: Vec<(AddressRow, CityRow, CountryRow)> = addresses::table
        .inner_join(cities::table.inner_join(countries::table))
        .filter(addresses::customer_id.eq(id))
        .order(addresses::position.asc())
        .select((
            AddressRow::as_select(),
            CityRow::as_select(),
            CountryRow::as_select(),
        ))
        .load(conn)
        .await?;
    Ok(rows
        .into_iter()
        .map(|(address, city, country)| Address {
            id: address.id,
            line_one: address.line_one,
            line_two: address.line_two,
            city: City {
                id: city.id,
                name: city.name,
                country: Country {
                    id: country.id,
                    name: country.name,
                },
            },
        })
        .collect())
}

/// Assemble a full customer aggregate from its core row.
async fn load_customer(
    conn: &mut AsyncPgConnection,
    row: CustomerRow,
) -> Result<Customer, diesel::result::Error> {
    let id = row.id;
    let mobile_numbers = load_mobile_numbers(conn, id).await?;
    let family_member_ids = load_family_member_ids(conn, id).await?;
    let customer_addresses = load_addresses(conn, id).await?;
    Ok(Customer {
        id,
        name: row.name,
        date_of_birth: row.date_of_birth,
        nic_number: row.nic_number,
        mobile_numbers,
        family_member_ids,
        addresses: customer_addresses,
    })
}

#[async_trait]
impl CustomerRepository for DieselCustomerRepository {
    async fn insert(
        &self,
        draft: &CustomerDraft,
        mobile_numbers: &[String],
        family_member_ids: &[CustomerId],
        addresses: &[AddressDraft],
    ) -> Result<CustomerId, CustomerPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_customer_pool_error)?;
        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                let new_row = NewCustomerRow {
                    name: &draft.name,
                    date_of_birth: draft.date_of_birth,
                    nic_number: &draft.nic_number,
                };
                let id: CustomerId = diesel::insert_into(customers::table)
                    .values(&new_row)
                    .returning(customers::id)
                    .get_result(conn)
                    .await?;
                insert_mobile_numbers(conn, id, mobile_numbers).await?;
                insert_family_links(conn, id, family_member_ids).await?;
                insert_addresses(conn, id, addresses).await?;
                Ok(id)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_customer_diesel_error)
    }

    async fn insert_batch(
        &self,
        drafts: &[CustomerDraft],
    ) -> Result<u64, CustomerPersistenceError> {
        if drafts.is_empty() {
            return Ok(0);
        }
        let mut conn = self.pool.get().await.map_err(map_customer_pool_error)?;
        let rows: Vec<NewCustomerRow<'_>> = drafts
            .iter()
            .map(|draft| NewCustomerRow {
                name: &draft.name,
                date_of_birth: draft.date_of_birth,
                nic_number: &draft.nic_number,
            })
            .collect();
        let inserted = diesel::insert_into(customers::table)
            .values(&rows)
            .execute(&mut conn)
            .await
            .map_err(map_customer_diesel_error)?;
        Ok(inserted as u64)
    }

    async fn exists_by_nic(&self, nic_number: &str) -> Result<bool, CustomerPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_customer_pool_error)?;
        diesel::select(diesel::dsl::exists(
            customers::table.filter(customers::nic_number.eq(nic_number)),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_customer_diesel_error)
    }

    async fn exists_by_id(&self, id: CustomerId) -> Result<bool, CustomerPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_customer_pool_error)?;
        diesel::select(diesel::dsl::exists(customers::table.find(id)))
            .get_result(&mut conn)
            .await
            .map_err(map_customer_diesel_error)
    }

    async fn find_by_id(
        &self,
        id: CustomerId,
    ) -> Result<Option<Customer>, CustomerPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_customer_pool_error)?;
        let row: Option<CustomerRow> = customers::table
            .find(id)
            .select(CustomerRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_customer_diesel_error)?;
        let Some(row) = row else {
            return Ok(None);
        };
        let customer = load_customer(&mut conn, row)
            .await
            .map_err(map_customer_diesel_error)?;
        Ok(Some(customer))
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<CustomerPage, CustomerPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_customer_pool_error)?;
        let total: i64 = customers::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_customer_diesel_error)?;
        let rows: Vec<CustomerRow> = customers::table
            .order(customers::id.asc())
            .offset(offset)
            .limit(limit)
            .select(CustomerRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_customer_diesel_error)?;
        let mut customers = Vec::with_capacity(rows.len());
        for row in rows {
            let customer = load_customer(&mut conn, row)
                .await
                .map_err(map_customer_diesel_error)?;
            customers.push(customer);
        }
        Ok(CustomerPage {
            customers,
            total: total.max(0) as u64,
        })
    }

    async fn update_core(
        &self,
        id: CustomerId,
        draft: &CustomerDraft,
    ) -> Result<(), CustomerPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_customer_pool_error)?;
        let changeset = CustomerChangeset {
            name: &draft.name,
            date_of_birth: draft.date_of_birth,
            nic_number: &draft.nic_number,
        };
        diesel::update(customers::table.find(id))
            .set(&changeset)
            .execute(&mut conn)
            .await
            .map_err(map_customer_diesel_error)?;
        Ok(())
    }

    async fn replace_mobile_numbers(
        &self,
        id: CustomerId,
        numbers: &[String],
    ) -> Result<(), CustomerPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_customer_pool_error)?;
        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                diesel::delete(
                    customer_mobile_numbers::table
                        .filter(customer_mobile_numbers::customer_id.eq(id)),
                )
                .execute(conn)
                .await?;
                insert_mobile_numbers(conn, id, numbers).await
            }
            .scope_boxed()
        })
        .await
        .map_err(map_customer_diesel_error)
    }

    async fn replace_family_links(
        &self,
        id: CustomerId,
        family_member_ids: &[CustomerId],
    ) -> Result<(), CustomerPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_customer_pool_error)?;
        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                diesel::delete(
                    family_links::table.filter(
                        family_links::first_customer_id
                            .eq(id)
                            .or(family_links::second_customer_id.eq(id)),
                    ),
                )
                .execute(conn)
                .await?;
                insert_family_links(conn, id, family_member_ids).await
            }
            .scope_boxed()
        })
        .await
        .map_err(map_customer_diesel_error)
    }

    async fn replace_addresses(
        &self,
        id: CustomerId,
        drafts: &[AddressDraft],
    ) -> Result<(), CustomerPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_customer_pool_error)?;
        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                diesel::delete(addresses::table.filter(addresses::customer_id.eq(id)))
                    .execute(conn)
                    .await?;
                insert_addresses(conn, id, drafts).await
            }
            .scope_boxed()
        })
        .await
        .map_err(map_customer_diesel_error)
    }

    async fn delete(&self, id: CustomerId) -> Result<bool, CustomerPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_customer_pool_error)?;
        // Dependent rows go with the customer via ON DELETE CASCADE.
        let deleted = diesel::delete(customers::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(map_customer_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn export_rows(&self) -> Result<Vec<ExportCustomer>, CustomerPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_customer_pool_error)?;
        let rows: Vec<CustomerRow> = customers::table
            .order(customers::id.asc())
            .select(CustomerRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_customer_diesel_error)?;
        let numbers: Vec<(CustomerId, String)> = customer_mobile_numbers::table
            .order((
                customer_mobile_numbers::customer_id.asc(),
                customer_mobile_numbers::mobile_number.asc(),
            ))
            .select((
                customer_mobile_numbers::customer_id,
                customer_mobile_numbers::mobile_number,
            ))
            .load(&mut conn)
            .await
            .map_err(map_customer_diesel_error)?;
        let mut grouped: HashMap<CustomerId, Vec<String>> = HashMap::new();
        for (customer_id, number) in numbers {
            grouped.entry(customer_id).or_default().push(number);
        }
        Ok(rows
            .into_iter()
            .map(|row| ExportCustomer {
                mobile_numbers: grouped.remove(&row.id).unwrap_or_default(),
                name: row.name,
                date_of_birth: row.date_of_birth,
                nic_number: row.nic_number,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_link_rows_canonicalise_and_deduplicate() {
        let rows = family_link_rows(5, &[9, 2, 9, 5]);
        let pairs: Vec<(i64, i64)> = rows
            .iter()
            .map(|row| (row.first_customer_id, row.second_customer_id))
            .collect();
        assert_eq!(pairs, vec![(2, 5), (5, 9)]);
    }

    #[test]
    fn links_are_visible_from_both_endpoints() {
        let rows = family_link_rows(5, &[9, 2]);

        // Select partners for an id the way the load splits the query: the
        // second column where the id is first, the first column where it is
        // second.
        let partners = |id: i64| {
            let outgoing: Vec<i64> = rows
                .iter()
                .filter(|row| row.first_customer_id == id)
                .map(|row| row.second_customer_id)
                .collect();
            let incoming: Vec<i64> = rows
                .iter()
                .filter(|row| row.second_customer_id == id)
                .map(|row| row.first_customer_id)
                .collect();
            merge_family_ids(outgoing, incoming)
        };

        assert_eq!(partners(5), vec![2, 9]);
        assert_eq!(partners(2), vec![5]);
        assert_eq!(partners(9), vec![5]);
    }

    #[test]
    fn mobile_number_rows_drop_duplicates() {
        let numbers = vec![
            "0711234567".to_owned(),
            "0777654321".to_owned(),
            "0711234567".to_owned(),
        ];
        let rows = mobile_number_rows(1, &numbers);
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn address_rows_keep_input_order_as_position() {
        let drafts = vec![
            AddressDraft {
                line_one: "12 High St".to_owned(),
                line_two: None,
                city_id: 3,
            },
            AddressDraft {
                line_one: "7 Low Rd".to_owned(),
                line_two: Some("Flat 2".to_owned()),
                city_id: 4,
            },
        ];
        let rows = address_rows(8, &drafts);
        assert_eq!(rows[0].position, 0);
        assert_eq!(rows[1].position, 1);
        assert_eq!(rows[1].line_two, Some("Flat 2"));
    }
}
