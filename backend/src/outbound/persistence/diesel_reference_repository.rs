//! Diesel-backed implementation of the reference data port.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{ReferencePersistenceError, ReferenceRepository};
use crate::domain::{City, Country};

use super::diesel_error::{map_reference_diesel_error, map_reference_pool_error};
use super::models::{CityRow, CountryRow, NewCityRow, NewCountryRow};
use super::pool::DbPool;
use super::schema::{cities, countries};

/// Reference data repository backed by PostgreSQL via Diesel.
///
/// Countries and cities are inserted with `ON CONFLICT DO NOTHING` and then
/// re-fetched, so concurrent callers racing on the same name both end up
/// with the surviving row.
#[derive(Clone)]
pub struct DieselReferenceRepository {
    pool: DbPool,
}

impl DieselReferenceRepository {
    /// Create a repository over the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

async fn fetch_country(
    conn: &mut AsyncPgConnection,
    name: &str,
) -> Result<CountryRow, diesel::result::Error> {
    countries::table
        .filter(countries::name.eq(name))
        .select(CountryRow::as_select())
        .first(conn)
        .await
}

async fn fetch_city(
    conn: &mut AsyncPgConnection,
    name: &str,
    country_id: i64,
) -> Result<CityRow, diesel::result::Error> {
    cities::table
        .filter(cities::name.eq(name))
        .filter(cities::country_id.eq(country_id))
        .select(CityRow::as_select())
        .first(conn)
        .await
}

#[async_trait]
impl ReferenceRepository for DieselReferenceRepository {
    async fn get_or_create_country(
        &self,
        name: &str,
    ) -> Result<Country, ReferencePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_reference_pool_error)?;
        diesel::insert_into(countries::table)
            .values(&NewCountryRow { name })
            .on_conflict(countries::name)
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_reference_diesel_error)?;
        let row = fetch_country(&mut conn, name)
            .await
            .map_err(map_reference_diesel_error)?;
        Ok(Country {
            id: row.id,
            name: row.name,
        })
    }

    async fn get_or_create_city(
        &self,
        name: &str,
        country: &Country,
    ) -> Result<City, ReferencePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_reference_pool_error)?;
        diesel::insert_into(cities::table)
            .values(&NewCityRow {
                name,
                country_id: country.id,
            })
            .on_conflict((cities::name, cities::country_id))
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_reference_diesel_error)?;
        let row = fetch_city(&mut conn, name, country.id)
            .await
            .map_err(map_reference_diesel_error)?;
        Ok(City {
            id: row.id,
            name: row.name,
            country: country.clone(),
        })
    }
}
