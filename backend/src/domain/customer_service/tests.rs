//! Tests for the customer CRUD service.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use chrono::NaiveDate;

use super::{AddressInput, CustomerInput, CustomerService};
use crate::domain::customer::{City, Country, Customer};
use crate::domain::ports::{
    MockCustomerRepository, MockReferenceRepository, ReferencePersistenceError, ReferenceRepository,
};
use crate::domain::ErrorCode;

fn dob() -> NaiveDate {
    NaiveDate::from_ymd_opt(1990, 5, 15).expect("valid date")
}

fn input(nic: &str) -> CustomerInput {
    CustomerInput {
        name: "John Doe".to_owned(),
        date_of_birth: dob(),
        nic_number: nic.to_owned(),
        mobile_numbers: None,
        family_member_ids: None,
        addresses: None,
    }
}

fn stored_customer(id: i64, nic: &str) -> Customer {
    Customer {
        id,
        name: "John Doe".to_owned(),
        date_of_birth: dob(),
        nic_number: nic.to_owned(),
        mobile_numbers: Vec::new(),
        family_member_ids: Vec::new(),
        addresses: Vec::new(),
    }
}

fn make_service(
    repo: MockCustomerRepository,
) -> CustomerService<MockCustomerRepository, MockReferenceRepository> {
    CustomerService::new(Arc::new(repo), Arc::new(MockReferenceRepository::new()))
}

#[tokio::test]
async fn create_persists_and_returns_the_stored_customer() {
    let mut repo = MockCustomerRepository::new();
    repo.expect_exists_by_nic()
        .times(1)
        .returning(|_| Ok(false));
    repo.expect_insert().times(1).returning(|_, _, _, _| Ok(7));
    repo.expect_find_by_id()
        .times(1)
        .returning(|id| Ok(Some(stored_customer(id, "N1"))));

    let created = make_service(repo).create(input("N1")).await.expect("created");
    assert_eq!(created.id, 7);
    assert_eq!(created.nic_number, "N1");
}

#[tokio::test]
async fn create_rejects_a_known_nic() {
    let mut repo = MockCustomerRepository::new();
    repo.expect_exists_by_nic().times(1).returning(|_| Ok(true));
    repo.expect_insert().times(0);

    let err = make_service(repo)
        .create(input("N1"))
        .await
        .expect_err("conflict");
    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(err.message(), "Customer with NIC N1 already exists");
}

#[tokio::test]
async fn create_validates_mandatory_fields_and_past_dob() {
    let service = make_service(MockCustomerRepository::new());

    let mut blank_name = input("N1");
    blank_name.name = "  ".to_owned();
    let err = service.create(blank_name).await.expect_err("blank name");
    assert_eq!(err.message(), "Name is mandatory");

    let mut blank_nic = input("N1");
    blank_nic.nic_number = String::new();
    let err = service.create(blank_nic).await.expect_err("blank nic");
    assert_eq!(err.message(), "NIC number is mandatory");

    let mut future_dob = input("N1");
    future_dob.date_of_birth = NaiveDate::from_ymd_opt(2999, 1, 1).expect("valid date");
    let err = service.create(future_dob).await.expect_err("future dob");
    assert_eq!(err.message(), "Date of birth must be in the past");
}

#[tokio::test]
async fn create_requires_every_family_member_to_exist() {
    let mut repo = MockCustomerRepository::new();
    repo.expect_exists_by_nic()
        .times(1)
        .returning(|_| Ok(false));
    repo.expect_exists_by_id()
        .times(1)
        .withf(|id| *id == 42)
        .returning(|_| Ok(false));
    repo.expect_insert().times(0);

    let mut payload = input("N1");
    payload.family_member_ids = Some(vec![42]);
    let err = make_service(repo)
        .create(payload)
        .await
        .expect_err("missing family member");
    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(err.message(), "Family member not found with id: 42");
}

#[tokio::test]
async fn update_of_an_unknown_customer_is_not_found() {
    let mut repo = MockCustomerRepository::new();
    repo.expect_find_by_id().times(1).returning(|_| Ok(None));

    let err = make_service(repo)
        .update(9, input("N1"))
        .await
        .expect_err("missing");
    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(err.message(), "Customer not found with id: 9");
}

#[tokio::test]
async fn update_with_unchanged_nic_skips_the_conflict_check() {
    let mut repo = MockCustomerRepository::new();
    repo.expect_find_by_id()
        .times(2)
        .returning(|id| Ok(Some(stored_customer(id, "N1"))));
    repo.expect_exists_by_nic().times(0);
    repo.expect_update_core().times(1).returning(|_, _| Ok(()));

    let updated = make_service(repo)
        .update(3, input("N1"))
        .await
        .expect("updated");
    assert_eq!(updated.id, 3);
}

#[tokio::test]
async fn update_to_a_taken_nic_is_a_conflict() {
    let mut repo = MockCustomerRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .returning(|id| Ok(Some(stored_customer(id, "N1"))));
    repo.expect_exists_by_nic().times(1).returning(|_| Ok(true));
    repo.expect_update_core().times(0);

    let err = make_service(repo)
        .update(3, input("N2"))
        .await
        .expect_err("conflict");
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn update_replaces_only_supplied_collections() {
    let mut repo = MockCustomerRepository::new();
    repo.expect_find_by_id()
        .times(2)
        .returning(|id| Ok(Some(stored_customer(id, "N1"))));
    repo.expect_update_core().times(1).returning(|_, _| Ok(()));
    repo.expect_replace_mobile_numbers()
        .times(1)
        .withf(|_, numbers| numbers == ["071"])
        .returning(|_, _| Ok(()));
    repo.expect_replace_family_links().times(0);
    repo.expect_replace_addresses().times(0);

    let mut payload = input("N1");
    payload.mobile_numbers = Some(vec!["071".to_owned()]);
    make_service(repo).update(3, payload).await.expect("updated");
}

#[tokio::test]
async fn update_drops_unknown_and_self_family_ids() {
    let mut repo = MockCustomerRepository::new();
    repo.expect_find_by_id()
        .times(2)
        .returning(|id| Ok(Some(stored_customer(id, "N1"))));
    repo.expect_update_core().times(1).returning(|_, _| Ok(()));
    repo.expect_exists_by_id()
        .withf(|id| *id == 2)
        .times(1)
        .returning(|_| Ok(true));
    repo.expect_exists_by_id()
        .withf(|id| *id == 5)
        .times(1)
        .returning(|_| Ok(false));
    repo.expect_replace_family_links()
        .times(1)
        .withf(|_, members| members == [2])
        .returning(|_, _| Ok(()));

    let mut payload = input("N1");
    // 3 is the customer's own id, 5 does not exist.
    payload.family_member_ids = Some(vec![2, 3, 5]);
    make_service(repo).update(3, payload).await.expect("updated");
}

#[tokio::test]
async fn delete_maps_missing_rows_to_not_found() {
    let mut repo = MockCustomerRepository::new();
    repo.expect_delete().times(1).returning(|_| Ok(true));
    make_service(repo).delete(1).await.expect("deleted");

    let mut repo = MockCustomerRepository::new();
    repo.expect_delete().times(1).returning(|_| Ok(false));
    let err = make_service(repo).delete(1).await.expect_err("missing");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn resolve_city_requires_both_names() {
    let service = make_service(MockCustomerRepository::new());
    let err = service
        .resolve_city("Springfield", "  ")
        .await
        .expect_err("blank country");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.message(), "City and country names must be provided");
}

/// In-memory reference store modelling the adapter's insert-or-fetch
/// contract, for resolver idempotence checks.
#[derive(Default)]
struct FakeReferenceRepository {
    countries: Mutex<Vec<Country>>,
    cities: Mutex<Vec<City>>,
}

#[async_trait]
impl ReferenceRepository for FakeReferenceRepository {
    async fn get_or_create_country(
        &self,
        name: &str,
    ) -> Result<Country, ReferencePersistenceError> {
        let mut countries = self
            .countries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = countries.iter().find(|c| c.name == name) {
            return Ok(existing.clone());
        }
        let created = Country {
            id: countries.len() as i64 + 1,
            name: name.to_owned(),
        };
        countries.push(created.clone());
        Ok(created)
    }

    async fn get_or_create_city(
        &self,
        name: &str,
        country: &Country,
    ) -> Result<City, ReferencePersistenceError> {
        let mut cities = self.cities.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = cities
            .iter()
            .find(|c| c.name == name && c.country.id == country.id)
        {
            return Ok(existing.clone());
        }
        let created = City {
            id: cities.len() as i64 + 1,
            name: name.to_owned(),
            country: country.clone(),
        };
        cities.push(created.clone());
        Ok(created)
    }
}

#[tokio::test]
async fn resolving_the_same_pair_twice_reuses_the_rows() {
    let references = Arc::new(FakeReferenceRepository::default());
    let service = CustomerService::new(
        Arc::new(MockCustomerRepository::new()),
        Arc::clone(&references),
    );

    let first = service
        .resolve_city("Springfield", "USA")
        .await
        .expect("resolved");
    let second = service
        .resolve_city("Springfield", "USA")
        .await
        .expect("resolved again");

    assert_eq!(first.id, second.id);
    let countries = references
        .countries
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    assert_eq!(countries.len(), 1, "never creates two Country rows for USA");
}

#[tokio::test]
async fn create_resolves_addresses_through_the_reference_store() {
    let mut repo = MockCustomerRepository::new();
    repo.expect_exists_by_nic()
        .times(1)
        .returning(|_| Ok(false));
    repo.expect_insert()
        .times(1)
        .withf(|_, _, _, addresses| addresses.len() == 1 && addresses[0].city_id == 1)
        .returning(|_, _, _, _| Ok(11));
    repo.expect_find_by_id()
        .times(1)
        .returning(|id| Ok(Some(stored_customer(id, "N1"))));

    let service = CustomerService::new(
        Arc::new(repo),
        Arc::new(FakeReferenceRepository::default()),
    );
    let mut payload = input("N1");
    payload.addresses = Some(vec![AddressInput {
        line_one: "12 Elm Street".to_owned(),
        line_two: None,
        city_name: "Springfield".to_owned(),
        country_name: "USA".to_owned(),
    }]);
    let created = service.create(payload).await.expect("created");
    assert_eq!(created.id, 11);
}
