//! End-to-end bulk ingestion: a real workbook decoded and driven through
//! the pipeline against an in-memory repository.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use backend::domain::ports::{
    CustomerPage, CustomerPersistenceError, CustomerRepository, TracingProgress, WorkbookDecoder,
};
use backend::domain::{
    AddressDraft, BulkIngestionService, Customer, CustomerDraft, CustomerId, ExportCustomer,
    IngestionJobs, JobStatus,
};
use backend::outbound::workbook::CalamineDecoder;
use rust_xlsxwriter::Workbook;

/// Repository fake recording every flushed draft.
#[derive(Default)]
struct InMemoryCustomerRepository {
    existing_nics: HashSet<String>,
    inserted: Mutex<Vec<CustomerDraft>>,
}

impl InMemoryCustomerRepository {
    fn with_existing_nics(nics: &[&str]) -> Self {
        Self {
            existing_nics: nics.iter().map(|nic| (*nic).to_owned()).collect(),
            inserted: Mutex::new(Vec::new()),
        }
    }

    fn inserted(&self) -> Vec<CustomerDraft> {
        self.inserted.lock().unwrap().clone()
    }
}

#[async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
    async fn insert(
        &self,
        _draft: &CustomerDraft,
        _mobile_numbers: &[String],
        _family_member_ids: &[CustomerId],
        _addresses: &[AddressDraft],
    ) -> Result<CustomerId, CustomerPersistenceError> {
        unimplemented!("not exercised by ingestion")
    }

    async fn insert_batch(
        &self,
        drafts: &[CustomerDraft],
    ) -> Result<u64, CustomerPersistenceError> {
        let mut inserted = self.inserted.lock().unwrap();
        inserted.extend_from_slice(drafts);
        Ok(drafts.len() as u64)
    }

    async fn exists_by_nic(&self, nic_number: &str) -> Result<bool, CustomerPersistenceError> {
        if self.existing_nics.contains(nic_number) {
            return Ok(true);
        }
        let inserted = self.inserted.lock().unwrap();
        Ok(inserted.iter().any(|draft| draft.nic_number == nic_number))
    }

    async fn exists_by_id(&self, _id: CustomerId) -> Result<bool, CustomerPersistenceError> {
        unimplemented!("not exercised by ingestion")
    }

    async fn find_by_id(
        &self,
        _id: CustomerId,
    ) -> Result<Option<Customer>, CustomerPersistenceError> {
        unimplemented!("not exercised by ingestion")
    }

    async fn list(
        &self,
        _offset: i64,
        _limit: i64,
    ) -> Result<CustomerPage, CustomerPersistenceError> {
        unimplemented!("not exercised by ingestion")
    }

    async fn update_core(
        &self,
        _id: CustomerId,
        _draft: &CustomerDraft,
    ) -> Result<(), CustomerPersistenceError> {
        unimplemented!("not exercised by ingestion")
    }

    async fn replace_mobile_numbers(
        &self,
        _id: CustomerId,
        _numbers: &[String],
    ) -> Result<(), CustomerPersistenceError> {
        unimplemented!("not exercised by ingestion")
    }

    async fn replace_family_links(
        &self,
        _id: CustomerId,
        _family_member_ids: &[CustomerId],
    ) -> Result<(), CustomerPersistenceError> {
        unimplemented!("not exercised by ingestion")
    }

    async fn replace_addresses(
        &self,
        _id: CustomerId,
        _addresses: &[AddressDraft],
    ) -> Result<(), CustomerPersistenceError> {
        unimplemented!("not exercised by ingestion")
    }

    async fn delete(&self, _id: CustomerId) -> Result<bool, CustomerPersistenceError> {
        unimplemented!("not exercised by ingestion")
    }

    async fn export_rows(&self) -> Result<Vec<ExportCustomer>, CustomerPersistenceError> {
        unimplemented!("not exercised by ingestion")
    }
}

/// Rows are (name, date of birth, NIC); `None` leaves the cell blank.
fn build_workbook(rows: &[(Option<&str>, Option<&str>, Option<&str>)]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "Name").unwrap();
    sheet.write_string(0, 1, "Date of Birth").unwrap();
    sheet.write_string(0, 2, "NIC Number").unwrap();
    for (index, (name, dob, nic)) in rows.iter().enumerate() {
        let row = (index + 1) as u32;
        if let Some(name) = name {
            sheet.write_string(row, 0, *name).unwrap();
        }
        if let Some(dob) = dob {
            sheet.write_string(row, 1, *dob).unwrap();
        }
        if let Some(nic) = nic {
            sheet.write_string(row, 2, *nic).unwrap();
        }
    }
    workbook.save_to_buffer().unwrap()
}

async fn ingest(
    repository: Arc<InMemoryCustomerRepository>,
    payload: Vec<u8>,
) -> backend::domain::IngestionOutcome {
    let rows = CalamineDecoder.open(payload).unwrap();
    let service = BulkIngestionService::new(repository, Arc::new(TracingProgress));
    service.run(rows).await
}

#[tokio::test]
async fn a_clean_workbook_lands_every_row() {
    let repository = Arc::new(InMemoryCustomerRepository::default());
    let payload = build_workbook(&[
        (Some("Alice Perera"), Some("1990-03-14"), Some("902345678V")),
        (Some("Bob Silva"), Some("1985-11-12"), Some("851112223V")),
    ]);

    let outcome = ingest(Arc::clone(&repository), payload).await;

    assert!(outcome.completed);
    assert_eq!(outcome.report.total_processed, 2);
    assert_eq!(outcome.report.success_count, 2);
    assert!(outcome.report.errors.is_empty());
    assert!(outcome.report.job_errors.is_empty());

    let inserted = repository.inserted();
    assert_eq!(inserted.len(), 2);
    assert_eq!(inserted[0].name, "Alice Perera");
    assert_eq!(inserted[1].nic_number, "851112223V");
}

#[tokio::test]
async fn bad_rows_are_reported_and_skipped() {
    let repository = Arc::new(InMemoryCustomerRepository::default());
    let payload = build_workbook(&[
        (Some("Alice Perera"), Some("1990-03-14"), Some("902345678V")),
        (Some("No Nic"), Some("1970-01-02"), None),
        (Some("Bad Date"), Some("02/01/1970"), Some("700020123V")),
        (Some("Bob Silva"), Some("1985-11-12"), Some("851112223V")),
    ]);

    let outcome = ingest(Arc::clone(&repository), payload).await;

    assert!(outcome.completed);
    assert_eq!(outcome.report.total_processed, 4);
    assert_eq!(outcome.report.success_count, 2);
    assert_eq!(outcome.report.failure_count(), 2);
    assert_eq!(
        outcome.report.errors[0],
        "Error processing row 2: NIC number is mandatory",
    );
    assert_eq!(
        outcome.report.errors[1],
        "Error processing row 3: Invalid date format for date of birth. Use YYYY-MM-DD format",
    );
    assert_eq!(repository.inserted().len(), 2);
}

#[tokio::test]
async fn a_payload_that_is_not_a_spreadsheet_finishes_as_a_failed_job() {
    let repository = Arc::new(InMemoryCustomerRepository::default());
    let service = Arc::new(BulkIngestionService::new(
        Arc::clone(&repository),
        Arc::new(TracingProgress),
    ));
    let jobs = IngestionJobs::new();
    let payload = b"name,dob,nic\nAlice,1990-03-14,902345678V\n".to_vec();

    let job_id =
        jobs.submit(async move { service.ingest_payload(&CalamineDecoder, payload).await });
    let snapshot = jobs.wait(job_id).await.unwrap();

    assert_eq!(snapshot.status, JobStatus::Failed);
    let report = snapshot.report.unwrap();
    assert_eq!(report.total_processed, 0);
    assert_eq!(report.success_count, 0);
    assert!(report.errors.is_empty());
    assert_eq!(report.job_errors.len(), 1);
    assert!(report.job_errors[0].starts_with("Error processing file:"));
    assert!(repository.inserted().is_empty());
}

#[tokio::test]
async fn known_nic_numbers_are_rejected_per_row() {
    let repository = Arc::new(InMemoryCustomerRepository::with_existing_nics(&[
        "902345678V",
    ]));
    let payload = build_workbook(&[
        (Some("Alice Perera"), Some("1990-03-14"), Some("902345678V")),
        (Some("Bob Silva"), Some("1985-11-12"), Some("851112223V")),
    ]);

    let outcome = ingest(Arc::clone(&repository), payload).await;

    assert_eq!(outcome.report.success_count, 1);
    assert_eq!(
        outcome.report.errors[0],
        "Error processing row 1: Customer with NIC 902345678V already exists",
    );
}
