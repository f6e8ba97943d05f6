//! Customer API handlers.

use std::sync::Arc;

use actix_multipart::form::MultipartForm;
use actix_multipart::form::bytes::Bytes as UploadedFile;
use actix_web::http::header;
use actix_web::{HttpResponse, delete, get, post, put, web};
use tracing::error;
use uuid::Uuid;

use crate::domain::{CustomerId, ErrorCode, JobSnapshot};
use crate::outbound::export::write_customer_workbook;

use super::dto::{
    BulkUploadAccepted, CustomerDto, CustomerPageDto, CustomerRequest, PageQuery,
};
use super::error::{ApiError, ApiResult};
use super::state::AppState;

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Create a customer.
#[utoipa::path(
    post,
    path = "/api/customers",
    request_body = CustomerRequest,
    responses(
        (status = 201, description = "Customer created", body = CustomerDto),
        (status = 400, description = "Invalid payload", body = ApiError),
        (status = 404, description = "Referenced family member missing", body = ApiError),
        (status = 409, description = "NIC number already registered", body = ApiError)
    ),
    tags = ["customers"],
    operation_id = "createCustomer"
)]
#[post("/api/customers")]
pub async fn create_customer(
    state: web::Data<AppState>,
    body: web::Json<CustomerRequest>,
) -> ApiResult<HttpResponse> {
    let customer = state.customers.create(body.into_inner().into()).await?;
    Ok(HttpResponse::Created().json(CustomerDto::from(customer)))
}

/// Fetch one customer with full detail.
#[utoipa::path(
    get,
    path = "/api/customers/{id}",
    params(("id" = i64, Path, description = "Customer identifier")),
    responses(
        (status = 200, description = "Customer", body = CustomerDto),
        (status = 404, description = "No such customer", body = ApiError)
    ),
    tags = ["customers"],
    operation_id = "getCustomer"
)]
#[get("/api/customers/{id}")]
pub async fn get_customer(
    state: web::Data<AppState>,
    path: web::Path<CustomerId>,
) -> ApiResult<web::Json<CustomerDto>> {
    let customer = state.customers.get(path.into_inner()).await?;
    Ok(web::Json(CustomerDto::from(customer)))
}

/// List customers one page at a time.
#[utoipa::path(
    get,
    path = "/api/customers",
    params(PageQuery),
    responses((status = 200, description = "One page of customers", body = CustomerPageDto)),
    tags = ["customers"],
    operation_id = "listCustomers"
)]
#[get("/api/customers")]
pub async fn list_customers(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<CustomerPageDto>> {
    let page = query.page.max(0);
    let per_page = query.per_page.clamp(1, 200);
    let result = state.customers.list(page, per_page).await?;
    Ok(web::Json(CustomerPageDto {
        customers: result
            .customers
            .into_iter()
            .map(CustomerDto::from)
            .collect(),
        total: result.total,
        page,
        per_page,
    }))
}

/// Replace a customer's core fields and any supplied collections.
#[utoipa::path(
    put,
    path = "/api/customers/{id}",
    params(("id" = i64, Path, description = "Customer identifier")),
    request_body = CustomerRequest,
    responses(
        (status = 200, description = "Customer updated", body = CustomerDto),
        (status = 400, description = "Invalid payload", body = ApiError),
        (status = 404, description = "No such customer", body = ApiError),
        (status = 409, description = "NIC number already registered", body = ApiError)
    ),
    tags = ["customers"],
    operation_id = "updateCustomer"
)]
#[put("/api/customers/{id}")]
pub async fn update_customer(
    state: web::Data<AppState>,
    path: web::Path<CustomerId>,
    body: web::Json<CustomerRequest>,
) -> ApiResult<web::Json<CustomerDto>> {
    let customer = state
        .customers
        .update(path.into_inner(), body.into_inner().into())
        .await?;
    Ok(web::Json(CustomerDto::from(customer)))
}

/// Delete a customer and everything hanging off it.
#[utoipa::path(
    delete,
    path = "/api/customers/{id}",
    params(("id" = i64, Path, description = "Customer identifier")),
    responses(
        (status = 204, description = "Customer deleted"),
        (status = 404, description = "No such customer", body = ApiError)
    ),
    tags = ["customers"],
    operation_id = "deleteCustomer"
)]
#[delete("/api/customers/{id}")]
pub async fn delete_customer(
    state: web::Data<AppState>,
    path: web::Path<CustomerId>,
) -> ApiResult<HttpResponse> {
    state.customers.delete(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Multipart payload for bulk uploads; the spreadsheet arrives as `file`.
#[derive(Debug, MultipartForm)]
pub struct UploadForm {
    #[multipart(rename = "file")]
    pub file: UploadedFile,
}

/// Accept a spreadsheet of customers for background ingestion.
///
/// Only emptiness and the file extension are checked before the 202;
/// decoding happens inside the job, so a payload that turns out not to be
/// a spreadsheet surfaces as a failed job, not a rejected request.
#[utoipa::path(
    post,
    path = "/api/customers/bulk-upload",
    request_body(content = Vec<u8>, content_type = "multipart/form-data"),
    responses(
        (status = 202, description = "Upload accepted", body = BulkUploadAccepted),
        (status = 400, description = "Empty or non-spreadsheet upload", body = ApiError)
    ),
    tags = ["customers"],
    operation_id = "bulkUploadCustomers"
)]
#[post("/api/customers/bulk-upload")]
pub async fn bulk_upload(
    state: web::Data<AppState>,
    MultipartForm(form): MultipartForm<UploadForm>,
) -> ApiResult<HttpResponse> {
    validate_upload(form.file.file_name.as_deref(), form.file.data.len())?;
    let payload = form.file.data.to_vec();
    let ingestion = Arc::clone(&state.ingestion);
    let decoder = Arc::clone(&state.decoder);
    let job_id = state
        .jobs
        .submit(async move { ingestion.ingest_payload(decoder.as_ref(), payload).await });
    Ok(HttpResponse::Accepted().json(BulkUploadAccepted {
        job_id,
        message: "File upload accepted for processing".to_owned(),
    }))
}

/// Report the current state of a bulk ingestion job.
#[utoipa::path(
    get,
    path = "/api/customers/bulk-upload/{job_id}",
    params(("job_id" = Uuid, Path, description = "Ingestion job identifier")),
    responses(
        (status = 200, description = "Job snapshot", body = JobSnapshot),
        (status = 404, description = "No such job", body = ApiError)
    ),
    tags = ["customers"],
    operation_id = "bulkUploadStatus"
)]
#[get("/api/customers/bulk-upload/{job_id}")]
pub async fn bulk_upload_status(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<JobSnapshot>> {
    let job_id = path.into_inner();
    state.jobs.snapshot(job_id).map(web::Json).ok_or_else(|| {
        ApiError::new(
            ErrorCode::NotFound,
            format!("Ingestion job not found with id: {job_id}"),
        )
    })
}

/// Download every customer as an XLSX workbook.
#[utoipa::path(
    get,
    path = "/api/customers/export",
    responses(
        (
            status = 200,
            description = "XLSX workbook",
            content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        ),
        (status = 500, description = "Export failed", body = ApiError)
    ),
    tags = ["customers"],
    operation_id = "exportCustomers"
)]
#[get("/api/customers/export")]
pub async fn export_customers(state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let rows = state.customers.export().await?;
    let payload = write_customer_workbook(&rows).map_err(|err| {
        error!(error = %err, "customer export failed");
        ApiError::new(ErrorCode::InternalError, err.to_string())
    })?;
    Ok(HttpResponse::Ok()
        .content_type(XLSX_CONTENT_TYPE)
        .insert_header((
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"customers.xlsx\"",
        ))
        .body(payload))
}

/// Reject uploads the background job could never process.
fn validate_upload(file_name: Option<&str>, size: usize) -> Result<(), ApiError> {
    if size == 0 {
        return Err(ApiError::new(
            ErrorCode::InvalidRequest,
            "Please upload a non-empty file",
        ));
    }
    let name = file_name.unwrap_or_default().to_ascii_lowercase();
    if !name.ends_with(".xls") && !name.ends_with(".xlsx") {
        return Err(ApiError::new(
            ErrorCode::InvalidRequest,
            "Please upload an Excel file (XLS or XLSX)",
        ));
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_uploads_are_rejected_first() {
        let error = validate_upload(Some("customers.xlsx"), 0).unwrap_err();
        assert_eq!(error.message(), "Please upload a non-empty file");
    }

    #[test]
    fn non_spreadsheet_extensions_are_rejected() {
        for name in [Some("customers.csv"), Some("customers"), None] {
            let error = validate_upload(name, 42).unwrap_err();
            assert_eq!(error.message(), "Please upload an Excel file (XLS or XLSX)");
            assert_eq!(error.code(), ErrorCode::InvalidRequest);
        }
    }

    #[test]
    fn both_spreadsheet_extensions_are_accepted() {
        assert!(validate_upload(Some("customers.xlsx"), 42).is_ok());
        assert!(validate_upload(Some("CUSTOMERS.XLS"), 42).is_ok());
    }
}
