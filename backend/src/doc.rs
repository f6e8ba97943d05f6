//! OpenAPI documentation configuration.
//!
//! Registers every HTTP endpoint and the schemas their payloads reference.
//! The generated document is served at `/api/openapi.json` for external
//! tooling.

use utoipa::OpenApi;

/// OpenAPI document for the customer records API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Customer records API",
        description = "Customer administration with bulk spreadsheet ingestion and export."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::api::customers::create_customer,
        crate::api::customers::get_customer,
        crate::api::customers::list_customers,
        crate::api::customers::update_customer,
        crate::api::customers::delete_customer,
        crate::api::customers::bulk_upload,
        crate::api::customers::bulk_upload_status,
        crate::api::customers::export_customers,
        crate::api::health::healthz,
    ),
    components(schemas(
        crate::api::dto::CustomerDto,
        crate::api::dto::AddressDto,
        crate::api::dto::CustomerRequest,
        crate::api::dto::AddressRequest,
        crate::api::dto::CustomerPageDto,
        crate::api::dto::BulkUploadAccepted,
        crate::api::error::ApiError,
        crate::domain::ErrorCode,
        crate::domain::IngestionReport,
        crate::domain::JobSnapshot,
        crate::domain::JobStatus,
    ))
)]
pub struct ApiDoc;
