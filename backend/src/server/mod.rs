//! Server construction and route wiring.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_multipart::form::MultipartFormConfig;
use actix_web::dev::Server;
use actix_web::{App, HttpServer, web};
use utoipa::OpenApi;

use backend::api::{AppState, customers, health, state};
use backend::doc::ApiDoc;
use backend::domain::ports::TracingProgress;
use backend::domain::{BulkIngestionService, CustomerService, IngestionJobs};
use backend::outbound::persistence::{DbPool, DieselCustomerRepository, DieselReferenceRepository};
use backend::outbound::workbook::CalamineDecoder;

/// Uploads larger than this are rejected before reaching a handler.
const UPLOAD_LIMIT_BYTES: usize = 20 * 1024 * 1024;

/// Wire the services and adapters every handler shares.
pub fn build_state(pool: DbPool) -> AppState {
    let customer_repository = Arc::new(DieselCustomerRepository::new(pool.clone()));
    let reference_repository = Arc::new(DieselReferenceRepository::new(pool));
    let customers: Arc<state::Customers> = Arc::new(CustomerService::new(
        Arc::clone(&customer_repository),
        reference_repository,
    ));
    let ingestion: Arc<state::Ingestion> = Arc::new(BulkIngestionService::new(
        customer_repository,
        Arc::new(TracingProgress),
    ));
    AppState {
        customers,
        ingestion,
        decoder: Arc::new(CalamineDecoder),
        jobs: IngestionJobs::new(),
    }
}

/// Start the HTTP server on the configured address.
///
/// Static routes are registered ahead of the `{id}` routes so `export` and
/// `bulk-upload` never parse as customer identifiers.
pub fn run(config: &ServerConfig, app_state: AppState) -> std::io::Result<Server> {
    let data = web::Data::new(app_state);
    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .app_data(
                MultipartFormConfig::default()
                    .total_limit(UPLOAD_LIMIT_BYTES)
                    .memory_limit(UPLOAD_LIMIT_BYTES),
            )
            .service(health::healthz)
            .service(customers::export_customers)
            .service(customers::bulk_upload)
            .service(customers::bulk_upload_status)
            .service(customers::create_customer)
            .service(customers::list_customers)
            .service(customers::get_customer)
            .service(customers::update_customer)
            .service(customers::delete_customer)
            .route("/api/openapi.json", web::get().to(openapi_json))
    })
    .bind(config.bind_addr)?
    .run();
    Ok(server)
}

async fn openapi_json() -> web::Json<utoipa::openapi::OpenApi> {
    web::Json(ApiDoc::openapi())
}
