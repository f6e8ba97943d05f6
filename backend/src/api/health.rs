//! Liveness probe for orchestration and load balancers.

use actix_web::{HttpResponse, get, http::header};

/// Liveness probe. Returns 200 whenever the process can serve requests;
/// database reachability is reported through request failures, not here.
#[utoipa::path(
    get,
    path = "/healthz",
    tags = ["health"],
    responses((status = 200, description = "Server is alive"))
)]
#[get("/healthz")]
pub async fn healthz() -> HttpResponse {
    HttpResponse::Ok()
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .finish()
}
