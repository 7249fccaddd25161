//! Liveness endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::context::AppContext;

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub database: bool,
}

/// GET /health
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Server is up", body = HealthResponse))
)]
pub async fn health_check(State(ctx): State<AppContext>) -> Json<HealthResponse> {
    let database = hotelier_db::pool::get_conn(&ctx.db)
        .map(|conn| conn.execute_batch("SELECT 1").is_ok())
        .unwrap_or(false);

    Json(HealthResponse {
        status: if database { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        database,
    })
}
