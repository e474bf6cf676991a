use actix_web::{get, web, HttpResponse};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{api::response, app_state::AppState, database, errors::AppError};

#[derive(Serialize, ToSchema)]
pub struct HealthStatus {
    pub database: &'static str,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service and database are reachable", body = HealthStatus),
        (status = 500, description = "Database unreachable")
    )
)]
#[get("/health")]
pub async fn health(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    database::ping(&data.db).await?;
    Ok(response::ok("Healthy", HealthStatus { database: "up" }))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health);
}
