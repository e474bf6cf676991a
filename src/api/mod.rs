pub mod admin;
pub mod context;
pub mod docs;
pub mod health;
pub mod lookups;
pub mod middleware;
pub mod posts;
pub mod response;
pub mod users;
pub mod validation;

use actix_web::web;

use crate::errors::AppError;

/// Mounts `/health` and everything under `/api`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(health::init_routes).service(
        web::scope("/api")
            .configure(users::init_routes)
            .configure(admin::init_routes)
            .configure(posts::init_routes)
            .configure(lookups::init_routes),
    );
}

/// Extractor failures are rendered through the same envelope as handler errors.
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| AppError::InvalidInput(format!("Invalid JSON body: {}", err)).into())
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::InvalidInput(format!("Invalid query: {}", err)).into())
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _req| AppError::InvalidInput(format!("Invalid path: {}", err)).into())
}
