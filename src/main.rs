use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, middleware, web};
use std::{env, io};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use jobmatch::{
    api::{self, docs::ApiDoc, middleware::RequestId},
    app_state::AppState,
    config::{Config, DatabaseSettings},
    database::{self, schema},
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env()
        .map_err(|e| io::Error::other(format!("Failed to load configuration: {}", e)))?;
    let db_url = env::var("DATABASE_URL")
        .map_err(|_| io::Error::other("DATABASE_URL must be set"))?;
    let db = database::connect_with_settings(&DatabaseSettings::default_from_url(db_url)).await?;

    if config.auto_migrate_enabled() {
        schema::create_all(&db).await.map_err(io::Error::other)?;
        log::info!("Database schema is up to date");
    }

    let upload_dir = config.effective_upload_dir();
    std::fs::create_dir_all(&upload_dir)?;

    let host = config.host.clone();
    let port = config.port;
    let max_body_bytes = config.effective_max_body_bytes();
    let cors_origin = config.cors_origin.clone();
    let state = web::Data::new(AppState::new(db, config));
    let openapi = ApiDoc::openapi();

    log::info!("Starting server at http://{}:{}", host, port);
    log::info!("Swagger UI available at http://{}:{}/api-docs/", host, port);

    HttpServer::new(move || {
        // Credentialed requests need an explicit origin for the `sid` cookie.
        let cors = match cors_origin.as_deref() {
            Some(origin) => Cors::default()
                .allowed_origin(origin)
                .allow_any_method()
                .allow_any_header()
                .supports_credentials(),
            None => Cors::permissive(),
        };

        App::new()
            .wrap(cors)
            .wrap(RequestId)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .app_data(api::json_config(max_body_bytes))
            .app_data(api::query_config())
            .app_data(api::path_config())
            .configure(api::configure)
            .service(Files::new("/uploads", upload_dir.clone()))
            .service(
                SwaggerUi::new("/api-docs/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone()),
            )
    })
    .workers(num_cpus::get())
    .bind((host, port))?
    .run()
    .await
}
