use actix_web::{App, http::StatusCode, test, web};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
use serde_json::Value;

use jobmatch::{
    api::{self, middleware::RequestId},
    app_state::AppState,
    config::Config,
    database::models::{category, skill},
};

fn state(db: DatabaseConnection) -> web::Data<AppState> {
    web::Data::new(AppState::new(db, Config::default()))
}

macro_rules! app {
    ($db:expr) => {
        test::init_service(
            App::new()
                .wrap(RequestId)
                .app_data(state($db))
                .app_data(api::json_config(1024 * 1024))
                .app_data(api::query_config())
                .app_data(api::path_config())
                .configure(api::configure),
        )
        .await
    };
}

#[actix_web::test]
async fn me_without_session_is_401_envelope() {
    let app = app!(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

    let resp = test::call_service(&app, test::TestRequest::get().uri("/api/user/me").to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key("x-request-id"));

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["status"], 401);
    assert_eq!(body["msg"], "Missing `sid` cookie");
}

#[actix_web::test]
async fn lists_skills_in_an_envelope() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![
            skill::Model { id: 1, name: "Welding".into() },
            skill::Model { id: 2, name: "Rust".into() },
        ]])
        .into_connection();
    let app = app!(db);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/api/skill").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["status"], 200);
    assert_eq!(body["data"][1]["name"], "Rust");
}

#[actix_web::test]
async fn lookup_mutations_need_a_session() {
    let app = app!(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

    let req = test::TestRequest::post()
        .uri("/api/category")
        .set_json(serde_json::json!({ "name": "Retail" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn missing_category_is_404_envelope() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<category::Model>::new()])
        .into_connection();
    let app = app!(db);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/api/category/42").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["msg"], "Category 42 not found");
}

#[actix_web::test]
async fn health_pings_the_database() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();
    let app = app!(db);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["database"], "up");
}

#[actix_web::test]
async fn malformed_json_is_400_envelope() {
    let app = app!(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

    let req = test::TestRequest::post()
        .uri("/api/user/login")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["status"], 400);
}

#[actix_web::test]
async fn bad_listing_query_is_a_validation_error() {
    let app = app!(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/post/job?salarySort=sideways").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"][0]["path"], "salarySort");
}
