use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use uuid::Uuid;

use crate::{
    api::{context::resolve_account_context, response},
    app_state::AppState,
    errors::AppError,
    services::{
        post_query::{JobFindingPostQuery, JobPostQuery},
        posts::{
            self, JobFindingPostInput, JobFindingPostPage, JobFindingPostView, JobPostInput,
            JobPostPage, JobPostView,
        },
    },
};

// --- Job hiring posts ---

#[utoipa::path(
    get,
    path = "/api/post/job",
    tag = "Posts",
    params(
        ("page" = Option<u64>, Query, description = "1-based page number; pages hold 10 posts"),
        ("search" = Option<String>, Query, description = "Case-insensitive match on title or description"),
        ("location" = Option<String>, Query, description = "Case-insensitive location match"),
        ("category" = Option<String>, Query, description = "Category ids, repeated or comma separated"),
        ("minSalary" = Option<i64>, Query, description = "Lowest accepted salary"),
        ("maxSalary" = Option<i64>, Query, description = "Highest accepted salary"),
        ("salarySort" = Option<String>, Query, description = "`high-low` or `low-high`; wins over dateSort"),
        ("dateSort" = Option<String>, Query, description = "`newest` (default) or `oldest`"),
    ),
    responses(
        (status = 200, description = "A page of job posts", body = JobPostPage),
        (status = 400, description = "Malformed query parameter"),
    )
)]
#[get("/job")]
pub async fn list_job_posts(
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let query = JobPostQuery::from_query_string(req.query_string())?;
    let page = posts::list_job_posts(&app_state.db, &query).await?;
    Ok(response::ok("Job posts", page))
}

#[utoipa::path(
    get,
    path = "/api/post/job/{id}",
    tag = "Posts",
    params(("id" = Uuid, Path, description = "Job post id")),
    responses(
        (status = 200, description = "Job post found", body = JobPostView),
        (status = 404, description = "Job post not found"),
    )
)]
#[get("/job/{id}")]
pub async fn get_job_post(
    app_state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let post = posts::get_job_post(&app_state.db, path.into_inner()).await?;
    Ok(response::ok("Job post", post))
}

#[utoipa::path(
    post,
    path = "/api/post/job",
    tag = "Posts",
    request_body = JobPostInput,
    responses(
        (status = 201, description = "Job post published", body = JobPostView),
        (status = 400, description = "Validation failed or unknown skill/category"),
        (status = 401, description = "Missing or expired session"),
        (status = 403, description = "Only employers and companies can publish"),
    )
)]
#[post("/job")]
pub async fn create_job_post(
    req: HttpRequest,
    app_state: web::Data<AppState>,
    body: web::Json<JobPostInput>,
) -> Result<HttpResponse, AppError> {
    let ctx = resolve_account_context(&req, &app_state).await?;
    let post = posts::create_job_post(&app_state.db, &ctx.account, body.into_inner()).await?;
    Ok(response::created("Job post published", post))
}

#[utoipa::path(
    put,
    path = "/api/post/job/{id}",
    tag = "Posts",
    params(("id" = Uuid, Path, description = "Job post id")),
    request_body = JobPostInput,
    responses(
        (status = 200, description = "Job post updated", body = JobPostView),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Job post not found"),
    )
)]
#[put("/job/{id}")]
pub async fn update_job_post(
    req: HttpRequest,
    app_state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<JobPostInput>,
) -> Result<HttpResponse, AppError> {
    let ctx = resolve_account_context(&req, &app_state).await?;
    let post =
        posts::update_job_post(&app_state.db, &ctx.account, path.into_inner(), body.into_inner())
            .await?;
    Ok(response::ok("Job post updated", post))
}

#[utoipa::path(
    delete,
    path = "/api/post/job/{id}",
    tag = "Posts",
    params(("id" = Uuid, Path, description = "Job post id")),
    responses(
        (status = 200, description = "Job post deleted"),
        (status = 403, description = "Neither the owner nor an admin"),
        (status = 404, description = "Job post not found"),
    )
)]
#[delete("/job/{id}")]
pub async fn delete_job_post(
    req: HttpRequest,
    app_state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let ctx = resolve_account_context(&req, &app_state).await?;
    posts::delete_job_post(&app_state.db, &ctx.account, path.into_inner()).await?;
    Ok(response::ok("Job post deleted", ()))
}

// --- Job finding posts ---

#[utoipa::path(
    get,
    path = "/api/post/finding",
    tag = "Posts",
    params(
        ("page" = Option<u64>, Query, description = "1-based page number; pages hold 10 posts"),
        ("search" = Option<String>, Query, description = "Case-insensitive match on title or description"),
        ("dateSort" = Option<String>, Query, description = "`newest` (default) or `oldest`"),
    ),
    responses(
        (status = 200, description = "A page of job finding posts", body = JobFindingPostPage),
    )
)]
#[get("/finding")]
pub async fn list_finding_posts(
    app_state: web::Data<AppState>,
    query: web::Query<JobFindingPostQuery>,
) -> Result<HttpResponse, AppError> {
    let page = posts::list_finding_posts(&app_state.db, &query.into_inner()).await?;
    Ok(response::ok("Job finding posts", page))
}

#[utoipa::path(
    get,
    path = "/api/post/finding/{id}",
    tag = "Posts",
    params(("id" = Uuid, Path, description = "Job finding post id")),
    responses(
        (status = 200, description = "Job finding post found", body = JobFindingPostView),
        (status = 404, description = "Job finding post not found"),
    )
)]
#[get("/finding/{id}")]
pub async fn get_finding_post(
    app_state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let post = posts::get_finding_post(&app_state.db, path.into_inner()).await?;
    Ok(response::ok("Job finding post", post))
}

#[utoipa::path(
    post,
    path = "/api/post/finding",
    tag = "Posts",
    request_body = JobFindingPostInput,
    responses(
        (status = 201, description = "Job finding post published", body = JobFindingPostView),
        (status = 400, description = "Validation failed or unknown skill/category"),
        (status = 401, description = "Missing or expired session"),
        (status = 403, description = "Only job seekers can publish"),
    )
)]
#[post("/finding")]
pub async fn create_finding_post(
    req: HttpRequest,
    app_state: web::Data<AppState>,
    body: web::Json<JobFindingPostInput>,
) -> Result<HttpResponse, AppError> {
    let ctx = resolve_account_context(&req, &app_state).await?;
    let post = posts::create_finding_post(&app_state.db, &ctx.account, body.into_inner()).await?;
    Ok(response::created("Job finding post published", post))
}

#[utoipa::path(
    put,
    path = "/api/post/finding/{id}",
    tag = "Posts",
    params(("id" = Uuid, Path, description = "Job finding post id")),
    request_body = JobFindingPostInput,
    responses(
        (status = 200, description = "Job finding post updated", body = JobFindingPostView),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Job finding post not found"),
    )
)]
#[put("/finding/{id}")]
pub async fn update_finding_post(
    req: HttpRequest,
    app_state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<JobFindingPostInput>,
) -> Result<HttpResponse, AppError> {
    let ctx = resolve_account_context(&req, &app_state).await?;
    let post = posts::update_finding_post(
        &app_state.db,
        &ctx.account,
        path.into_inner(),
        body.into_inner(),
    )
    .await?;
    Ok(response::ok("Job finding post updated", post))
}

#[utoipa::path(
    delete,
    path = "/api/post/finding/{id}",
    tag = "Posts",
    params(("id" = Uuid, Path, description = "Job finding post id")),
    responses(
        (status = 200, description = "Job finding post deleted"),
        (status = 403, description = "Neither the owner nor an admin"),
        (status = 404, description = "Job finding post not found"),
    )
)]
#[delete("/finding/{id}")]
pub async fn delete_finding_post(
    req: HttpRequest,
    app_state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let ctx = resolve_account_context(&req, &app_state).await?;
    posts::delete_finding_post(&app_state.db, &ctx.account, path.into_inner()).await?;
    Ok(response::ok("Job finding post deleted", ()))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/post")
            .service(list_job_posts)
            .service(create_job_post)
            .service(get_job_post)
            .service(update_job_post)
            .service(delete_job_post)
            .service(list_finding_posts)
            .service(create_finding_post)
            .service(get_finding_post)
            .service(update_finding_post)
            .service(delete_finding_post),
    );
}
