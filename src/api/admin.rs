use actix_web::{HttpRequest, HttpResponse, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    api::{
        context::{ensure_admin_access, resolve_account_context, resolve_optional_context},
        response,
    },
    app_state::AppState,
    database::{
        models::{admin, ApprovalStatus},
        types::AccountKind,
    },
    errors::AppError,
    services::{
        accounts::{self, RegisterAdmin},
        approvals::{self, ApprovalDecision, ApprovalView, DecisionOutcome},
    },
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalsQuery {
    pub status: Option<ApprovalStatus>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DecisionRequest {
    pub status: ApprovalDecision,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RemovedAccount {
    pub kind: AccountKind,
    pub account_id: Uuid,
}

/// The first admin may register freely; afterwards only admins can add admins.
#[utoipa::path(
    post,
    path = "/api/admin/register",
    tag = "Admin",
    request_body = RegisterAdmin,
    responses(
        (status = 201, description = "Admin registered", body = admin::Model),
        (status = 400, description = "Validation failed or already used"),
        (status = 403, description = "Admin role required"),
    )
)]
#[post("/register")]
pub async fn register_admin(
    req: HttpRequest,
    app_state: web::Data<AppState>,
    body: web::Json<RegisterAdmin>,
) -> Result<HttpResponse, AppError> {
    if accounts::admin_count(&app_state.db).await? > 0 {
        let ctx = resolve_optional_context(&req, &app_state)
            .await?
            .ok_or_else(|| AppError::Forbidden("Admin role required".to_string()))?;
        ensure_admin_access(&ctx)?;
    }

    let account = accounts::register_admin(
        &app_state.db,
        body.into_inner(),
        app_state.config.effective_bcrypt_cost(),
    )
    .await?;
    Ok(response::created("Admin registered", account))
}

#[utoipa::path(
    get,
    path = "/api/admin/approvals",
    tag = "Admin",
    params(
        ("status" = Option<String>, Query, description = "UNAPPROVED, ACCEPTED or DENIED"),
    ),
    responses(
        (status = 200, description = "Registration approvals", body = [ApprovalView]),
        (status = 401, description = "Missing or expired session"),
        (status = 403, description = "Admin role required"),
    )
)]
#[get("/approvals")]
pub async fn list_approvals(
    req: HttpRequest,
    app_state: web::Data<AppState>,
    query: web::Query<ApprovalsQuery>,
) -> Result<HttpResponse, AppError> {
    let ctx = resolve_account_context(&req, &app_state).await?;
    ensure_admin_access(&ctx)?;

    let views = approvals::list(&app_state.db, query.into_inner().status).await?;
    Ok(response::ok("Registration approvals", views))
}

#[utoipa::path(
    patch,
    path = "/api/admin/approvals/{id}",
    tag = "Admin",
    params(
        ("id" = Uuid, Path, description = "Approval id"),
    ),
    request_body = DecisionRequest,
    responses(
        (status = 200, description = "Approval row when APPROVED, otherwise the removed account"),
        (status = 400, description = "Approval was already processed"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Approval not found"),
    )
)]
#[patch("/approvals/{id}")]
pub async fn decide_approval(
    req: HttpRequest,
    app_state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<DecisionRequest>,
) -> Result<HttpResponse, AppError> {
    let ctx = resolve_account_context(&req, &app_state).await?;
    ensure_admin_access(&ctx)?;

    match approvals::decide(&app_state.db, path.into_inner(), body.status).await? {
        DecisionOutcome::Accepted(approval) => Ok(response::ok("Account approved", approval)),
        DecisionOutcome::Removed(account) => Ok(response::ok(
            "Registration rejected and account removed",
            RemovedAccount {
                kind: account.kind(),
                account_id: account.id(),
            },
        )),
    }
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .service(register_admin)
            .service(list_approvals)
            .service(decide_approval),
    );
}
