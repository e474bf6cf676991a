use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, get, post, put, web};
use futures_util::StreamExt;

use crate::{
    api::{
        context::{
            expired_session_cookie, resolve_account_context, resolve_optional_context,
            session_cookie,
        },
        response,
    },
    app_state::AppState,
    database::types::AccountKind,
    errors::AppError,
    services::{
        accounts::{
            self, Account, ChangePassword, LoginRequest, ProfileUpdate, RegisterCompany,
            RegisterEmployer, RegisterJobSeeker,
        },
        approvals,
        oauth::{self, GoogleLoginRequest, OAuthOutcome},
        sessions,
        storage::{MAX_UPLOAD_BYTES, UploadTarget},
    },
};

use super::structures::{PendingRegistration, SessionInfo, UploadForm, UploadResult};

const AWAITING_APPROVAL: &str = "Registration received, awaiting admin approval";

/// Opens a session for `account` and answers with the `sid` cookie set.
async fn start_session(
    app_state: &web::Data<AppState>,
    account: Account,
) -> Result<HttpResponse, AppError> {
    let ttl_hours = app_state.config.effective_session_ttl_hours();
    let session =
        sessions::create_session(&app_state.db, account.kind(), account.id(), ttl_hours).await?;
    log::info!("{} {} logged in", account.kind(), account.id());

    Ok(response::ok_with_cookie(
        "Logged in",
        SessionInfo {
            account,
            expires_at: session.expires_at,
        },
        session_cookie(session.id, ttl_hours),
    ))
}

#[utoipa::path(
    post,
    path = "/api/user/register/job-seeker",
    tag = "Users",
    request_body = RegisterJobSeeker,
    responses(
        (status = 201, description = "Job seeker registered, awaiting approval", body = PendingRegistration),
        (status = 400, description = "Validation failed or email already used"),
    )
)]
#[post("/register/job-seeker")]
pub async fn register_job_seeker(
    app_state: web::Data<AppState>,
    body: web::Json<RegisterJobSeeker>,
) -> Result<HttpResponse, AppError> {
    let account = accounts::register_job_seeker(
        &app_state.db,
        body.into_inner(),
        app_state.config.effective_bcrypt_cost(),
    )
    .await?;
    Ok(response::created(
        AWAITING_APPROVAL,
        PendingRegistration::new(AccountKind::JobSeeker, account.id),
    ))
}

#[utoipa::path(
    post,
    path = "/api/user/register/employer",
    tag = "Users",
    request_body = RegisterEmployer,
    responses(
        (status = 201, description = "Employer registered, awaiting approval", body = PendingRegistration),
        (status = 400, description = "Validation failed or email already used"),
    )
)]
#[post("/register/employer")]
pub async fn register_employer(
    app_state: web::Data<AppState>,
    body: web::Json<RegisterEmployer>,
) -> Result<HttpResponse, AppError> {
    let account = accounts::register_employer(
        &app_state.db,
        body.into_inner(),
        app_state.config.effective_bcrypt_cost(),
    )
    .await?;
    Ok(response::created(
        AWAITING_APPROVAL,
        PendingRegistration::new(AccountKind::Employer, account.id),
    ))
}

#[utoipa::path(
    post,
    path = "/api/user/register/company",
    tag = "Users",
    request_body = RegisterCompany,
    responses(
        (status = 201, description = "Company registered, awaiting approval", body = PendingRegistration),
        (status = 400, description = "Validation failed, email or company name already used"),
    )
)]
#[post("/register/company")]
pub async fn register_company(
    app_state: web::Data<AppState>,
    body: web::Json<RegisterCompany>,
) -> Result<HttpResponse, AppError> {
    let account = accounts::register_company(
        &app_state.db,
        body.into_inner(),
        app_state.config.effective_bcrypt_cost(),
    )
    .await?;
    Ok(response::created(
        AWAITING_APPROVAL,
        PendingRegistration::new(AccountKind::Company, account.id),
    ))
}

#[utoipa::path(
    post,
    path = "/api/user/login",
    tag = "Users",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in; the `sid` cookie is set"),
        (status = 401, description = "Wrong password"),
        (status = 403, description = "Account is not yet approved"),
        (status = 404, description = "Account doesn't exist"),
    )
)]
#[post("/login")]
pub async fn login(
    app_state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let account = accounts::login(&app_state.db, body.into_inner()).await?;
    start_session(&app_state, account).await
}

#[utoipa::path(
    post,
    path = "/api/user/oauth/google",
    tag = "Users",
    request_body = GoogleLoginRequest,
    responses(
        (status = 200, description = "Logged in with Google; the `sid` cookie is set"),
        (status = 201, description = "Account created from the Google profile, awaiting approval", body = PendingRegistration),
        (status = 401, description = "Google rejected the access token"),
        (status = 403, description = "Account is not yet approved"),
    )
)]
#[post("/oauth/google")]
pub async fn google_login(
    app_state: web::Data<AppState>,
    body: web::Json<GoogleLoginRequest>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner();
    if request.access_token.trim().is_empty() {
        return Err(AppError::InvalidInput("accessToken is required".to_string()));
    }

    let profile = app_state.google.fetch_profile(request.access_token.trim()).await?;
    match oauth::sync_google_account(&app_state.db, request.kind, profile).await? {
        OAuthOutcome::Created(account) => Ok(response::created(
            AWAITING_APPROVAL,
            PendingRegistration::new(account.kind(), account.id()),
        )),
        OAuthOutcome::Existing(account) => {
            if let Some(account_ref) = account.account_ref() {
                approvals::ensure_accepted(&app_state.db, account_ref).await?;
            }
            start_session(&app_state, account).await
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/user/logout",
    tag = "Users",
    responses(
        (status = 200, description = "Session closed and cookie expired"),
    )
)]
#[post("/logout")]
pub async fn logout(
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    // An already expired or unknown session still gets its cookie cleared.
    if let Ok(Some(ctx)) = resolve_optional_context(&req, &app_state).await {
        sessions::delete_session(&app_state.db, ctx.session_id).await?;
        log::info!("{} {} logged out", ctx.account.kind(), ctx.account.id());
    }

    Ok(response::ok_with_cookie("Logged out", (), expired_session_cookie()))
}

#[utoipa::path(
    get,
    path = "/api/user/me",
    tag = "Users",
    responses(
        (status = 200, description = "The signed-in account"),
        (status = 401, description = "Missing or expired session"),
    )
)]
#[get("/me")]
pub async fn me(req: HttpRequest, app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let ctx = resolve_account_context(&req, &app_state).await?;
    Ok(response::ok("Current account", ctx.account))
}

#[utoipa::path(
    put,
    path = "/api/user/profile",
    tag = "Users",
    request_body = ProfileUpdate,
    responses(
        (status = 200, description = "Profile updated"),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Missing or expired session"),
    )
)]
#[put("/profile")]
pub async fn update_profile(
    req: HttpRequest,
    app_state: web::Data<AppState>,
    body: web::Json<ProfileUpdate>,
) -> Result<HttpResponse, AppError> {
    let ctx = resolve_account_context(&req, &app_state).await?;
    let account = accounts::update_profile(&app_state.db, ctx.account, body.into_inner()).await?;
    Ok(response::ok("Profile updated", account))
}

#[utoipa::path(
    put,
    path = "/api/user/password",
    tag = "Users",
    request_body = ChangePassword,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "Validation failed or Google account"),
        (status = 401, description = "Wrong current password or missing session"),
    )
)]
#[put("/password")]
pub async fn change_password(
    req: HttpRequest,
    app_state: web::Data<AppState>,
    body: web::Json<ChangePassword>,
) -> Result<HttpResponse, AppError> {
    let ctx = resolve_account_context(&req, &app_state).await?;
    let (kind, id) = (ctx.account.kind(), ctx.account.id());
    accounts::change_password(
        &app_state.db,
        ctx.account,
        body.into_inner(),
        app_state.config.effective_bcrypt_cost(),
    )
    .await?;
    log::info!("{} {} changed password", kind, id);
    Ok(response::ok("Password changed", ()))
}

/// Reads the `file` field of a multipart body, enforcing the upload size cap.
async fn read_file_field(mut payload: Multipart) -> Result<(String, Vec<u8>), AppError> {
    while let Some(field) = payload.next().await {
        let mut field = field
            .map_err(|e| AppError::InvalidInput(format!("Malformed multipart body: {}", e)))?;
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field
            .content_type()
            .map(|mime| mime.essence_str().to_string())
            .unwrap_or_default();
        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk
                .map_err(|e| AppError::InvalidInput(format!("Malformed multipart body: {}", e)))?;
            if bytes.len() + chunk.len() > MAX_UPLOAD_BYTES {
                return Err(AppError::InvalidInput(format!(
                    "File exceeds {} bytes",
                    MAX_UPLOAD_BYTES
                )));
            }
            bytes.extend_from_slice(&chunk);
        }
        return Ok((content_type, bytes));
    }

    Err(AppError::InvalidInput(
        "Multipart field `file` is required".to_string(),
    ))
}

#[utoipa::path(
    post,
    path = "/api/user/upload/{target}",
    tag = "Users",
    params(
        ("target" = String, Path, description = "`profile-picture` or `resume`"),
    ),
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File stored and its URL saved on the account"),
        (status = 400, description = "Unsupported type, empty or oversized file"),
        (status = 401, description = "Missing or expired session"),
    )
)]
#[post("/upload/{target}")]
pub async fn upload(
    req: HttpRequest,
    app_state: web::Data<AppState>,
    path: web::Path<String>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let target_slug = path.into_inner();
    let target = UploadTarget::from_slug(&target_slug).ok_or_else(|| {
        AppError::InvalidInput(format!("Unknown upload target: {}", target_slug))
    })?;

    let ctx = resolve_account_context(&req, &app_state).await?;
    let kind = ctx.account.kind();
    if !target.accepts(kind) {
        return Err(AppError::InvalidInput(format!(
            "{} accounts cannot upload a {}",
            kind, target
        )));
    }

    let (content_type, bytes) = read_file_field(payload).await?;
    let ext = target.validate(&content_type, bytes.len())?;
    let key = target.object_key(kind, ctx.account.id(), ext);
    let url = app_state.storage.put(&key, bytes, &content_type).await?;

    let account = accounts::set_upload_url(&app_state.db, ctx.account, target, url.clone()).await?;
    Ok(response::ok("File uploaded", UploadResult { url, account }))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/user")
            .service(register_job_seeker)
            .service(register_employer)
            .service(register_company)
            .service(login)
            .service(google_login)
            .service(logout)
            .service(me)
            .service(update_profile)
            .service(change_password)
            .service(upload),
    );
}
