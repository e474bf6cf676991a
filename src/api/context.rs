use actix_web::cookie::{time, Cookie, SameSite};
use actix_web::{HttpRequest, web};
use uuid::Uuid;

use crate::{
    app_state::AppState,
    errors::AppError,
    services::{
        accounts::{self, Account},
        sessions,
    },
};

pub const SESSION_COOKIE: &str = "sid";

/// The signed-in account behind the `sid` cookie, freshly loaded from the database.
#[derive(Clone, Debug)]
pub struct AccountContext {
    pub session_id: Uuid,
    pub account: Account,
}

impl AccountContext {
    pub fn is_admin(&self) -> bool {
        self.account.is_admin()
    }
}

fn parse_session_cookie(req: &HttpRequest) -> Result<Uuid, AppError> {
    let cookie = req
        .cookie(SESSION_COOKIE)
        .ok_or_else(|| AppError::Unauthorized(format!("Missing `{}` cookie", SESSION_COOKIE)))?;

    Uuid::parse_str(cookie.value())
        .map_err(|_| AppError::Unauthorized(format!("Invalid `{}` cookie", SESSION_COOKIE)))
}

pub async fn resolve_account_context(
    req: &HttpRequest,
    app_state: &web::Data<AppState>,
) -> Result<AccountContext, AppError> {
    let session_id = parse_session_cookie(req)?;

    let session = sessions::find_active_session(&app_state.db, session_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Session expired".to_string()))?;

    let account = accounts::load_account(&app_state.db, session.account_kind, session.account_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Account no longer exists".to_string()))?;

    Ok(AccountContext {
        session_id,
        account,
    })
}

/// Like [`resolve_account_context`] but a missing cookie is not an error.
pub async fn resolve_optional_context(
    req: &HttpRequest,
    app_state: &web::Data<AppState>,
) -> Result<Option<AccountContext>, AppError> {
    if req.cookie(SESSION_COOKIE).is_none() {
        return Ok(None);
    }
    resolve_account_context(req, app_state).await.map(Some)
}

pub fn ensure_admin_access(ctx: &AccountContext) -> Result<(), AppError> {
    if ctx.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden("Admin role required".to_string()))
    }
}

pub fn session_cookie(session_id: Uuid, ttl_hours: i64) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, session_id.to_string())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::hours(ttl_hours))
        .finish()
}

pub fn expired_session_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(SESSION_COOKIE, "")
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish();
    cookie.make_removal();
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn session_cookie_is_http_only() {
        let id = Uuid::new_v4();
        let cookie = session_cookie(id, 2);
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), id.to_string());
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.max_age(), Some(time::Duration::hours(2)));

        let removal = expired_session_cookie();
        assert_eq!(removal.value(), "");
        assert_eq!(removal.max_age(), Some(time::Duration::ZERO));
    }

    #[test]
    fn garbage_cookie_is_unauthorized() {
        let req = TestRequest::default()
            .cookie(Cookie::new(SESSION_COOKIE, "not-a-uuid"))
            .to_http_request();
        assert!(matches!(
            parse_session_cookie(&req),
            Err(AppError::Unauthorized(_))
        ));

        let req = TestRequest::default().to_http_request();
        assert!(matches!(
            parse_session_cookie(&req),
            Err(AppError::Unauthorized(_))
        ));
    }
}
