use actix_web::{cookie::Cookie, http::StatusCode, HttpResponse};
use serde::Serialize;

/// Uniform response envelope used by every endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub status: u16,
    pub msg: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(status: StatusCode, msg: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            status: status.as_u16(),
            msg: msg.into(),
            data: Some(data),
        }
    }

    pub fn failure(status: StatusCode, msg: impl Into<String>, data: Option<T>) -> Self {
        Self {
            success: false,
            status: status.as_u16(),
            msg: msg.into(),
            data,
        }
    }
}

pub fn ok<T: Serialize>(msg: impl Into<String>, data: T) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success(StatusCode::OK, msg, data))
}

pub fn created<T: Serialize>(msg: impl Into<String>, data: T) -> HttpResponse {
    HttpResponse::Created().json(ApiResponse::success(StatusCode::CREATED, msg, data))
}

/// 200 envelope that also sets or clears a cookie.
pub fn ok_with_cookie<T: Serialize>(
    msg: impl Into<String>,
    data: T,
    cookie: Cookie<'static>,
) -> HttpResponse {
    HttpResponse::Ok()
        .cookie(cookie)
        .json(ApiResponse::success(StatusCode::OK, msg, data))
}
