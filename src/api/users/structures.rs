use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::database::models::ApprovalStatus;
use crate::database::types::AccountKind;
use crate::services::accounts::Account;

/// Returned by login; the session id itself only travels in the `sid` cookie.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub account: Account,
    pub expires_at: DateTime<Utc>,
}

/// Returned by every registration endpoint.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PendingRegistration {
    pub id: Uuid,
    pub kind: AccountKind,
    pub status: ApprovalStatus,
}

impl PendingRegistration {
    pub fn new(kind: AccountKind, id: Uuid) -> Self {
        Self {
            id,
            kind,
            status: ApprovalStatus::Unapproved,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub url: String,
    pub account: Account,
}

/// Multipart body of the upload endpoint.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}
