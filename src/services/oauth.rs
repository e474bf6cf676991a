use chrono::Utc;
use reqwest::Client;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set, TransactionTrait,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::validation::normalize_email;
use crate::database::models::{oauth_employer, oauth_job_seeker};
use crate::database::types::AccountRef;
use crate::errors::AppError;
use crate::services::accounts::Account;
use crate::services::approvals;

/// Subset of the Google userinfo document we keep in sync.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleProfile {
    pub sub: String,
    pub email: String,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub picture: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum OAuthKind {
    JobSeeker,
    Employer,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GoogleLoginRequest {
    pub kind: OAuthKind,
    pub access_token: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OAuthOutcome {
    /// First sign-in; the account waits for admin approval.
    Created(Account),
    Existing(Account),
}

#[derive(Clone)]
pub struct GoogleOAuthClient {
    client: Client,
    userinfo_url: String,
}

impl GoogleOAuthClient {
    pub fn new(userinfo_url: String) -> Self {
        Self {
            client: Client::new(),
            userinfo_url,
        }
    }

    pub async fn fetch_profile(&self, access_token: &str) -> Result<GoogleProfile, AppError> {
        let response = self
            .client
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .timeout(std::time::Duration::from_secs(10))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error reading response body".to_string());
            log::warn!("Google userinfo rejected token: {} - {}", status, error_text);
            return Err(AppError::Unauthorized(
                "Google rejected the access token".to_string(),
            ));
        }

        Ok(response.json::<GoogleProfile>().await?)
    }
}

fn split_names(profile: &GoogleProfile) -> (String, String) {
    let first = profile
        .given_name
        .clone()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| profile.email.split('@').next().unwrap_or_default().to_string());
    let last = profile.family_name.clone().unwrap_or_default();
    (first, last)
}

/// Creates the OAuth account on first sight, otherwise refreshes it from the profile.
/// Uploaded profile pictures are never overwritten by the Google one.
pub async fn sync_google_account(
    db: &DatabaseConnection,
    kind: OAuthKind,
    profile: GoogleProfile,
) -> Result<OAuthOutcome, AppError> {
    let (first_name, last_name) = split_names(&profile);
    let email = normalize_email(&profile.email);
    let now = Utc::now();

    match kind {
        OAuthKind::JobSeeker => {
            let existing = oauth_job_seeker::Entity::find()
                .filter(oauth_job_seeker::Column::GoogleId.eq(profile.sub.as_str()))
                .one(db)
                .await?;
            if let Some(model) = existing {
                let keep_picture = model.profile_picture.is_some();
                let mut active = model.into_active_model();
                active.email = Set(email);
                active.first_name = Set(first_name);
                active.last_name = Set(last_name);
                if !keep_picture {
                    active.profile_picture = Set(profile.picture);
                }
                active.updated_at = Set(now);
                return Ok(OAuthOutcome::Existing(Account::OAuthJobSeeker(
                    active.update(db).await?,
                )));
            }

            let txn = db.begin().await?;
            let account = oauth_job_seeker::ActiveModel {
                id: Set(Uuid::new_v4()),
                google_id: Set(profile.sub),
                email: Set(email),
                first_name: Set(first_name),
                last_name: Set(last_name),
                contact: Set(None),
                address: Set(None),
                description: Set(None),
                profile_picture: Set(profile.picture),
                resume: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await?;
            approvals::create_pending(&txn, AccountRef::OAuthJobSeeker(account.id)).await?;
            txn.commit().await?;

            log::info!("Google job seeker {} registered, awaiting approval", account.id);
            Ok(OAuthOutcome::Created(Account::OAuthJobSeeker(account)))
        }
        OAuthKind::Employer => {
            let existing = oauth_employer::Entity::find()
                .filter(oauth_employer::Column::GoogleId.eq(profile.sub.as_str()))
                .one(db)
                .await?;
            if let Some(model) = existing {
                let keep_picture = model.profile_picture.is_some();
                let mut active = model.into_active_model();
                active.email = Set(email);
                active.first_name = Set(first_name);
                active.last_name = Set(last_name);
                if !keep_picture {
                    active.profile_picture = Set(profile.picture);
                }
                active.updated_at = Set(now);
                return Ok(OAuthOutcome::Existing(Account::OAuthEmployer(
                    active.update(db).await?,
                )));
            }

            let txn = db.begin().await?;
            let account = oauth_employer::ActiveModel {
                id: Set(Uuid::new_v4()),
                google_id: Set(profile.sub),
                email: Set(email),
                first_name: Set(first_name),
                last_name: Set(last_name),
                contact: Set(None),
                position: Set(None),
                profile_picture: Set(profile.picture),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await?;
            approvals::create_pending(&txn, AccountRef::OAuthEmployer(account.id)).await?;
            txn.commit().await?;

            log::info!("Google employer {} registered, awaiting approval", account.id);
            Ok(OAuthOutcome::Created(Account::OAuthEmployer(account)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn profile() -> GoogleProfile {
        GoogleProfile {
            sub: "google-123".into(),
            email: "Lea@Example.com".into(),
            given_name: Some("Lea".into()),
            family_name: Some("Cruz".into()),
            picture: Some("https://lh3.googleusercontent.com/a.png".into()),
        }
    }

    #[test]
    fn falls_back_to_email_local_part() {
        let mut p = profile();
        p.given_name = None;
        p.family_name = None;
        assert_eq!(split_names(&p), ("Lea".to_string(), String::new()));
    }

    #[tokio::test]
    async fn existing_account_keeps_uploaded_picture() {
        let now = Utc::now();
        let stored = oauth_employer::Model {
            id: Uuid::new_v4(),
            google_id: "google-123".into(),
            email: "old@example.com".into(),
            first_name: "Old".into(),
            last_name: "Name".into(),
            contact: None,
            position: None,
            profile_picture: Some("http://local/uploads/me.png".into()),
            created_at: now,
            updated_at: now,
        };
        let synced = oauth_employer::Model {
            email: "lea@example.com".into(),
            first_name: "Lea".into(),
            last_name: "Cruz".into(),
            ..stored.clone()
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![stored]])
            .append_query_results([vec![synced.clone()]])
            .into_connection();

        let outcome = sync_google_account(&db, OAuthKind::Employer, profile()).await.unwrap();
        assert_eq!(outcome, OAuthOutcome::Existing(Account::OAuthEmployer(synced)));
    }
}
