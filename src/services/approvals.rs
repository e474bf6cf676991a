use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::database::models::{
    company, employer, job_seeker, oauth_employer, oauth_job_seeker, registration_approval,
    ApprovalStatus,
};
use crate::database::types::{AccountKind, AccountRef};
use crate::errors::AppError;
use crate::services::accounts;

pub const NOT_APPROVED: &str = "Account is not yet approved";

/// What an admin asks for. `Approved` moves the row to ACCEPTED; the other
/// two discard the registration entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalDecision {
    Approved,
    Unapproved,
    Denied,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Accept,
    Remove,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DecisionOutcome {
    Accepted(registration_approval::Model),
    Removed(AccountRef),
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalView {
    pub id: Uuid,
    pub status: ApprovalStatus,
    pub kind: AccountKind,
    pub account_id: Uuid,
    pub display_name: Option<String>,
    pub email: Option<String>,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: chrono::DateTime<Utc>,
}

/// Only pending rows can be decided; ACCEPTED and DENIED are terminal.
pub fn transition(current: ApprovalStatus, decision: ApprovalDecision) -> Result<Transition, AppError> {
    if current != ApprovalStatus::Unapproved {
        return Err(AppError::InvalidInput(format!(
            "Registration was already processed ({:?})",
            current
        )));
    }
    Ok(match decision {
        ApprovalDecision::Approved => Transition::Accept,
        ApprovalDecision::Unapproved | ApprovalDecision::Denied => Transition::Remove,
    })
}

pub async fn create_pending<C>(conn: &C, account: AccountRef) -> Result<registration_approval::Model, AppError>
where
    C: ConnectionTrait,
{
    Ok(registration_approval::ActiveModel::pending_for(account)
        .insert(conn)
        .await?)
}

pub async fn find_for_account(
    db: &DatabaseConnection,
    account: AccountRef,
) -> Result<Option<registration_approval::Model>, AppError> {
    Ok(registration_approval::Entity::find()
        .filter(registration_approval::column_for(&account).eq(account.id()))
        .one(db)
        .await?)
}

/// Login gate: the account must have an ACCEPTED approval row.
pub async fn ensure_accepted(db: &DatabaseConnection, account: AccountRef) -> Result<(), AppError> {
    match find_for_account(db, account).await? {
        Some(approval) if approval.status == ApprovalStatus::Accepted => Ok(()),
        _ => Err(AppError::Forbidden(NOT_APPROVED.to_string())),
    }
}

async fn delete_account<C>(conn: &C, account: AccountRef) -> Result<(), AppError>
where
    C: ConnectionTrait,
{
    let result = match account {
        AccountRef::JobSeeker(id) => job_seeker::Entity::delete_by_id(id).exec(conn).await?,
        AccountRef::Employer(id) => employer::Entity::delete_by_id(id).exec(conn).await?,
        AccountRef::Company(id) => company::Entity::delete_by_id(id).exec(conn).await?,
        AccountRef::OAuthJobSeeker(id) => oauth_job_seeker::Entity::delete_by_id(id).exec(conn).await?,
        AccountRef::OAuthEmployer(id) => oauth_employer::Entity::delete_by_id(id).exec(conn).await?,
    };
    if result.rows_affected == 0 {
        log::warn!("{} {} was already gone", account.kind(), account.id());
    }
    Ok(())
}

pub async fn decide(
    db: &DatabaseConnection,
    approval_id: Uuid,
    decision: ApprovalDecision,
) -> Result<DecisionOutcome, AppError> {
    let approval = registration_approval::Entity::find_by_id(approval_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Approval {} not found", approval_id)))?;
    let account = approval.account()?;

    match transition(approval.status, decision)? {
        Transition::Accept => {
            let mut active = approval.into_active_model();
            active.status = Set(ApprovalStatus::Accepted);
            active.updated_at = Set(Utc::now());
            let updated = active.update(db).await?;
            log::info!("Approved {} {}", account.kind(), account.id());
            Ok(DecisionOutcome::Accepted(updated))
        }
        Transition::Remove => {
            let txn = db.begin().await?;
            registration_approval::Entity::delete_by_id(approval_id)
                .exec(&txn)
                .await?;
            delete_account(&txn, account).await?;
            txn.commit().await?;
            log::info!("Rejected and removed {} {}", account.kind(), account.id());
            Ok(DecisionOutcome::Removed(account))
        }
    }
}

pub async fn list(
    db: &DatabaseConnection,
    status: Option<ApprovalStatus>,
) -> Result<Vec<ApprovalView>, AppError> {
    let mut query = registration_approval::Entity::find()
        .order_by_asc(registration_approval::Column::CreatedAt);
    if let Some(status) = status {
        query = query.filter(registration_approval::Column::Status.eq(status));
    }

    let rows = query.all(db).await?;
    let mut views = Vec::with_capacity(rows.len());
    for row in rows {
        let account_ref = row.account()?;
        let account = accounts::load_account(db, account_ref.kind(), account_ref.id()).await?;
        views.push(ApprovalView {
            id: row.id,
            status: row.status,
            kind: account_ref.kind(),
            account_id: account_ref.id(),
            display_name: account.as_ref().map(|a| a.display_name()),
            email: account.as_ref().map(|a| a.email().to_string()),
            created_at: row.created_at,
        });
    }
    Ok(views)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn pending_employer(employer_id: Uuid) -> registration_approval::Model {
        registration_approval::Model {
            id: Uuid::new_v4(),
            job_seeker_id: None,
            employer_id: Some(employer_id),
            company_id: None,
            oauth_job_seeker_id: None,
            oauth_employer_id: None,
            status: ApprovalStatus::Unapproved,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn pending_rows_follow_the_decision() {
        assert_eq!(
            transition(ApprovalStatus::Unapproved, ApprovalDecision::Approved).unwrap(),
            Transition::Accept
        );
        assert_eq!(
            transition(ApprovalStatus::Unapproved, ApprovalDecision::Denied).unwrap(),
            Transition::Remove
        );
        assert_eq!(
            transition(ApprovalStatus::Unapproved, ApprovalDecision::Unapproved).unwrap(),
            Transition::Remove
        );
    }

    #[test]
    fn terminal_rows_cannot_be_decided_again() {
        assert!(transition(ApprovalStatus::Accepted, ApprovalDecision::Denied).is_err());
        assert!(transition(ApprovalStatus::Denied, ApprovalDecision::Approved).is_err());
    }

    #[tokio::test]
    async fn approving_makes_the_account_usable() {
        let employer_id = Uuid::new_v4();
        let pending = pending_employer(employer_id);
        let accepted = registration_approval::Model {
            status: ApprovalStatus::Accepted,
            ..pending.clone()
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![pending.clone()]])
            .append_query_results([vec![accepted.clone()]])
            .append_query_results([vec![accepted.clone()]])
            .into_connection();

        let outcome = decide(&db, pending.id, ApprovalDecision::Approved).await.unwrap();
        assert_eq!(outcome, DecisionOutcome::Accepted(accepted));
        assert!(ensure_accepted(&db, AccountRef::Employer(employer_id)).await.is_ok());
    }

    #[tokio::test]
    async fn denying_removes_the_account() {
        let employer_id = Uuid::new_v4();
        let pending = pending_employer(employer_id);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![pending.clone()]])
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
            ])
            .into_connection();

        let outcome = decide(&db, pending.id, ApprovalDecision::Denied).await.unwrap();
        assert_eq!(outcome, DecisionOutcome::Removed(AccountRef::Employer(employer_id)));
    }

    #[tokio::test]
    async fn missing_approval_row_blocks_login() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<registration_approval::Model>::new()])
            .into_connection();

        let err = ensure_accepted(&db, AccountRef::Company(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(ref m) if m == NOT_APPROVED));
    }
}
