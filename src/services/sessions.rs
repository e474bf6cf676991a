use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use crate::database::models::session;
use crate::database::types::AccountKind;
use crate::errors::AppError;

pub async fn create_session(
    db: &DatabaseConnection,
    kind: AccountKind,
    account_id: Uuid,
    ttl_hours: i64,
) -> Result<session::Model, AppError> {
    let now = Utc::now();
    let session = session::ActiveModel {
        id: Set(Uuid::new_v4()),
        account_kind: Set(kind),
        account_id: Set(account_id),
        created_at: Set(now),
        expires_at: Set(now + Duration::hours(ttl_hours)),
    }
    .insert(db)
    .await?;

    log::debug!("Session opened for {} {}", kind, account_id);
    Ok(session)
}

/// Returns the live session for `sid`. Expired rows are removed on sight.
pub async fn find_active_session(
    db: &DatabaseConnection,
    sid: Uuid,
) -> Result<Option<session::Model>, AppError> {
    let Some(session) = session::Entity::find_by_id(sid).one(db).await? else {
        return Ok(None);
    };

    if session.is_expired(Utc::now()) {
        session::Entity::delete_by_id(sid).exec(db).await?;
        log::debug!("Session {} expired", sid);
        return Ok(None);
    }

    Ok(Some(session))
}

pub async fn delete_session(db: &DatabaseConnection, sid: Uuid) -> Result<(), AppError> {
    session::Entity::delete_by_id(sid).exec(db).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn session_row(expires_in_hours: i64) -> session::Model {
        let now = Utc::now();
        session::Model {
            id: Uuid::new_v4(),
            account_kind: AccountKind::Employer,
            account_id: Uuid::new_v4(),
            created_at: now,
            expires_at: now + Duration::hours(expires_in_hours),
        }
    }

    #[tokio::test]
    async fn live_session_is_returned() {
        let row = session_row(2);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row.clone()]])
            .into_connection();

        let found = find_active_session(&db, row.id).await.unwrap();
        assert_eq!(found, Some(row));
    }

    #[tokio::test]
    async fn expired_session_is_dropped() {
        let row = session_row(-1);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row.clone()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        assert_eq!(find_active_session(&db, row.id).await.unwrap(), None);
    }
}
