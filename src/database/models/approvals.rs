use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    #[sea_orm(string_value = "UNAPPROVED")]
    Unapproved,
    #[sea_orm(string_value = "ACCEPTED")]
    Accepted,
    #[sea_orm(string_value = "DENIED")]
    Denied,
}

pub mod registration_approval {
    use super::*;
    use crate::database::types::AccountRef;
    use crate::errors::AppError;
    use sea_orm::Set;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, DeriveEntityModel, ToSchema)]
    #[sea_orm(table_name = "registration_approvals")]
    #[serde(rename_all = "camelCase")]
    #[schema(as = RegistrationApproval)]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub job_seeker_id: Option<Uuid>,
        pub employer_id: Option<Uuid>,
        pub company_id: Option<Uuid>,
        pub oauth_job_seeker_id: Option<Uuid>,
        pub oauth_employer_id: Option<Uuid>,
        pub status: ApprovalStatus,
        #[schema(value_type = String, format = DateTime)]
        pub created_at: DateTimeUtc,
        #[schema(value_type = String, format = DateTime)]
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "crate::database::models::accounts::job_seeker::Entity",
            from = "Column::JobSeekerId",
            to = "crate::database::models::accounts::job_seeker::Column::Id",
            on_delete = "Cascade"
        )]
        JobSeeker,
        #[sea_orm(
            belongs_to = "crate::database::models::accounts::employer::Entity",
            from = "Column::EmployerId",
            to = "crate::database::models::accounts::employer::Column::Id",
            on_delete = "Cascade"
        )]
        Employer,
        #[sea_orm(
            belongs_to = "crate::database::models::accounts::company::Entity",
            from = "Column::CompanyId",
            to = "crate::database::models::accounts::company::Column::Id",
            on_delete = "Cascade"
        )]
        Company,
        #[sea_orm(
            belongs_to = "crate::database::models::accounts::oauth_job_seeker::Entity",
            from = "Column::OauthJobSeekerId",
            to = "crate::database::models::accounts::oauth_job_seeker::Column::Id",
            on_delete = "Cascade"
        )]
        OAuthJobSeeker,
        #[sea_orm(
            belongs_to = "crate::database::models::accounts::oauth_employer::Entity",
            from = "Column::OauthEmployerId",
            to = "crate::database::models::accounts::oauth_employer::Column::Id",
            on_delete = "Cascade"
        )]
        OAuthEmployer,
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl Model {
        /// Resolves the foreign key set to the one account it points at.
        pub fn account(&self) -> Result<AccountRef, AppError> {
            let refs = [
                self.job_seeker_id.map(AccountRef::JobSeeker),
                self.employer_id.map(AccountRef::Employer),
                self.company_id.map(AccountRef::Company),
                self.oauth_job_seeker_id.map(AccountRef::OAuthJobSeeker),
                self.oauth_employer_id.map(AccountRef::OAuthEmployer),
            ];
            let mut set = refs.into_iter().flatten();
            match (set.next(), set.next()) {
                (Some(account), None) => Ok(account),
                _ => {
                    log::error!("approval {} does not reference exactly one account", self.id);
                    Err(AppError::Internal)
                }
            }
        }
    }

    /// Column that holds the given account's id.
    pub fn column_for(account: &AccountRef) -> Column {
        match account {
            AccountRef::JobSeeker(_) => Column::JobSeekerId,
            AccountRef::Employer(_) => Column::EmployerId,
            AccountRef::Company(_) => Column::CompanyId,
            AccountRef::OAuthJobSeeker(_) => Column::OauthJobSeekerId,
            AccountRef::OAuthEmployer(_) => Column::OauthEmployerId,
        }
    }

    impl ActiveModel {
        pub fn pending_for(account: AccountRef) -> Self {
            let now = chrono::Utc::now();
            let mut model = ActiveModel {
                id: Set(Uuid::new_v4()),
                job_seeker_id: Set(None),
                employer_id: Set(None),
                company_id: Set(None),
                oauth_job_seeker_id: Set(None),
                oauth_employer_id: Set(None),
                status: Set(ApprovalStatus::Unapproved),
                created_at: Set(now),
                updated_at: Set(now),
            };
            match account {
                AccountRef::JobSeeker(id) => model.job_seeker_id = Set(Some(id)),
                AccountRef::Employer(id) => model.employer_id = Set(Some(id)),
                AccountRef::Company(id) => model.company_id = Set(Some(id)),
                AccountRef::OAuthJobSeeker(id) => model.oauth_job_seeker_id = Set(Some(id)),
                AccountRef::OAuthEmployer(id) => model.oauth_employer_id = Set(Some(id)),
            }
            model
        }
    }
}

#[cfg(test)]
mod tests {
    use super::registration_approval::{self, ActiveModel};
    use super::*;
    use crate::database::types::AccountRef;

    fn row(job_seeker_id: Option<Uuid>, company_id: Option<Uuid>) -> registration_approval::Model {
        registration_approval::Model {
            id: Uuid::new_v4(),
            job_seeker_id,
            employer_id: None,
            company_id,
            oauth_job_seeker_id: None,
            oauth_employer_id: None,
            status: ApprovalStatus::Unapproved,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn resolves_single_reference() {
        let id = Uuid::new_v4();
        assert_eq!(row(None, Some(id)).account().unwrap(), AccountRef::Company(id));
    }

    #[test]
    fn rejects_zero_or_many_references() {
        assert!(row(None, None).account().is_err());
        assert!(row(Some(Uuid::new_v4()), Some(Uuid::new_v4())).account().is_err());
    }

    #[test]
    fn pending_row_sets_only_the_matching_column() {
        let id = Uuid::new_v4();
        let model = ActiveModel::pending_for(AccountRef::OAuthEmployer(id));
        assert_eq!(model.oauth_employer_id.clone().unwrap(), Some(id));
        assert_eq!(model.job_seeker_id.clone().unwrap(), None);
        assert_eq!(model.status.clone().unwrap(), ApprovalStatus::Unapproved);
    }
}
