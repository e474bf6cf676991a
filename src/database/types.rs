use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// --- Account kinds ---
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(24))")]
pub enum AccountKind {
    #[sea_orm(string_value = "job_seeker")]
    #[serde(rename = "jobSeeker")]
    JobSeeker,
    #[sea_orm(string_value = "employer")]
    #[serde(rename = "employer")]
    Employer,
    #[sea_orm(string_value = "company")]
    #[serde(rename = "company")]
    Company,
    #[sea_orm(string_value = "admin")]
    #[serde(rename = "admin")]
    Admin,
    #[sea_orm(string_value = "oauth_job_seeker")]
    #[serde(rename = "oauthJobSeeker")]
    OAuthJobSeeker,
    #[sea_orm(string_value = "oauth_employer")]
    #[serde(rename = "oauthEmployer")]
    OAuthEmployer,
}

impl AccountKind {
    pub fn slug(&self) -> &'static str {
        match self {
            AccountKind::JobSeeker => "job-seeker",
            AccountKind::Employer => "employer",
            AccountKind::Company => "company",
            AccountKind::Admin => "admin",
            AccountKind::OAuthJobSeeker => "oauth-job-seeker",
            AccountKind::OAuthEmployer => "oauth-employer",
        }
    }
}

impl std::fmt::Display for AccountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

/// The single account an approval row belongs to.
///
/// Persisted as five nullable foreign keys, exactly one of which is set.
/// Admins never appear here because they are not subject to approval.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccountRef {
    JobSeeker(Uuid),
    Employer(Uuid),
    Company(Uuid),
    OAuthJobSeeker(Uuid),
    OAuthEmployer(Uuid),
}

impl AccountRef {
    pub fn new(kind: AccountKind, id: Uuid) -> Option<Self> {
        match kind {
            AccountKind::JobSeeker => Some(AccountRef::JobSeeker(id)),
            AccountKind::Employer => Some(AccountRef::Employer(id)),
            AccountKind::Company => Some(AccountRef::Company(id)),
            AccountKind::OAuthJobSeeker => Some(AccountRef::OAuthJobSeeker(id)),
            AccountKind::OAuthEmployer => Some(AccountRef::OAuthEmployer(id)),
            AccountKind::Admin => None,
        }
    }

    pub fn kind(&self) -> AccountKind {
        match self {
            AccountRef::JobSeeker(_) => AccountKind::JobSeeker,
            AccountRef::Employer(_) => AccountKind::Employer,
            AccountRef::Company(_) => AccountKind::Company,
            AccountRef::OAuthJobSeeker(_) => AccountKind::OAuthJobSeeker,
            AccountRef::OAuthEmployer(_) => AccountKind::OAuthEmployer,
        }
    }

    pub fn id(&self) -> Uuid {
        match *self {
            AccountRef::JobSeeker(id)
            | AccountRef::Employer(id)
            | AccountRef::Company(id)
            | AccountRef::OAuthJobSeeker(id)
            | AccountRef::OAuthEmployer(id) => id,
        }
    }
}

/// Owner of a job hiring post.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PostOwner {
    Employer(Uuid),
    OAuthEmployer(Uuid),
    Company(Uuid),
}

impl PostOwner {
    pub fn new(kind: AccountKind, id: Uuid) -> Option<Self> {
        match kind {
            AccountKind::Employer => Some(PostOwner::Employer(id)),
            AccountKind::OAuthEmployer => Some(PostOwner::OAuthEmployer(id)),
            AccountKind::Company => Some(PostOwner::Company(id)),
            _ => None,
        }
    }

    /// Split into the (employer_id, oauth_employer_id, company_id) column triple.
    pub fn columns(&self) -> (Option<Uuid>, Option<Uuid>, Option<Uuid>) {
        match *self {
            PostOwner::Employer(id) => (Some(id), None, None),
            PostOwner::OAuthEmployer(id) => (None, Some(id), None),
            PostOwner::Company(id) => (None, None, Some(id)),
        }
    }

    pub fn from_columns(
        employer_id: Option<Uuid>,
        oauth_employer_id: Option<Uuid>,
        company_id: Option<Uuid>,
    ) -> Option<Self> {
        match (employer_id, oauth_employer_id, company_id) {
            (Some(id), None, None) => Some(PostOwner::Employer(id)),
            (None, Some(id), None) => Some(PostOwner::OAuthEmployer(id)),
            (None, None, Some(id)) => Some(PostOwner::Company(id)),
            _ => None,
        }
    }
}

/// Owner of a job finding post.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeekerOwner {
    JobSeeker(Uuid),
    OAuthJobSeeker(Uuid),
}

impl SeekerOwner {
    pub fn new(kind: AccountKind, id: Uuid) -> Option<Self> {
        match kind {
            AccountKind::JobSeeker => Some(SeekerOwner::JobSeeker(id)),
            AccountKind::OAuthJobSeeker => Some(SeekerOwner::OAuthJobSeeker(id)),
            _ => None,
        }
    }

    pub fn columns(&self) -> (Option<Uuid>, Option<Uuid>) {
        match *self {
            SeekerOwner::JobSeeker(id) => (Some(id), None),
            SeekerOwner::OAuthJobSeeker(id) => (None, Some(id)),
        }
    }

    pub fn from_columns(job_seeker_id: Option<Uuid>, oauth_job_seeker_id: Option<Uuid>) -> Option<Self> {
        match (job_seeker_id, oauth_job_seeker_id) {
            (Some(id), None) => Some(SeekerOwner::JobSeeker(id)),
            (None, Some(id)) => Some(SeekerOwner::OAuthJobSeeker(id)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admins_have_no_account_ref() {
        let id = Uuid::new_v4();
        assert_eq!(AccountRef::new(AccountKind::Admin, id), None);
        let account = AccountRef::new(AccountKind::OAuthEmployer, id).unwrap();
        assert_eq!(account.kind(), AccountKind::OAuthEmployer);
        assert_eq!(account.id(), id);
    }

    #[test]
    fn post_owner_requires_exactly_one_column() {
        let id = Uuid::new_v4();
        let owner = PostOwner::Company(id);
        let (e, o, c) = owner.columns();
        assert_eq!(PostOwner::from_columns(e, o, c), Some(owner));
        assert_eq!(PostOwner::from_columns(None, None, None), None);
        assert_eq!(PostOwner::from_columns(Some(id), None, Some(id)), None);
    }

    #[test]
    fn only_hiring_accounts_own_job_posts() {
        let id = Uuid::new_v4();
        assert!(PostOwner::new(AccountKind::JobSeeker, id).is_none());
        assert!(PostOwner::new(AccountKind::Admin, id).is_none());
        assert!(SeekerOwner::new(AccountKind::Employer, id).is_none());
        assert_eq!(
            SeekerOwner::new(AccountKind::OAuthJobSeeker, id),
            Some(SeekerOwner::OAuthJobSeeker(id))
        );
    }

    #[test]
    fn kinds_serialize_in_camel_case() {
        assert_eq!(
            serde_json::to_string(&AccountKind::OAuthJobSeeker).unwrap(),
            "\"oauthJobSeeker\""
        );
        let kind: AccountKind = serde_json::from_str("\"jobSeeker\"").unwrap();
        assert_eq!(kind, AccountKind::JobSeeker);
    }
}
