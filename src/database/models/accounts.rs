use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Gives credential login access to the stored bcrypt hash of an account row.
pub trait PasswordHolder {
    fn password_hash(&self) -> &str;
}

// --- Job seekers ---
pub mod job_seeker {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, DeriveEntityModel, ToSchema)]
    #[sea_orm(table_name = "job_seekers")]
    #[serde(rename_all = "camelCase")]
    #[schema(as = JobSeeker)]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub first_name: String,
        pub last_name: String,
        pub username: String,
        #[sea_orm(unique)]
        pub email: String,
        #[serde(skip_serializing)]
        pub password: String,
        pub contact: Option<String>,
        pub address: Option<String>,
        pub description: Option<String>,
        pub profile_picture: Option<String>,
        pub resume: Option<String>,
        #[schema(value_type = String, format = DateTime)]
        pub created_at: DateTimeUtc,
        #[schema(value_type = String, format = DateTime)]
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}

    impl PasswordHolder for Model {
        fn password_hash(&self) -> &str {
            &self.password
        }
    }
}

// --- Employers ---
pub mod employer {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, DeriveEntityModel, ToSchema)]
    #[sea_orm(table_name = "employers")]
    #[serde(rename_all = "camelCase")]
    #[schema(as = Employer)]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub first_name: String,
        pub last_name: String,
        pub username: String,
        #[sea_orm(unique)]
        pub email: String,
        #[serde(skip_serializing)]
        pub password: String,
        pub contact: Option<String>,
        pub position: Option<String>,
        pub profile_picture: Option<String>,
        #[schema(value_type = String, format = DateTime)]
        pub created_at: DateTimeUtc,
        #[schema(value_type = String, format = DateTime)]
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}

    impl PasswordHolder for Model {
        fn password_hash(&self) -> &str {
            &self.password
        }
    }
}

// --- Companies ---
pub mod company {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, DeriveEntityModel, ToSchema)]
    #[sea_orm(table_name = "companies")]
    #[serde(rename_all = "camelCase")]
    #[schema(as = Company)]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub name: String,
        #[sea_orm(unique)]
        pub email: String,
        #[serde(skip_serializing)]
        pub password: String,
        pub contact: Option<String>,
        pub address: Option<String>,
        pub description: Option<String>,
        pub profile_picture: Option<String>,
        #[schema(value_type = String, format = DateTime)]
        pub created_at: DateTimeUtc,
        #[schema(value_type = String, format = DateTime)]
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}

    impl PasswordHolder for Model {
        fn password_hash(&self) -> &str {
            &self.password
        }
    }
}

// --- Admins ---
pub mod admin {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, DeriveEntityModel, ToSchema)]
    #[sea_orm(table_name = "admins")]
    #[serde(rename_all = "camelCase")]
    #[schema(as = Admin)]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        #[sea_orm(unique)]
        pub username: String,
        #[sea_orm(unique)]
        pub email: String,
        #[serde(skip_serializing)]
        pub password: String,
        #[schema(value_type = String, format = DateTime)]
        pub created_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}

    impl PasswordHolder for Model {
        fn password_hash(&self) -> &str {
            &self.password
        }
    }
}

// --- Google sign-in variants ---
pub mod oauth_job_seeker {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, DeriveEntityModel, ToSchema)]
    #[sea_orm(table_name = "oauth_job_seekers")]
    #[serde(rename_all = "camelCase")]
    #[schema(as = OAuthJobSeeker)]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        #[sea_orm(unique)]
        #[serde(skip_serializing)]
        pub google_id: String,
        pub email: String,
        pub first_name: String,
        pub last_name: String,
        pub contact: Option<String>,
        pub address: Option<String>,
        pub description: Option<String>,
        pub profile_picture: Option<String>,
        pub resume: Option<String>,
        #[schema(value_type = String, format = DateTime)]
        pub created_at: DateTimeUtc,
        #[schema(value_type = String, format = DateTime)]
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod oauth_employer {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, DeriveEntityModel, ToSchema)]
    #[sea_orm(table_name = "oauth_employers")]
    #[serde(rename_all = "camelCase")]
    #[schema(as = OAuthEmployer)]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        #[sea_orm(unique)]
        #[serde(skip_serializing)]
        pub google_id: String,
        pub email: String,
        pub first_name: String,
        pub last_name: String,
        pub contact: Option<String>,
        pub position: Option<String>,
        pub profile_picture: Option<String>,
        #[schema(value_type = String, format = DateTime)]
        pub created_at: DateTimeUtc,
        #[schema(value_type = String, format = DateTime)]
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}
