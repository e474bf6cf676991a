use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::database::models::lookups::{category, skill};
use crate::database::types::{PostOwner, SeekerOwner};
use crate::errors::AppError;

// --- Job hiring posts ---
pub mod job_post {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, DeriveEntityModel, ToSchema)]
    #[sea_orm(table_name = "job_posts")]
    #[serde(rename_all = "camelCase")]
    #[schema(as = JobPost)]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub title: String,
        #[sea_orm(column_type = "Text")]
        pub description: String,
        pub location: Option<String>,
        pub salary: Option<i64>,
        pub employment_type: Option<String>,
        pub employer_id: Option<Uuid>,
        pub oauth_employer_id: Option<Uuid>,
        pub company_id: Option<Uuid>,
        #[schema(value_type = String, format = DateTime)]
        pub created_at: DateTimeUtc,
        #[schema(value_type = String, format = DateTime)]
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "crate::database::models::accounts::employer::Entity",
            from = "Column::EmployerId",
            to = "crate::database::models::accounts::employer::Column::Id",
            on_delete = "Cascade"
        )]
        Employer,
        #[sea_orm(
            belongs_to = "crate::database::models::accounts::oauth_employer::Entity",
            from = "Column::OauthEmployerId",
            to = "crate::database::models::accounts::oauth_employer::Column::Id",
            on_delete = "Cascade"
        )]
        OAuthEmployer,
        #[sea_orm(
            belongs_to = "crate::database::models::accounts::company::Entity",
            from = "Column::CompanyId",
            to = "crate::database::models::accounts::company::Column::Id",
            on_delete = "Cascade"
        )]
        Company,
    }

    impl Related<skill::Entity> for Entity {
        fn to() -> RelationDef {
            super::job_post_skill::Relation::Skill.def()
        }

        fn via() -> Option<RelationDef> {
            Some(super::job_post_skill::Relation::JobPost.def().rev())
        }
    }

    impl Related<category::Entity> for Entity {
        fn to() -> RelationDef {
            super::job_post_category::Relation::Category.def()
        }

        fn via() -> Option<RelationDef> {
            Some(super::job_post_category::Relation::JobPost.def().rev())
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl Model {
        pub fn owner(&self) -> Result<PostOwner, AppError> {
            PostOwner::from_columns(self.employer_id, self.oauth_employer_id, self.company_id)
                .ok_or_else(|| {
                    log::error!("job post {} does not have exactly one owner", self.id);
                    AppError::Internal
                })
        }
    }
}

pub mod job_post_skill {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "job_post_skills")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub job_post_id: Uuid,
        #[sea_orm(primary_key, auto_increment = false)]
        pub skill_id: i32,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::job_post::Entity",
            from = "Column::JobPostId",
            to = "super::job_post::Column::Id",
            on_delete = "Cascade"
        )]
        JobPost,
        #[sea_orm(
            belongs_to = "crate::database::models::lookups::skill::Entity",
            from = "Column::SkillId",
            to = "crate::database::models::lookups::skill::Column::Id",
            on_delete = "Cascade"
        )]
        Skill,
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod job_post_category {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "job_post_categories")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub job_post_id: Uuid,
        #[sea_orm(primary_key, auto_increment = false)]
        pub category_id: i32,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::job_post::Entity",
            from = "Column::JobPostId",
            to = "super::job_post::Column::Id",
            on_delete = "Cascade"
        )]
        JobPost,
        #[sea_orm(
            belongs_to = "crate::database::models::lookups::category::Entity",
            from = "Column::CategoryId",
            to = "crate::database::models::lookups::category::Column::Id",
            on_delete = "Cascade"
        )]
        Category,
    }

    impl ActiveModelBehavior for ActiveModel {}
}

// --- Job finding posts ---
pub mod job_finding_post {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, DeriveEntityModel, ToSchema)]
    #[sea_orm(table_name = "job_finding_posts")]
    #[serde(rename_all = "camelCase")]
    #[schema(as = JobFindingPost)]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub title: String,
        #[sea_orm(column_type = "Text")]
        pub description: String,
        pub location: Option<String>,
        pub desired_salary: Option<i64>,
        pub job_seeker_id: Option<Uuid>,
        pub oauth_job_seeker_id: Option<Uuid>,
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
            belongs_to = "crate::database::models::accounts::oauth_job_seeker::Entity",
            from = "Column::OauthJobSeekerId",
            to = "crate::database::models::accounts::oauth_job_seeker::Column::Id",
            on_delete = "Cascade"
        )]
        OAuthJobSeeker,
    }

    impl Related<skill::Entity> for Entity {
        fn to() -> RelationDef {
            super::job_finding_post_skill::Relation::Skill.def()
        }

        fn via() -> Option<RelationDef> {
            Some(super::job_finding_post_skill::Relation::JobFindingPost.def().rev())
        }
    }

    impl Related<category::Entity> for Entity {
        fn to() -> RelationDef {
            super::job_finding_post_category::Relation::Category.def()
        }

        fn via() -> Option<RelationDef> {
            Some(super::job_finding_post_category::Relation::JobFindingPost.def().rev())
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl Model {
        pub fn owner(&self) -> Result<SeekerOwner, AppError> {
            SeekerOwner::from_columns(self.job_seeker_id, self.oauth_job_seeker_id).ok_or_else(|| {
                log::error!("job finding post {} does not have exactly one owner", self.id);
                AppError::Internal
            })
        }
    }
}

pub mod job_finding_post_skill {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "job_finding_post_skills")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub job_finding_post_id: Uuid,
        #[sea_orm(primary_key, auto_increment = false)]
        pub skill_id: i32,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::job_finding_post::Entity",
            from = "Column::JobFindingPostId",
            to = "super::job_finding_post::Column::Id",
            on_delete = "Cascade"
        )]
        JobFindingPost,
        #[sea_orm(
            belongs_to = "crate::database::models::lookups::skill::Entity",
            from = "Column::SkillId",
            to = "crate::database::models::lookups::skill::Column::Id",
            on_delete = "Cascade"
        )]
        Skill,
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod job_finding_post_category {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "job_finding_post_categories")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub job_finding_post_id: Uuid,
        #[sea_orm(primary_key, auto_increment = false)]
        pub category_id: i32,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::job_finding_post::Entity",
            from = "Column::JobFindingPostId",
            to = "super::job_finding_post::Column::Id",
            on_delete = "Cascade"
        )]
        JobFindingPost,
        #[sea_orm(
            belongs_to = "crate::database::models::lookups::category::Entity",
            from = "Column::CategoryId",
            to = "crate::database::models::lookups::category::Column::Id",
            on_delete = "Cascade"
        )]
        Category,
    }

    impl ActiveModelBehavior for ActiveModel {}
}
