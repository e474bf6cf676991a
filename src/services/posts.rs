use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, ModelTrait, PaginatorTrait, QueryFilter, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::validation::FieldErrors;
use crate::database::models::{
    category, job_finding_post, job_finding_post_category, job_finding_post_skill, job_post,
    job_post_category, job_post_skill, skill,
};
use crate::database::types::{PostOwner, SeekerOwner};
use crate::errors::AppError;
use crate::services::accounts::Account;
use crate::services::post_query::{total_pages, JobFindingPostQuery, JobPostQuery, PAGE_SIZE};

// --- DTOs ---

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobPostInput {
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub salary: Option<i64>,
    pub employment_type: Option<String>,
    #[serde(default)]
    pub skill_ids: Vec<i32>,
    #[serde(default)]
    pub category_ids: Vec<i32>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobFindingPostInput {
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub desired_salary: Option<i64>,
    #[serde(default)]
    pub skill_ids: Vec<i32>,
    #[serde(default)]
    pub category_ids: Vec<i32>,
}

impl JobPostInput {
    fn validate(&self) -> Result<(), AppError> {
        let mut errors = FieldErrors::new();
        errors
            .required("title", &self.title, 160)
            .required("description", &self.description, 10_000)
            .optional("location", self.location.as_deref(), 160)
            .optional("employmentType", self.employment_type.as_deref(), 64)
            .non_negative("salary", self.salary);
        errors.finish()
    }
}

impl JobFindingPostInput {
    fn validate(&self) -> Result<(), AppError> {
        let mut errors = FieldErrors::new();
        errors
            .required("title", &self.title, 160)
            .required("description", &self.description, 10_000)
            .optional("location", self.location.as_deref(), 160)
            .non_negative("desiredSalary", self.desired_salary);
        errors.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobPostView {
    #[serde(flatten)]
    pub post: job_post::Model,
    pub skills: Vec<skill::Model>,
    pub categories: Vec<category::Model>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobFindingPostView {
    #[serde(flatten)]
    pub post: job_finding_post::Model,
    pub skills: Vec<skill::Model>,
    pub categories: Vec<category::Model>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobPostPage {
    pub items: Vec<JobPostView>,
    pub page: u64,
    pub page_size: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobFindingPostPage {
    pub items: Vec<JobFindingPostView>,
    pub page: u64,
    pub page_size: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

fn dedup(ids: &[i32]) -> Vec<i32> {
    let mut unique = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(id) {
            unique.push(*id);
        }
    }
    unique
}

fn trimmed_opt(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// --- Job hiring posts ---

async fn enrich_job_post<C>(conn: &C, post: job_post::Model) -> Result<JobPostView, AppError>
where
    C: ConnectionTrait,
{
    let skills = post.find_related(skill::Entity).all(conn).await?;
    let categories = post.find_related(category::Entity).all(conn).await?;
    Ok(JobPostView {
        post,
        skills,
        categories,
    })
}

/// Replaces the skill and category links of a job post.
async fn link_job_post<C>(
    conn: &C,
    post_id: Uuid,
    skill_ids: &[i32],
    category_ids: &[i32],
) -> Result<(), AppError>
where
    C: ConnectionTrait,
{
    job_post_skill::Entity::delete_many()
        .filter(job_post_skill::Column::JobPostId.eq(post_id))
        .exec(conn)
        .await?;
    job_post_category::Entity::delete_many()
        .filter(job_post_category::Column::JobPostId.eq(post_id))
        .exec(conn)
        .await?;

    let skills = dedup(skill_ids);
    if !skills.is_empty() {
        job_post_skill::Entity::insert_many(skills.into_iter().map(|skill_id| {
            job_post_skill::ActiveModel {
                job_post_id: Set(post_id),
                skill_id: Set(skill_id),
            }
        }))
        .exec_without_returning(conn)
        .await?;
    }

    let categories = dedup(category_ids);
    if !categories.is_empty() {
        job_post_category::Entity::insert_many(categories.into_iter().map(|category_id| {
            job_post_category::ActiveModel {
                job_post_id: Set(post_id),
                category_id: Set(category_id),
            }
        }))
        .exec_without_returning(conn)
        .await?;
    }
    Ok(())
}

fn job_post_owner(account: &Account) -> Result<PostOwner, AppError> {
    PostOwner::new(account.kind(), account.id()).ok_or_else(|| {
        AppError::Forbidden("Only employers and companies can publish job posts".to_string())
    })
}

/// Owners may always change their post; admins only when `allow_admin` is set.
fn ensure_job_post_access(
    post: &job_post::Model,
    account: &Account,
    allow_admin: bool,
) -> Result<(), AppError> {
    if allow_admin && account.is_admin() {
        return Ok(());
    }
    if PostOwner::new(account.kind(), account.id()) == Some(post.owner()?) {
        Ok(())
    } else {
        Err(AppError::Forbidden("You do not own this post".to_string()))
    }
}

async fn find_job_post(db: &DatabaseConnection, id: Uuid) -> Result<job_post::Model, AppError> {
    job_post::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job post {} not found", id)))
}

pub async fn list_job_posts(
    db: &DatabaseConnection,
    query: &JobPostQuery,
) -> Result<JobPostPage, AppError> {
    let (posts, total_items) = if query.has_filters() {
        let statements = query.filtered_statements()?;
        let total: i64 = match db.query_one(statements.count).await? {
            Some(row) => row.try_get("", "total")?,
            None => 0,
        };
        let posts = job_post::Entity::find()
            .from_raw_sql(statements.select)
            .all(db)
            .await?;
        (posts, total.max(0) as u64)
    } else {
        let paginator = query.orm_select().paginate(db, PAGE_SIZE);
        let total = paginator.num_items().await?;
        let posts = paginator.fetch_page(query.page() - 1).await?;
        (posts, total)
    };

    let mut items = Vec::with_capacity(posts.len());
    for post in posts {
        items.push(enrich_job_post(db, post).await?);
    }

    Ok(JobPostPage {
        items,
        page: query.page(),
        page_size: PAGE_SIZE,
        total_items,
        total_pages: total_pages(total_items),
    })
}

pub async fn get_job_post(db: &DatabaseConnection, id: Uuid) -> Result<JobPostView, AppError> {
    let post = find_job_post(db, id).await?;
    enrich_job_post(db, post).await
}

pub async fn create_job_post(
    db: &DatabaseConnection,
    account: &Account,
    input: JobPostInput,
) -> Result<JobPostView, AppError> {
    input.validate()?;
    let owner = job_post_owner(account)?;
    let (employer_id, oauth_employer_id, company_id) = owner.columns();
    let now = Utc::now();

    let txn = db.begin().await?;
    let post = job_post::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(input.title.trim().to_string()),
        description: Set(input.description.trim().to_string()),
        location: Set(trimmed_opt(input.location)),
        salary: Set(input.salary),
        employment_type: Set(trimmed_opt(input.employment_type)),
        employer_id: Set(employer_id),
        oauth_employer_id: Set(oauth_employer_id),
        company_id: Set(company_id),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;
    link_job_post(&txn, post.id, &input.skill_ids, &input.category_ids).await?;
    txn.commit().await?;

    log::info!("{} {} published job post {}", account.kind(), account.id(), post.id);
    enrich_job_post(db, post).await
}

pub async fn update_job_post(
    db: &DatabaseConnection,
    account: &Account,
    id: Uuid,
    input: JobPostInput,
) -> Result<JobPostView, AppError> {
    input.validate()?;
    let post = find_job_post(db, id).await?;
    ensure_job_post_access(&post, account, false)?;

    let txn = db.begin().await?;
    let mut active = post.into_active_model();
    active.title = Set(input.title.trim().to_string());
    active.description = Set(input.description.trim().to_string());
    active.location = Set(trimmed_opt(input.location));
    active.salary = Set(input.salary);
    active.employment_type = Set(trimmed_opt(input.employment_type));
    active.updated_at = Set(Utc::now());
    let updated = active.update(&txn).await?;
    link_job_post(&txn, updated.id, &input.skill_ids, &input.category_ids).await?;
    txn.commit().await?;

    log::info!("Job post {} updated by {}", updated.id, account.id());
    enrich_job_post(db, updated).await
}

pub async fn delete_job_post(
    db: &DatabaseConnection,
    account: &Account,
    id: Uuid,
) -> Result<(), AppError> {
    let post = find_job_post(db, id).await?;
    ensure_job_post_access(&post, account, true)?;

    let txn = db.begin().await?;
    link_job_post(&txn, id, &[], &[]).await?;
    job_post::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    log::info!("Job post {} deleted by {} {}", id, account.kind(), account.id());
    Ok(())
}

// --- Job finding posts ---

async fn enrich_finding_post<C>(
    conn: &C,
    post: job_finding_post::Model,
) -> Result<JobFindingPostView, AppError>
where
    C: ConnectionTrait,
{
    let skills = post.find_related(skill::Entity).all(conn).await?;
    let categories = post.find_related(category::Entity).all(conn).await?;
    Ok(JobFindingPostView {
        post,
        skills,
        categories,
    })
}

async fn link_finding_post<C>(
    conn: &C,
    post_id: Uuid,
    skill_ids: &[i32],
    category_ids: &[i32],
) -> Result<(), AppError>
where
    C: ConnectionTrait,
{
    job_finding_post_skill::Entity::delete_many()
        .filter(job_finding_post_skill::Column::JobFindingPostId.eq(post_id))
        .exec(conn)
        .await?;
    job_finding_post_category::Entity::delete_many()
        .filter(job_finding_post_category::Column::JobFindingPostId.eq(post_id))
        .exec(conn)
        .await?;

    let skills = dedup(skill_ids);
    if !skills.is_empty() {
        job_finding_post_skill::Entity::insert_many(skills.into_iter().map(|skill_id| {
            job_finding_post_skill::ActiveModel {
                job_finding_post_id: Set(post_id),
                skill_id: Set(skill_id),
            }
        }))
        .exec_without_returning(conn)
        .await?;
    }

    let categories = dedup(category_ids);
    if !categories.is_empty() {
        job_finding_post_category::Entity::insert_many(categories.into_iter().map(|category_id| {
            job_finding_post_category::ActiveModel {
                job_finding_post_id: Set(post_id),
                category_id: Set(category_id),
            }
        }))
        .exec_without_returning(conn)
        .await?;
    }
    Ok(())
}

fn ensure_finding_post_access(
    post: &job_finding_post::Model,
    account: &Account,
    allow_admin: bool,
) -> Result<(), AppError> {
    if allow_admin && account.is_admin() {
        return Ok(());
    }
    if SeekerOwner::new(account.kind(), account.id()) == Some(post.owner()?) {
        Ok(())
    } else {
        Err(AppError::Forbidden("You do not own this post".to_string()))
    }
}

async fn find_finding_post(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<job_finding_post::Model, AppError> {
    job_finding_post::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job finding post {} not found", id)))
}

pub async fn list_finding_posts(
    db: &DatabaseConnection,
    query: &JobFindingPostQuery,
) -> Result<JobFindingPostPage, AppError> {
    query.validate()?;
    let paginator = query.orm_select().paginate(db, PAGE_SIZE);
    let total_items = paginator.num_items().await?;
    let posts = paginator.fetch_page(query.page() - 1).await?;

    let mut items = Vec::with_capacity(posts.len());
    for post in posts {
        items.push(enrich_finding_post(db, post).await?);
    }

    Ok(JobFindingPostPage {
        items,
        page: query.page(),
        page_size: PAGE_SIZE,
        total_items,
        total_pages: total_pages(total_items),
    })
}

pub async fn get_finding_post(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<JobFindingPostView, AppError> {
    let post = find_finding_post(db, id).await?;
    enrich_finding_post(db, post).await
}

pub async fn create_finding_post(
    db: &DatabaseConnection,
    account: &Account,
    input: JobFindingPostInput,
) -> Result<JobFindingPostView, AppError> {
    input.validate()?;
    let owner = SeekerOwner::new(account.kind(), account.id()).ok_or_else(|| {
        AppError::Forbidden("Only job seekers can publish job finding posts".to_string())
    })?;
    let (job_seeker_id, oauth_job_seeker_id) = owner.columns();
    let now = Utc::now();

    let txn = db.begin().await?;
    let post = job_finding_post::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(input.title.trim().to_string()),
        description: Set(input.description.trim().to_string()),
        location: Set(trimmed_opt(input.location)),
        desired_salary: Set(input.desired_salary),
        job_seeker_id: Set(job_seeker_id),
        oauth_job_seeker_id: Set(oauth_job_seeker_id),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;
    link_finding_post(&txn, post.id, &input.skill_ids, &input.category_ids).await?;
    txn.commit().await?;

    log::info!("{} {} published job finding post {}", account.kind(), account.id(), post.id);
    enrich_finding_post(db, post).await
}

pub async fn update_finding_post(
    db: &DatabaseConnection,
    account: &Account,
    id: Uuid,
    input: JobFindingPostInput,
) -> Result<JobFindingPostView, AppError> {
    input.validate()?;
    let post = find_finding_post(db, id).await?;
    ensure_finding_post_access(&post, account, false)?;

    let txn = db.begin().await?;
    let mut active = post.into_active_model();
    active.title = Set(input.title.trim().to_string());
    active.description = Set(input.description.trim().to_string());
    active.location = Set(trimmed_opt(input.location));
    active.desired_salary = Set(input.desired_salary);
    active.updated_at = Set(Utc::now());
    let updated = active.update(&txn).await?;
    link_finding_post(&txn, updated.id, &input.skill_ids, &input.category_ids).await?;
    txn.commit().await?;

    log::info!("Job finding post {} updated by {}", updated.id, account.id());
    enrich_finding_post(db, updated).await
}

pub async fn delete_finding_post(
    db: &DatabaseConnection,
    account: &Account,
    id: Uuid,
) -> Result<(), AppError> {
    let post = find_finding_post(db, id).await?;
    ensure_finding_post_access(&post, account, true)?;

    let txn = db.begin().await?;
    link_finding_post(&txn, id, &[], &[]).await?;
    job_finding_post::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    log::info!("Job finding post {} deleted by {} {}", id, account.kind(), account.id());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{admin, employer};
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::collections::BTreeMap;

    fn employer_account(id: Uuid) -> Account {
        let now = Utc::now();
        Account::Employer(employer::Model {
            id,
            first_name: "Ana".into(),
            last_name: "Reyes".into(),
            username: "ana".into(),
            email: "ana@example.com".into(),
            password: "hash".into(),
            contact: None,
            position: None,
            profile_picture: None,
            created_at: now,
            updated_at: now,
        })
    }

    fn post_by(employer_id: Uuid, salary: Option<i64>) -> job_post::Model {
        let now = Utc::now();
        job_post::Model {
            id: Uuid::new_v4(),
            title: "Welder".into(),
            description: "Night shift".into(),
            location: Some("Davao".into()),
            salary,
            employment_type: None,
            employer_id: Some(employer_id),
            oauth_employer_id: None,
            company_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn input() -> JobPostInput {
        JobPostInput {
            title: "Welder".into(),
            description: "Day shift".into(),
            location: None,
            salary: Some(30_000),
            employment_type: None,
            skill_ids: vec![1, 1, 2],
            category_ids: vec![],
        }
    }

    #[test]
    fn negative_salary_is_rejected() {
        let mut bad = input();
        bad.salary = Some(-1);
        bad.title = " ".into();
        match bad.validate() {
            Err(AppError::Validation(issues)) => assert_eq!(issues.len(), 2),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(dedup(&[3, 1, 3, 2, 1]), vec![3, 1, 2]);
    }

    #[tokio::test]
    async fn unfiltered_listing_reports_page_count() {
        let owner = Uuid::new_v4();
        let posts = vec![post_by(owner, Some(50_000)), post_by(owner, None)];
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![BTreeMap::from([(
                "num_items",
                Value::BigInt(Some(23)),
            )])]])
            .append_query_results([posts.clone()])
            .append_query_results([Vec::<skill::Model>::new()])
            .append_query_results([Vec::<category::Model>::new()])
            .append_query_results([vec![skill::Model {
                id: 1,
                name: "Welding".into(),
            }]])
            .append_query_results([Vec::<category::Model>::new()])
            .into_connection();

        let query = JobPostQuery {
            page: Some(3),
            ..Default::default()
        };
        let page = list_job_posts(&db, &query).await.unwrap();

        assert_eq!(page.total_items, 23);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.page, 3);
        assert_eq!(page.page_size, 10);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[1].skills[0].name, "Welding");
    }

    #[tokio::test]
    async fn filtered_listing_uses_the_count_row() {
        let owner = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![BTreeMap::from([(
                "total",
                Value::BigInt(Some(11)),
            )])]])
            .append_query_results([vec![post_by(owner, Some(90_000))]])
            .append_query_results([Vec::<skill::Model>::new()])
            .append_query_results([Vec::<category::Model>::new()])
            .into_connection();

        let query = JobPostQuery {
            min_salary: Some(40_000),
            ..Default::default()
        };
        let page = list_job_posts(&db, &query).await.unwrap();
        assert_eq!(page.total_items, 11);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.items[0].post.salary, Some(90_000));
    }

    #[tokio::test]
    async fn non_owner_cannot_update_or_delete() {
        let post = post_by(Uuid::new_v4(), None);
        let intruder = employer_account(Uuid::new_v4());
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![post.clone()]])
            .append_query_results([vec![post.clone()]])
            .into_connection();

        let err = update_job_post(&db, &intruder, post.id, input()).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        let err = delete_job_post(&db, &intruder, post.id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn admins_may_delete_but_not_edit() {
        let post = post_by(Uuid::new_v4(), None);
        let admin = Account::Admin(admin::Model {
            id: Uuid::new_v4(),
            username: "root".into(),
            email: "root@example.com".into(),
            password: "hash".into(),
            created_at: Utc::now(),
        });
        assert!(ensure_job_post_access(&post, &admin, true).is_ok());
        assert!(ensure_job_post_access(&post, &admin, false).is_err());

        let owner = employer_account(post.employer_id.unwrap());
        assert!(ensure_job_post_access(&post, &owner, false).is_ok());
    }

    #[tokio::test]
    async fn job_seekers_cannot_publish_job_posts() {
        let now = Utc::now();
        let seeker = Account::OAuthJobSeeker(crate::database::models::oauth_job_seeker::Model {
            id: Uuid::new_v4(),
            google_id: "g".into(),
            email: "s@example.com".into(),
            first_name: "S".into(),
            last_name: "T".into(),
            contact: None,
            address: None,
            description: None,
            profile_picture: None,
            resume: None,
            created_at: now,
            updated_at: now,
        });
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let err = create_job_post(&db, &seeker, input()).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn oversized_finding_page_is_rejected_before_querying() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let query = JobFindingPostQuery {
            page: Some(u64::MAX),
            ..Default::default()
        };
        let err = list_finding_posts(&db, &query).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn missing_post_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<job_finding_post::Model>::new()])
            .into_connection();
        let err = get_finding_post(&db, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
