use utoipa::OpenApi;

use crate::{
    api::{admin, health, posts, users},
    database::{
        models::{
            admin as admin_model, category, company, employer, job_finding_post, job_post,
            job_seeker, oauth_employer, oauth_job_seeker, registration_approval, skill,
            vulnerability, ApprovalStatus,
        },
        types::AccountKind,
    },
    errors::FieldIssue,
    services::{accounts, approvals, crud, oauth, post_query, posts as post_service},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health,
        // Users
        users::register_job_seeker,
        users::register_employer,
        users::register_company,
        users::login,
        users::google_login,
        users::logout,
        users::me,
        users::update_profile,
        users::change_password,
        users::upload,
        // Admin
        admin::register_admin,
        admin::list_approvals,
        admin::decide_approval,
        // Posts
        posts::list_job_posts,
        posts::get_job_post,
        posts::create_job_post,
        posts::update_job_post,
        posts::delete_job_post,
        posts::list_finding_posts,
        posts::get_finding_post,
        posts::create_finding_post,
        posts::update_finding_post,
        posts::delete_finding_post,
    ),
    components(
        schemas(
            // --- Models ---
            job_seeker::Model,
            employer::Model,
            company::Model,
            admin_model::Model,
            oauth_job_seeker::Model,
            oauth_employer::Model,
            registration_approval::Model,
            skill::Model,
            category::Model,
            vulnerability::Model,
            job_post::Model,
            job_finding_post::Model,
            ApprovalStatus,
            AccountKind,
            FieldIssue,

            // --- DTOs & API Structs ---
            accounts::RegisterJobSeeker,
            accounts::RegisterEmployer,
            accounts::RegisterCompany,
            accounts::RegisterAdmin,
            accounts::LoginRequest,
            accounts::ProfileUpdate,
            accounts::ChangePassword,
            oauth::GoogleLoginRequest,
            oauth::OAuthKind,
            approvals::ApprovalDecision,
            approvals::ApprovalView,
            admin::ApprovalsQuery,
            admin::DecisionRequest,
            admin::RemovedAccount,
            users::PendingRegistration,
            users::UploadForm,
            health::HealthStatus,
            crud::LookupInput,

            // --- Posts ---
            post_query::SalarySort,
            post_query::DateSort,
            post_service::JobPostInput,
            post_service::JobFindingPostInput,
            post_service::JobPostView,
            post_service::JobFindingPostView,
            post_service::JobPostPage,
            post_service::JobFindingPostPage,
        )
    ),
    tags(
        (name = "Health", description = "Liveness and database reachability"),
        (name = "Users", description = "Registration, login, sessions, profiles and uploads"),
        (name = "Admin", description = "Admin bootstrap and registration approvals"),
        (name = "Posts", description = "Job hiring posts and job finding posts"),
    )
)]
pub struct ApiDoc;
