pub mod accounts;
pub mod approvals;
pub mod lookups;
pub mod posts;
pub mod sessions;

pub use accounts::{admin, company, employer, job_seeker, oauth_employer, oauth_job_seeker};
pub use approvals::{registration_approval, ApprovalStatus};
pub use lookups::{category, skill, vulnerability};
pub use posts::{
    job_finding_post, job_finding_post_category, job_finding_post_skill, job_post,
    job_post_category, job_post_skill,
};
pub use sessions::session;
