pub mod accounts;
pub mod approvals;
pub mod crud;
pub mod oauth;
pub mod passwords;
pub mod post_query;
pub mod posts;
pub mod sessions;
pub mod storage;
