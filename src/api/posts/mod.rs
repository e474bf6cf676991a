pub mod handlers;

pub use handlers::{
    __path_create_finding_post, __path_create_job_post, __path_delete_finding_post,
    __path_delete_job_post, __path_get_finding_post, __path_get_job_post,
    __path_list_finding_posts, __path_list_job_posts, __path_update_finding_post,
    __path_update_job_post, create_finding_post, create_job_post, delete_finding_post,
    delete_job_post, get_finding_post, get_job_post, init_routes, list_finding_posts,
    list_job_posts, update_finding_post, update_job_post,
};
