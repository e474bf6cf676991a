pub mod handlers;
pub mod structures;

pub use handlers::{
    __path_change_password, __path_google_login, __path_login, __path_logout, __path_me,
    __path_register_company, __path_register_employer, __path_register_job_seeker,
    __path_update_profile, __path_upload, change_password, google_login, init_routes, login,
    logout, me, register_company, register_employer, register_job_seeker, update_profile, upload,
};

pub use structures::{PendingRegistration, SessionInfo, UploadForm, UploadResult};
