use std::sync::Arc;

use crate::config::Config;
use crate::services::oauth::GoogleOAuthClient;
use crate::services::storage::{LocalObjectStorage, ObjectStorage};
use sea_orm::DatabaseConnection;

pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Config,
    pub storage: Arc<dyn ObjectStorage>,
    pub google: GoogleOAuthClient,
}

impl AppState {
    /// Wires the local upload directory and the Google client from `config`.
    pub fn new(db: DatabaseConnection, config: Config) -> Self {
        let storage = LocalObjectStorage::new(
            config.effective_upload_dir(),
            &config.effective_public_url(),
        );
        let google = GoogleOAuthClient::new(config.effective_google_userinfo_url());
        Self {
            db,
            config,
            storage: Arc::new(storage),
            google,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::web;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[test]
    fn state_is_shared_through_web_data() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let state = web::Data::new(AppState::new(db, Config::default()));
        let handle = state.clone();
        assert_eq!(handle.config.port, state.config.port);
    }
}
