use futures_util::future::BoxFuture;
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};
use uuid::Uuid;

use crate::database::types::AccountKind;
use crate::errors::AppError;

pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Destination for uploaded files. Returns the public URL of the stored object.
pub trait ObjectStorage: Send + Sync {
    fn put<'a>(
        &'a self,
        key: &'a str,
        bytes: Vec<u8>,
        content_type: &'a str,
    ) -> BoxFuture<'a, Result<String, AppError>>;
}

/// Stores objects on the local disk; `main` serves the directory under `/uploads`.
pub struct LocalObjectStorage {
    root: PathBuf,
    public_base: String,
}

impl LocalObjectStorage {
    pub fn new(root: impl Into<PathBuf>, public_url: &str) -> Self {
        Self {
            root: root.into(),
            public_base: format!("{}/uploads", public_url.trim_end_matches('/')),
        }
    }

    pub fn url_for(&self, key: &str) -> String {
        format!("{}/{}", self.public_base, key)
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, AppError> {
        let relative = Path::new(key);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(AppError::InvalidInput(format!("Invalid object key: {}", key)));
        }
        Ok(self.root.join(relative))
    }
}

impl ObjectStorage for LocalObjectStorage {
    fn put<'a>(
        &'a self,
        key: &'a str,
        bytes: Vec<u8>,
        content_type: &'a str,
    ) -> BoxFuture<'a, Result<String, AppError>> {
        Box::pin(async move {
            let path = self.path_for(key)?;
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&path, &bytes).await?;
            log::info!("Stored {} ({} bytes, {})", key, bytes.len(), content_type);
            Ok(self.url_for(key))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UploadTarget {
    ProfilePicture,
    Resume,
}

impl std::fmt::Display for UploadTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UploadTarget::ProfilePicture => write!(f, "profile-picture"),
            UploadTarget::Resume => write!(f, "resume"),
        }
    }
}

impl UploadTarget {
    pub fn from_slug(value: &str) -> Option<Self> {
        match value {
            "profile-picture" => Some(UploadTarget::ProfilePicture),
            "resume" => Some(UploadTarget::Resume),
            _ => None,
        }
    }

    /// Resumes belong to job seekers only; every account except admins has a picture.
    pub fn accepts(&self, kind: AccountKind) -> bool {
        match self {
            UploadTarget::ProfilePicture => kind != AccountKind::Admin,
            UploadTarget::Resume => {
                matches!(kind, AccountKind::JobSeeker | AccountKind::OAuthJobSeeker)
            }
        }
    }

    fn allowed(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            UploadTarget::ProfilePicture => &[
                ("image/png", "png"),
                ("image/jpeg", "jpg"),
                ("image/webp", "webp"),
            ],
            UploadTarget::Resume => &[("application/pdf", "pdf")],
        }
    }

    /// Checks type and size, returning the file extension to store under.
    pub fn validate(&self, content_type: &str, size: usize) -> Result<&'static str, AppError> {
        if size == 0 {
            return Err(AppError::InvalidInput("Uploaded file is empty".to_string()));
        }
        if size > MAX_UPLOAD_BYTES {
            return Err(AppError::InvalidInput(format!(
                "File exceeds {} bytes",
                MAX_UPLOAD_BYTES
            )));
        }
        self.allowed()
            .iter()
            .find(|(mime, _)| *mime == content_type)
            .map(|(_, ext)| *ext)
            .ok_or_else(|| {
                AppError::InvalidInput(format!(
                    "Unsupported file type {} for {}",
                    content_type, self
                ))
            })
    }

    pub fn object_key(&self, kind: AccountKind, account_id: Uuid, ext: &str) -> String {
        format!("{}/{}/{}-{}.{}", kind, account_id, self, Uuid::new_v4(), ext)
    }
}
