use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};

pub const AVATAR_BUCKET: &str = "avatars";
pub const CLUB_LOGO_BUCKET: &str = "club-logos";

/// Maximum upload size (2 MB)
pub const MAX_UPLOAD_SIZE: usize = 2 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Avatar,
    ClubLogo,
}

/// Checks an upload against the size limit and the allowed image types.
/// Returns the file extension to store it under.
pub fn validate_image(kind: UploadKind, len: usize, content_type: &str) -> Result<&'static str> {
    if len == 0 {
        return Err(AppError::Validation("File is empty".to_string()));
    }
    if len > MAX_UPLOAD_SIZE {
        return Err(AppError::Validation("File too large (max 2 MB)".to_string()));
    }

    let extension = match (content_type.to_ascii_lowercase().as_str(), kind) {
        ("image/jpeg", _) => "jpg",
        ("image/png", _) => "png",
        ("image/webp", _) => "webp",
        ("image/svg+xml", UploadKind::ClubLogo) => "svg",
        _ => {
            let allowed = match kind {
                UploadKind::Avatar => "JPEG, PNG, WebP",
                UploadKind::ClubLogo => "JPEG, PNG, WebP, SVG",
            };
            return Err(AppError::Validation(format!(
                "Invalid file type. Allowed: {}",
                allowed
            )));
        }
    };

    Ok(extension)
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores `bytes` under `bucket/key`, replacing any previous object, and
    /// returns its public URL.
    async fn upload(&self, bucket: &str, key: &str, bytes: &[u8], content_type: &str) -> Result<String>;

    /// Deletes the object behind a URL returned by `upload`. URLs this store
    /// did not hand out and objects already gone are ignored.
    async fn remove(&self, url: &str) -> Result<()>;
}

/// Keeps objects on the local filesystem; `/storage` serves them.
pub struct LocalObjectStore {
    root_dir: PathBuf,
    public_url_prefix: String,
}

impl LocalObjectStore {
    pub fn new(root_dir: impl Into<PathBuf>, public_url_prefix: &str) -> Self {
        Self {
            root_dir: root_dir.into(),
            public_url_prefix: public_url_prefix.trim_end_matches('/').to_string(),
        }
    }

    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf> {
        let relative = Path::new(bucket).join(key);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(AppError::Validation("Invalid object key".to_string()));
        }
        Ok(self.root_dir.join(relative))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn upload(&self, bucket: &str, key: &str, bytes: &[u8], content_type: &str) -> Result<String> {
        let path = self.object_path(bucket, key)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::Storage(format!("Failed to create directory: {}", e))
            })?;
        }

        let mut file = fs::File::create(&path).await.map_err(|e| {
            AppError::Storage(format!("Failed to create file: {}", e))
        })?;

        file.write_all(bytes).await.map_err(|e| {
            AppError::Storage(format!("Failed to write file: {}", e))
        })?;
        file.flush().await.map_err(|e| {
            AppError::Storage(format!("Failed to write file: {}", e))
        })?;

        tracing::debug!(bucket, key, content_type, size = bytes.len(), "Object stored");

        Ok(format!("{}/{}/{}", self.public_url_prefix, bucket, key))
    }

    async fn remove(&self, url: &str) -> Result<()> {
        let Some(relative) = url
            .strip_prefix(&self.public_url_prefix)
            .and_then(|rest| rest.strip_prefix('/'))
        else {
            return Ok(());
        };
        let Some((bucket, key)) = relative.split_once('/') else {
            return Ok(());
        };

        let path = self.object_path(bucket, key)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(bucket, key, "Object removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(format!("Failed to delete file: {}", e))),
        }
    }
}
