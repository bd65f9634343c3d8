pub mod auth;
pub mod club;
pub mod events;
pub mod invites;
pub mod members;
pub mod modules;
pub mod profile;
pub mod root;
pub mod teams;

use axum::extract::Multipart;
use axum::body::Bytes;

use crate::error::{AppError, Result};

/// Reads the `file` part of a multipart upload: its bytes and declared content type.
pub(crate) async fn read_upload(mut multipart: Multipart) -> Result<(Bytes, String)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid upload: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field
            .content_type()
            .map(str::to_string)
            .ok_or_else(|| AppError::Validation("Missing content type".to_string()))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Invalid upload: {}", e)))?;

        return Ok((bytes, content_type));
    }

    Err(AppError::Validation("No file provided".to_string()))
}
