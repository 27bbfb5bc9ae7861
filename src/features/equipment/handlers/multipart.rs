use axum::extract::Multipart;
use tracing::debug;

use crate::core::error::{AppError, Result};
use crate::features::equipment::models::UploadedFile;

/// Read the `file` field of a multipart form; other fields are ignored
pub async fn read_file_field(multipart: &mut Multipart) -> Result<UploadedFile> {
    let mut upload: Option<UploadedFile> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();
        if field_name != "file" {
            debug!("Ignoring unknown field: {}", field_name);
            continue;
        }

        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let file_name = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unnamed".to_string());

        let data = field.bytes().await.map_err(|e| {
            debug!("Failed to read file bytes: {}", e);
            AppError::BadRequest(format!("Failed to read file data: {}", e))
        })?;

        upload = Some(UploadedFile {
            file_name,
            content_type,
            data: data.to_vec(),
        });
    }

    upload.ok_or_else(|| AppError::BadRequest("File is required".to_string()))
}
