use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::equipment::models::{
    filter_attachments, parse_attachments, AttachmentDescriptor, AttachmentFilter, PreviewKind,
    UploadedFile,
};
use crate::features::equipment::services::EquipmentStore;
use crate::modules::storage::ObjectStorage;
use crate::shared::validation::sanitize_file_name;

/// Maximum attachment size (50MB)
pub const MAX_ATTACHMENT_SIZE: usize = 50 * 1024 * 1024;

/// Allowed attachment content types
pub const ALLOWED_ATTACHMENT_TYPES: [&str; 6] = [
    "image/jpeg",
    "image/png",
    "image/gif",
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// Everything the preview dialog needs for one attachment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentPreview {
    pub attachment: AttachmentDescriptor,
    pub kind: PreviewKind,
    /// URL to render; `None` when the type has no preview
    pub url: Option<String>,
    /// Direct public URL rebuilt from the storage path, to retry once if `url` fails
    pub fallback_url: Option<String>,
}

/// Service for files attached to an equipment record.
///
/// The `attachments` column is the only list of record. Every mutation re-reads it right
/// before writing the full list back (last write wins).
pub struct AttachmentService {
    store: Arc<dyn EquipmentStore>,
    storage: Arc<dyn ObjectStorage>,
}

impl AttachmentService {
    pub fn new(store: Arc<dyn EquipmentStore>, storage: Arc<dyn ObjectStorage>) -> Self {
        Self { store, storage }
    }

    /// Check size and type; runs before any storage or database call
    pub fn validate(file: &UploadedFile) -> Result<()> {
        if file.size() > MAX_ATTACHMENT_SIZE {
            return Err(AppError::Validation(format!(
                "File '{}' is too large. Maximum size is 50MB",
                file.file_name
            )));
        }

        if !ALLOWED_ATTACHMENT_TYPES.contains(&file.content_type.as_str()) {
            return Err(AppError::Validation(format!(
                "File type '{}' is not allowed. Allowed types: JPEG, PNG, GIF, PDF, DOC, DOCX",
                file.content_type
            )));
        }

        Ok(())
    }

    /// Storage path: `{equipmentId}/{timestamp}-{fileName}`
    pub fn storage_path(equipment_id: Uuid, file_name: &str, timestamp_millis: i64) -> String {
        format!(
            "{}/{}-{}",
            equipment_id,
            timestamp_millis,
            sanitize_file_name(file_name)
        )
    }

    async fn current(&self, equipment_id: Uuid) -> Result<Vec<AttachmentDescriptor>> {
        let raw = self.store.fetch_attachments(equipment_id).await?;
        Ok(parse_attachments(&raw))
    }

    async fn write_back(
        &self,
        equipment_id: Uuid,
        attachments: &[AttachmentDescriptor],
    ) -> Result<()> {
        let value = serde_json::to_value(attachments)
            .map_err(|e| AppError::Internal(format!("Failed to encode attachments: {}", e)))?;
        self.store.write_attachments(equipment_id, value).await
    }

    pub async fn list(
        &self,
        equipment_id: Uuid,
        filter: AttachmentFilter,
    ) -> Result<Vec<AttachmentDescriptor>> {
        let attachments = self.current(equipment_id).await?;
        Ok(filter_attachments(&attachments, filter))
    }

    /// Upload a file and append its descriptor; returns the new descriptor and full list
    pub async fn upload(
        &self,
        equipment_id: Uuid,
        file: UploadedFile,
    ) -> Result<(AttachmentDescriptor, Vec<AttachmentDescriptor>)> {
        Self::validate(&file)?;

        let now = Utc::now();
        let path = Self::storage_path(equipment_id, &file.file_name, now.timestamp_millis());
        let size = file.size();

        self.storage
            .upload(&path, file.data, &file.content_type)
            .await?;

        let descriptor = AttachmentDescriptor {
            name: file.file_name,
            url: self.storage.public_url(&path),
            path: path.clone(),
            content_type: file.content_type,
            size: size as i64,
            equipment_id: Some(equipment_id.to_string()),
            uploaded_at: Some(now.to_rfc3339()),
        };

        let result = async {
            let mut attachments = self.current(equipment_id).await?;
            attachments.push(descriptor.clone());
            self.write_back(equipment_id, &attachments).await?;
            Ok::<_, AppError>(attachments)
        }
        .await;

        match result {
            Ok(attachments) => {
                info!(
                    "Attached '{}' ({} bytes) to equipment {}",
                    descriptor.name, size, equipment_id
                );
                Ok((descriptor, attachments))
            }
            Err(e) => {
                // Do not leave an object that no descriptor points to
                if let Err(cleanup) = self.storage.delete(&path).await {
                    warn!("Could not remove orphaned attachment '{}': {}", path, cleanup);
                }
                Err(e)
            }
        }
    }

    /// Remove the object at `path` and drop its descriptor; returns the remaining list
    pub async fn remove(
        &self,
        equipment_id: Uuid,
        path: &str,
        confirm: bool,
    ) -> Result<Vec<AttachmentDescriptor>> {
        if !confirm {
            return Err(AppError::BadRequest(
                "Removing an attachment must be confirmed".to_string(),
            ));
        }

        let attachments = self.current(equipment_id).await?;
        if !attachments.iter().any(|a| a.path == path) {
            return Err(AppError::NotFound(format!("Attachment '{}' not found", path)));
        }

        self.storage.delete(path).await?;

        let remaining: Vec<AttachmentDescriptor> = self
            .current(equipment_id)
            .await?
            .into_iter()
            .filter(|a| a.path != path)
            .collect();
        self.write_back(equipment_id, &remaining).await?;

        info!("Removed attachment '{}' from equipment {}", path, equipment_id);
        Ok(remaining)
    }

    async fn find(&self, equipment_id: Uuid, path: &str) -> Result<AttachmentDescriptor> {
        self.current(equipment_id)
            .await?
            .into_iter()
            .find(|a| a.path == path)
            .ok_or_else(|| AppError::NotFound(format!("Attachment '{}' not found", path)))
    }

    /// Resolve what the preview dialog should render.
    ///
    /// The stored URL is tried first; if it does not resolve to an object in the bucket,
    /// the direct public URL rebuilt from `path` is used instead.
    pub async fn preview(&self, equipment_id: Uuid, path: &str) -> Result<AttachmentPreview> {
        let attachment = self.find(equipment_id, path).await?;
        let kind = PreviewKind::of(&attachment);

        if kind == PreviewKind::Unavailable {
            return Ok(AttachmentPreview {
                attachment,
                kind,
                url: None,
                fallback_url: None,
            });
        }

        let fallback = self.storage.public_url(&attachment.path);
        let url = if self.primary_resolves(&attachment.url).await {
            attachment.url.clone()
        } else {
            debug!(
                "Preview URL for '{}' did not resolve, using direct URL",
                attachment.path
            );
            fallback.clone()
        };

        let fallback_url = (url != fallback).then_some(fallback);
        Ok(AttachmentPreview {
            attachment,
            kind,
            url: Some(url),
            fallback_url,
        })
    }

    async fn primary_resolves(&self, url: &str) -> bool {
        let Some(key) = self.storage.extract_key_from_url(url) else {
            return false;
        };
        match self.storage.exists(&key).await {
            Ok(found) => found,
            Err(e) => {
                warn!("Could not check preview object '{}': {}", key, e);
                false
            }
        }
    }

    /// Fresh public URL for a download, resolved at request time
    pub async fn download_url(&self, equipment_id: Uuid, path: &str) -> Result<String> {
        let attachment = self.find(equipment_id, path).await?;
        Ok(self.storage.public_url(&attachment.path))
    }
}
