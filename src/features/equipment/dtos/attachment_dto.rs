use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::features::equipment::models::{AttachmentDescriptor, AttachmentFilter, PreviewKind};
use crate::features::equipment::services::AttachmentPreview;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct AttachmentListQuery {
    /// all (default), images or documents
    #[serde(default)]
    pub filter: AttachmentFilter,
}

#[derive(Debug, Deserialize, Validate, IntoParams)]
pub struct AttachmentPathQuery {
    /// Storage path of the attachment
    #[validate(length(min = 1, message = "path is required"))]
    pub path: String,
    /// Must be true to remove an attachment
    #[serde(default)]
    pub confirm: bool,
}

/// Attachment upload form for OpenAPI documentation.
/// The handler reads the multipart body directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadAttachmentDto {
    /// JPEG, PNG, GIF, PDF, DOC or DOCX up to 50MB
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AttachmentPreviewDto {
    pub attachment: AttachmentDescriptor,
    pub kind: PreviewKind,
    /// `None` when no preview is available for the type
    pub url: Option<String>,
    /// Direct URL to retry once if `url` fails to render
    pub fallback_url: Option<String>,
}

impl From<AttachmentPreview> for AttachmentPreviewDto {
    fn from(preview: AttachmentPreview) -> Self {
        Self {
            attachment: preview.attachment,
            kind: preview.kind,
            url: preview.url,
            fallback_url: preview.fallback_url,
        }
    }
}
