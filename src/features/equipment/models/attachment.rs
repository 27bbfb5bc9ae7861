use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use utoipa::ToSchema;

/// One file attached to an equipment record, as stored in the `attachments` column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentDescriptor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    /// Storage key; authoritative for every storage operation
    #[serde(default)]
    pub path: String,
    #[serde(rename = "type", default)]
    pub content_type: String,
    #[serde(default)]
    pub size: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<String>,
}

impl AttachmentDescriptor {
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }

    pub fn is_document(&self) -> bool {
        self.content_type == "application/pdf"
            || self.content_type.contains("document")
            || self.content_type.contains("text")
    }
}

/// Attachment list views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentFilter {
    #[default]
    All,
    Images,
    Documents,
}

impl AttachmentFilter {
    pub fn matches(&self, attachment: &AttachmentDescriptor) -> bool {
        match self {
            AttachmentFilter::All => true,
            AttachmentFilter::Images => attachment.is_image(),
            AttachmentFilter::Documents => attachment.is_document(),
        }
    }
}

/// How an attachment can be shown in the preview dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PreviewKind {
    Image,
    Pdf,
    /// "Preview not available"
    Unavailable,
}

impl PreviewKind {
    pub fn of(attachment: &AttachmentDescriptor) -> Self {
        if attachment.is_image() {
            PreviewKind::Image
        } else if attachment.content_type == "application/pdf" {
            PreviewKind::Pdf
        } else {
            PreviewKind::Unavailable
        }
    }
}

pub fn filter_attachments(
    attachments: &[AttachmentDescriptor],
    filter: AttachmentFilter,
) -> Vec<AttachmentDescriptor> {
    attachments
        .iter()
        .filter(|a| filter.matches(a))
        .cloned()
        .collect()
}

/// Read the `attachments` column, which may hold an array or a JSON-encoded string of one
pub fn parse_attachments(value: &Value) -> Vec<AttachmentDescriptor> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match serde_json::from_value(item.clone()) {
                Ok(descriptor) => Some(descriptor),
                Err(e) => {
                    warn!("Skipping unreadable attachment entry {}: {}", item, e);
                    None
                }
            })
            .collect(),
        Value::String(text) if !text.trim().is_empty() => {
            match serde_json::from_str::<Value>(text) {
                Ok(inner @ Value::Array(_)) => parse_attachments(&inner),
                _ => {
                    warn!("Attachments column holds a non-array string, ignoring it");
                    Vec::new()
                }
            }
        }
        _ => Vec::new(),
    }
}
