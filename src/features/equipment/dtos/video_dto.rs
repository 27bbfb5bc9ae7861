use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::equipment::services::TrainingVideoState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TrainingVideoStatusDto {
    Empty,
    /// Selected but not saved yet
    LocallyPreviewing,
    Persisted,
}

/// Training video slot of an equipment record
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TrainingVideoDto {
    pub status: TrainingVideoStatusDto,
    pub name: Option<String>,
    /// Storage URL when persisted, process-local preview URL while previewing
    pub url: Option<String>,
    pub size: Option<usize>,
}

impl From<&TrainingVideoState> for TrainingVideoDto {
    fn from(state: &TrainingVideoState) -> Self {
        match state {
            TrainingVideoState::Empty => Self {
                status: TrainingVideoStatusDto::Empty,
                name: None,
                url: None,
                size: None,
            },
            TrainingVideoState::LocallyPreviewing {
                file_name,
                preview_url,
                size,
            } => Self {
                status: TrainingVideoStatusDto::LocallyPreviewing,
                name: Some(file_name.clone()),
                url: Some(preview_url.clone()),
                size: Some(*size),
            },
            TrainingVideoState::Persisted(video) => Self {
                status: TrainingVideoStatusDto::Persisted,
                name: Some(video.name.clone()),
                url: Some(video.url.clone()),
                size: None,
            },
        }
    }
}

/// Video selection form for OpenAPI documentation.
/// The handler reads the multipart body directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct SelectTrainingVideoDto {
    /// The video file to preview
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
}

/// `?confirm=true` is required to remove persisted objects
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ConfirmQuery {
    #[serde(default)]
    pub confirm: bool,
}
