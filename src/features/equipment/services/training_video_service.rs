use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::equipment::models::{SafetyCheck, TrainingVideoRef, UploadedFile};
use crate::features::equipment::services::{
    EquipmentStore, PendingVideo, PreviewRegistry, SchemaReadinessService,
};
use crate::modules::storage::ObjectStorage;

/// Where the training video of one equipment currently stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrainingVideoState {
    Empty,
    /// Selected but not saved; `preview_url` is served from process memory
    LocallyPreviewing {
        file_name: String,
        preview_url: String,
        size: usize,
    },
    Persisted(TrainingVideoRef),
}

/// Service for the safety training video of an equipment record
pub struct TrainingVideoService {
    store: Arc<dyn EquipmentStore>,
    storage: Arc<dyn ObjectStorage>,
    schema: Arc<SchemaReadinessService>,
    previews: Arc<PreviewRegistry>,
}

impl TrainingVideoService {
    pub fn new(
        store: Arc<dyn EquipmentStore>,
        storage: Arc<dyn ObjectStorage>,
        schema: Arc<SchemaReadinessService>,
        previews: Arc<PreviewRegistry>,
    ) -> Self {
        Self {
            store,
            storage,
            schema,
            previews,
        }
    }

    pub fn preview_url(equipment_id: Uuid, token: Uuid) -> String {
        format!(
            "/api/equipment/{}/training-video/preview/{}",
            equipment_id, token
        )
    }

    /// Storage key: `{equipmentId}_training_video_{timestamp}{ext}`
    pub fn storage_key(equipment_id: Uuid, pending: &PendingVideo, timestamp_millis: i64) -> String {
        let file = UploadedFile {
            file_name: pending.file_name.clone(),
            content_type: pending.content_type.clone(),
            data: Vec::new(),
        };
        let extension = file
            .extension()
            .or_else(|| get_extension_from_video_type(&pending.content_type).map(|e| format!(".{}", e)))
            .unwrap_or_default();

        format!(
            "{}_training_video_{}{}",
            equipment_id, timestamp_millis, extension
        )
    }

    fn pending_state(equipment_id: Uuid, pending: &PendingVideo) -> TrainingVideoState {
        TrainingVideoState::LocallyPreviewing {
            file_name: pending.file_name.clone(),
            preview_url: Self::preview_url(equipment_id, pending.token),
            size: pending.data.len(),
        }
    }

    async fn fetch(&self, equipment_id: Uuid) -> Result<SafetyCheck> {
        match self.store.fetch_safety(equipment_id).await {
            Ok(row) => Ok(SafetyCheck::from(row)),
            Err(e) => {
                self.schema.schema_error_seen(&e).await;
                Err(e)
            }
        }
    }

    /// Current state: an unsaved preview wins over the persisted reference
    pub async fn state(&self, equipment_id: Uuid) -> Result<TrainingVideoState> {
        if let Some(pending) = self.previews.pending(equipment_id) {
            return Ok(Self::pending_state(equipment_id, &pending));
        }
        let record = self.fetch(equipment_id).await?;
        Ok(self.state_for(equipment_id, record.training_video.as_ref()))
    }

    /// State derived from an already fetched video reference plus any pending preview
    pub fn state_for(
        &self,
        equipment_id: Uuid,
        persisted: Option<&TrainingVideoRef>,
    ) -> TrainingVideoState {
        match (self.previews.pending(equipment_id), persisted) {
            (Some(pending), _) => Self::pending_state(equipment_id, &pending),
            (None, Some(video)) => TrainingVideoState::Persisted(video.clone()),
            (None, None) => TrainingVideoState::Empty,
        }
    }

    /// Stage a selected file for local preview. No storage call is made.
    ///
    /// The equipment must exist and carry the video fields before anything is staged.
    pub async fn select(
        &self,
        equipment_id: Uuid,
        file: UploadedFile,
    ) -> Result<TrainingVideoState> {
        if file.data.is_empty() {
            return Err(AppError::BadRequest("Selected video file is empty".to_string()));
        }
        self.fetch(equipment_id).await?;
        let pending = self.previews.stage(equipment_id, file);
        debug!(
            "Staged training video preview {} for equipment {}",
            pending.token, equipment_id
        );
        Ok(Self::pending_state(equipment_id, &pending))
    }

    pub fn open_preview(&self, equipment_id: Uuid, token: Uuid) -> Result<PendingVideo> {
        self.previews
            .open(equipment_id, token)
            .ok_or_else(|| AppError::NotFound("Video preview is no longer available".to_string()))
    }

    /// Release an unsaved preview (view torn down)
    pub fn discard_preview(&self, equipment_id: Uuid) -> bool {
        self.previews.release(equipment_id)
    }

    /// Upload the pending preview, if any, and point the record at it.
    ///
    /// The preview is kept when anything fails so the user can retry the save.
    pub async fn commit_pending(&self, equipment_id: Uuid) -> Result<Option<TrainingVideoRef>> {
        let Some(pending) = self.previews.pending(equipment_id) else {
            return Ok(None);
        };

        let previous = self.fetch(equipment_id).await?.training_video;

        let key = Self::storage_key(equipment_id, &pending, Utc::now().timestamp_millis());
        self.storage
            .upload(&key, pending.data.as_ref().clone(), &pending.content_type)
            .await?;

        let video = TrainingVideoRef {
            url: self.storage.public_url(&key),
            name: pending.file_name.clone(),
        };

        if let Err(e) = self.store.set_training_video(equipment_id, Some(&video)).await {
            self.schema.schema_error_seen(&e).await;
            self.remove_object_best_effort(&video.url).await;
            return Err(e);
        }

        self.previews.release_token(equipment_id, pending.token);
        info!(
            "Training video saved for equipment {}: {}",
            equipment_id, video.url
        );

        if let Some(previous) = previous.filter(|p| p.url != video.url) {
            self.remove_object_best_effort(&previous.url).await;
        }

        Ok(Some(video))
    }

    /// Save action for the video alone
    pub async fn save(&self, equipment_id: Uuid) -> Result<TrainingVideoState> {
        match self.commit_pending(equipment_id).await? {
            Some(video) => Ok(TrainingVideoState::Persisted(video)),
            None => self.state(equipment_id).await,
        }
    }

    /// Delete the current video.
    ///
    /// An unsaved preview is simply released, uncovering any saved video. A saved video
    /// needs `confirm`; its object is removed best effort and both reference fields are
    /// always cleared.
    pub async fn delete(&self, equipment_id: Uuid, confirm: bool) -> Result<TrainingVideoState> {
        if self.previews.release(equipment_id) {
            return self.state(equipment_id).await;
        }

        let row = match self.store.fetch_safety(equipment_id).await {
            Ok(row) => row,
            Err(e) => {
                self.schema.schema_error_seen(&e).await;
                return Err(e);
            }
        };
        if row.training_video_url.is_none() && row.training_video_name.is_none() {
            return Ok(TrainingVideoState::Empty);
        }

        if !confirm {
            return Err(AppError::BadRequest(
                "Deleting the saved training video must be confirmed".to_string(),
            ));
        }

        if let Some(url) = row.training_video_url.as_deref() {
            self.remove_object_best_effort(url).await;
        }

        if let Err(e) = self.store.set_training_video(equipment_id, None).await {
            self.schema.schema_error_seen(&e).await;
            return Err(e);
        }

        info!("Training video removed from equipment {}", equipment_id);
        Ok(TrainingVideoState::Empty)
    }

    async fn remove_object_best_effort(&self, url: &str) {
        let Some(key) = self.storage.extract_key_from_url(url) else {
            warn!("Training video URL is not in bucket '{}': {}", self.storage.bucket_name(), url);
            return;
        };
        if let Err(e) = self.storage.delete(&key).await {
            warn!("Could not remove training video '{}' (ignored): {}", key, e);
        }
    }
}

/// Get file extension from video content type
fn get_extension_from_video_type(content_type: &str) -> Option<&'static str> {
    match content_type {
        "video/mp4" => Some("mp4"),
        "video/mpeg" => Some("mpeg"),
        "video/quicktime" => Some("mov"),
        "video/x-msvideo" => Some("avi"),
        "video/webm" => Some("webm"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{video_file, TestBackend};
    use std::time::Duration;

    #[test]
    fn test_storage_key_format() {
        let id = Uuid::nil();
        let pending = PendingVideo {
            token: Uuid::new_v4(),
            file_name: "Forklift Intro.MOV".to_string(),
            content_type: "video/quicktime".to_string(),
            data: Arc::new(Vec::new()),
        };
        assert_eq!(
            TrainingVideoService::storage_key(id, &pending, 1_700_000_000_000),
            format!("{}_training_video_1700000000000.mov", id)
        );

        let no_ext = PendingVideo {
            file_name: "clip".to_string(),
            content_type: "video/webm".to_string(),
            ..pending
        };
        assert!(TrainingVideoService::storage_key(id, &no_ext, 1).ends_with("_1.webm"));
    }

    #[tokio::test]
    async fn test_select_makes_no_storage_call() {
        let backend = TestBackend::ready();
        let id = backend.store.insert_equipment("Lathe");

        let state = backend.videos.select(id, video_file("intro.mp4", 1024)).await.unwrap();

        assert!(matches!(state, TrainingVideoState::LocallyPreviewing { .. }));
        assert_eq!(backend.video_storage.upload_calls(), 0);
    }

    #[tokio::test]
    async fn test_save_persists_storage_url_not_preview_url() {
        let backend = TestBackend::ready();
        let id = backend.store.insert_equipment("Lathe");
        let preview = match backend.videos.select(id, video_file("intro.mp4", 1024)).await.unwrap() {
            TrainingVideoState::LocallyPreviewing { preview_url, .. } => preview_url,
            other => panic!("expected preview, got {:?}", other),
        };

        let saved = backend.videos.save(id).await.unwrap();

        let row = backend.store.row(id);
        let url = row.training_video_url.unwrap();
        assert_ne!(url, preview);
        assert!(url.starts_with("http://storage.test/training-videos/"));
        assert_eq!(row.training_video_name.as_deref(), Some("intro.mp4"));
        assert!(matches!(saved, TrainingVideoState::Persisted(_)));
        assert_eq!(backend.previews.len(), 0);

        // Reload shows the persisted reference
        match backend.videos.state(id).await.unwrap() {
            TrainingVideoState::Persisted(video) => assert_eq!(video.url, url),
            other => panic!("expected persisted, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failed_upload_keeps_preview() {
        let backend = TestBackend::ready();
        let id = backend.store.insert_equipment("Lathe");
        backend.videos.select(id, video_file("intro.mp4", 1024)).await.unwrap();
        backend.video_storage.fail_uploads(true);

        assert!(backend.videos.save(id).await.is_err());

        assert_eq!(backend.previews.len(), 1);
        assert!(backend.store.row(id).training_video_url.is_none());
    }

    #[tokio::test]
    async fn test_container_rejects_non_video() {
        let backend = TestBackend::ready();
        let id = backend.store.insert_equipment("Lathe");
        let mut file = video_file("notes.pdf", 10);
        file.content_type = "application/pdf".to_string();
        backend.videos.select(id, file).await.unwrap();

        let err = backend.videos.save(id).await.unwrap_err();

        assert!(matches!(err, AppError::Storage(_)));
    }

    #[tokio::test]
    async fn test_delete_unsaved_preview_makes_no_storage_call() {
        let backend = TestBackend::ready();
        let id = backend.store.insert_equipment("Lathe");
        backend.videos.select(id, video_file("intro.mp4", 1024)).await.unwrap();

        let state = backend.videos.delete(id, false).await.unwrap();

        assert_eq!(state, TrainingVideoState::Empty);
        assert_eq!(backend.video_storage.delete_calls(), 0);
        assert_eq!(backend.previews.len(), 0);
    }

    #[tokio::test]
    async fn test_select_for_unknown_equipment_stages_nothing() {
        let backend = TestBackend::ready();

        let err = backend
            .videos
            .select(Uuid::new_v4(), video_file("x.mp4", 1024))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(backend.previews.len(), 0);
    }

    #[tokio::test]
    async fn test_select_before_setup_stages_nothing() {
        let backend = TestBackend::needs_setup();
        let id = backend.store.insert_equipment("Lathe");

        let err = backend
            .videos
            .select(id, video_file("x.mp4", 1024))
            .await
            .unwrap_err();

        assert!(err.is_setup_required());
        assert_eq!(backend.previews.len(), 0);
    }

    #[tokio::test]
    async fn test_discarding_preview_over_saved_video_shows_saved_video() {
        let backend = TestBackend::ready();
        let id = backend.store.insert_equipment("Lathe");
        backend.videos.select(id, video_file("v1.mp4", 8)).await.unwrap();
        backend.videos.save(id).await.unwrap();
        backend.videos.select(id, video_file("v2.mp4", 8)).await.unwrap();

        let state = backend.videos.delete(id, false).await.unwrap();

        match state {
            TrainingVideoState::Persisted(video) => assert_eq!(video.name, "v1.mp4"),
            other => panic!("expected saved video, got {:?}", other),
        }
        assert_eq!(backend.video_storage.delete_calls(), 0);
        assert!(backend.store.row(id).training_video_url.is_some());
    }

    #[tokio::test]
    async fn test_delete_saved_video_clears_fields_even_if_storage_fails() {
        let backend = TestBackend::ready();
        let id = backend.store.insert_equipment("Lathe");
        backend.videos.select(id, video_file("intro.mp4", 1024)).await.unwrap();
        backend.videos.save(id).await.unwrap();
        backend.video_storage.fail_deletes(true);

        let state = backend.videos.delete(id, true).await.unwrap();

        assert_eq!(state, TrainingVideoState::Empty);
        assert_eq!(backend.video_storage.delete_calls(), 1);
        let row = backend.store.row(id);
        assert!(row.training_video_url.is_none());
        assert!(row.training_video_name.is_none());
    }

    #[tokio::test]
    async fn test_delete_saved_video_requires_confirmation() {
        let backend = TestBackend::ready();
        let id = backend.store.insert_equipment("Lathe");
        backend.videos.select(id, video_file("intro.mp4", 1024)).await.unwrap();
        backend.videos.save(id).await.unwrap();

        let err = backend.videos.delete(id, false).await.unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(backend.store.row(id).training_video_url.is_some());
        assert_eq!(backend.video_storage.delete_calls(), 0);
    }

    #[tokio::test]
    async fn test_replacing_video_removes_previous_object() {
        let backend = TestBackend::ready();
        let id = backend.store.insert_equipment("Lathe");
        backend.videos.select(id, video_file("v1.mp4", 8)).await.unwrap();
        backend.videos.save(id).await.unwrap();
        tokio::time::sleep(Duration::from_millis(2)).await;
        backend.videos.select(id, video_file("v2.mp4", 8)).await.unwrap();

        backend.videos.save(id).await.unwrap();

        assert_eq!(backend.video_storage.object_count(), 1);
        assert_eq!(
            backend.store.row(id).training_video_name.as_deref(),
            Some("v2.mp4")
        );
    }
}
