use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::equipment::models::{SafetyDraft, SafetyPanel};
use crate::features::equipment::services::{
    to_update, SafetyCheckService, SafetyRead, TrainingVideoService, TrainingVideoState,
};
use crate::features::people::services::{PeopleListing, PeopleService};

/// Everything needed to render the safety panel of one equipment
#[derive(Debug)]
pub struct PanelSnapshot {
    pub panel: SafetyPanel,
    pub people: PeopleListing,
    pub video: TrainingVideoState,
}

/// Result of a save; on failure `snapshot` still holds the edit tab with the draft
#[derive(Debug)]
pub struct SaveOutcome {
    pub snapshot: PanelSnapshot,
    pub error: Option<AppError>,
}

/// Drives the view/edit panel: loads people and the safety record together and applies
/// the save ordering (video first, then safety fields).
pub struct SafetyPanelService {
    people: Arc<PeopleService>,
    safety: Arc<SafetyCheckService>,
    videos: Arc<TrainingVideoService>,
}

impl SafetyPanelService {
    pub fn new(
        people: Arc<PeopleService>,
        safety: Arc<SafetyCheckService>,
        videos: Arc<TrainingVideoService>,
    ) -> Self {
        Self {
            people,
            safety,
            videos,
        }
    }

    async fn load(&self, equipment_id: Uuid) -> Result<(SafetyPanel, PeopleListing)> {
        let (people, read) = tokio::join!(self.people.list_people(), self.safety.get(equipment_id));

        let mut panel = SafetyPanel::new();
        match read? {
            SafetyRead::SetupRequired { missing_fields } => panel.needs_setup(missing_fields),
            SafetyRead::Ready(record) => panel.loaded(record),
        }
        Ok((panel, people))
    }

    fn snapshot(&self, equipment_id: Uuid, panel: SafetyPanel, people: PeopleListing) -> PanelSnapshot {
        let persisted = panel.record().and_then(|r| r.training_video.as_ref());
        let video = self.videos.state_for(equipment_id, persisted);
        PanelSnapshot {
            panel,
            people,
            video,
        }
    }

    /// View tab (or the setup-only state)
    pub async fn open_view(&self, equipment_id: Uuid) -> Result<PanelSnapshot> {
        let (panel, people) = self.load(equipment_id).await?;
        Ok(self.snapshot(equipment_id, panel, people))
    }

    /// Edit tab seeded from a fresh fetch
    pub async fn open_edit(&self, equipment_id: Uuid) -> Result<PanelSnapshot> {
        let (mut panel, people) = self.load(equipment_id).await?;
        if !panel.enter_edit() {
            debug!("Equipment {} cannot enter edit, setup is required", equipment_id);
        }
        Ok(self.snapshot(equipment_id, panel, people))
    }

    /// Save the edited draft.
    ///
    /// A pending training video is uploaded and recorded before the safety fields are
    /// written. Any failure leaves the panel in edit with the submitted draft.
    pub async fn save(&self, equipment_id: Uuid, draft: SafetyDraft) -> Result<SaveOutcome> {
        let (mut panel, people) = self.load(equipment_id).await?;

        if !panel.enter_edit() {
            let error = AppError::SetupRequired(
                "Safety check fields must be set up before saving".to_string(),
            );
            return Ok(SaveOutcome {
                snapshot: self.snapshot(equipment_id, panel, people),
                error: Some(error),
            });
        }
        if let Some(current) = panel.draft_mut() {
            *current = draft.clone();
        }

        // Reject an invalid draft before the pending video is uploaded
        let stored = panel
            .record()
            .map(|record| record.instructions.clone())
            .unwrap_or_default();
        if let Err(e) = to_update(&draft, &stored) {
            panel.save_failed();
            return Ok(SaveOutcome {
                snapshot: self.snapshot(equipment_id, panel, people),
                error: Some(e),
            });
        }

        let result = async {
            self.videos.commit_pending(equipment_id).await?;
            self.safety.save(equipment_id, &draft).await
        }
        .await;

        let error = match result {
            Ok(saved) => {
                panel.save_succeeded(saved);
                None
            }
            Err(e) => {
                warn!("Failed to save safety check for equipment {}: {}", equipment_id, e);
                if e.is_setup_required() {
                    if let Ok(SafetyRead::SetupRequired { missing_fields }) =
                        self.safety.get(equipment_id).await
                    {
                        panel.needs_setup(missing_fields);
                    } else {
                        panel.save_failed();
                    }
                } else {
                    panel.save_failed();
                }
                Some(e)
            }
        };

        Ok(SaveOutcome {
            snapshot: self.snapshot(equipment_id, panel, people),
            error,
        })
    }
}
