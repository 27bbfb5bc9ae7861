use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::modules::storage::{BucketProvision, ObjectStorage};

/// Version of the safety-check column set provisioned by `setup`
pub const SAFETY_SCHEMA_VERSION: u32 = 1;

/// Optional equipment columns needed by the safety-check feature
pub const SAFETY_CHECK_COLUMNS: [(&str, &str); 6] = [
    ("safety_frequency", "TEXT"),
    ("safety_instructions", "JSONB"),
    (
        "safety_manager_id",
        "UUID REFERENCES profiles(id) ON DELETE SET NULL",
    ),
    ("authorized_officers", "JSONB"),
    ("training_video_url", "TEXT"),
    ("training_video_name", "TEXT"),
];

/// Whether the equipment table carries the safety-check columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaStatus {
    Ready,
    NeedsSetup { missing_fields: Vec<String> },
}

impl SchemaStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, SchemaStatus::Ready)
    }
}

/// Outcome of provisioning one column
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnOutcome {
    Added,
    AlreadyPresent,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct SetupReport {
    pub schema_version: u32,
    pub columns: Vec<(String, ColumnOutcome)>,
    /// `Err` carries the reason the video container could not be provisioned
    pub video_bucket: std::result::Result<BucketProvision, String>,
    pub status: SchemaStatus,
}

/// Detects and provisions the safety-check schema.
///
/// The probe result is cached for the lifetime of the process and invalidated when a
/// write reports a missing column.
pub struct SchemaReadinessService {
    store: Arc<dyn super::EquipmentStore>,
    video_storage: Arc<dyn ObjectStorage>,
    cached: RwLock<Option<SchemaStatus>>,
}

impl SchemaReadinessService {
    pub fn new(
        store: Arc<dyn super::EquipmentStore>,
        video_storage: Arc<dyn ObjectStorage>,
    ) -> Self {
        Self {
            store,
            video_storage,
            cached: RwLock::new(None),
        }
    }

    /// Cached readiness, probing the schema on first use
    pub async fn status(&self) -> Result<SchemaStatus> {
        if let Some(status) = self.cached.read().await.as_ref() {
            return Ok(status.clone());
        }

        let status = self.probe().await?;
        *self.cached.write().await = Some(status.clone());
        Ok(status)
    }

    /// Forget the cached result so the next `status` call probes again
    pub async fn invalidate(&self) {
        *self.cached.write().await = None;
    }

    async fn probe(&self) -> Result<SchemaStatus> {
        let present = self.store.column_names().await?;
        let missing_fields: Vec<String> = SAFETY_CHECK_COLUMNS
            .iter()
            .map(|(name, _)| *name)
            .filter(|name| !present.iter().any(|p| p == name))
            .map(String::from)
            .collect();

        if missing_fields.is_empty() {
            info!("Safety check schema v{} is ready", SAFETY_SCHEMA_VERSION);
            Ok(SchemaStatus::Ready)
        } else {
            warn!(
                "Safety check schema needs setup, missing fields: {}",
                missing_fields.join(", ")
            );
            Ok(SchemaStatus::NeedsSetup { missing_fields })
        }
    }

    /// One-time setup action.
    ///
    /// Best effort: every step is attempted and logged, and the report is returned even
    /// when steps fail. The re-probe in the report tells whether the fields are usable.
    pub async fn setup(&self, equipment_id: Uuid) -> Result<SetupReport> {
        let mut columns = Vec::with_capacity(SAFETY_CHECK_COLUMNS.len());

        for (name, definition) in SAFETY_CHECK_COLUMNS {
            let outcome = match self.store.add_column(name, definition).await {
                Ok(()) => {
                    info!("Added equipment column '{}'", name);
                    ColumnOutcome::Added
                }
                Err(e) => {
                    let message = e.to_string();
                    if message.contains("already exists") {
                        info!("Equipment column '{}' already exists", name);
                        ColumnOutcome::AlreadyPresent
                    } else if message.contains("does not exist") {
                        info!("Could not add column '{}', schema is absent: {}", name, message);
                        ColumnOutcome::Failed(message)
                    } else {
                        warn!("Failed to add equipment column '{}': {}", name, message);
                        ColumnOutcome::Failed(message)
                    }
                }
            };
            columns.push((name.to_string(), outcome));
        }

        let video_bucket = match self.video_storage.ensure_bucket().await {
            Ok(provision) => {
                info!(
                    "Training video bucket '{}' ready ({:?})",
                    self.video_storage.bucket_name(),
                    provision
                );
                Ok(provision)
            }
            Err(e) => {
                warn!("Failed to provision training video bucket: {}", e);
                Err(e.to_string())
            }
        };

        self.invalidate().await;
        let status = self.status().await?;

        if status.is_ready() {
            if let Err(e) = self.store.fetch_safety(equipment_id).await {
                warn!(
                    "Setup finished but equipment {} could not be read back: {}",
                    equipment_id, e
                );
            }
        }

        Ok(SetupReport {
            schema_version: SAFETY_SCHEMA_VERSION,
            columns,
            video_bucket,
            status,
        })
    }

    /// Record that a read or write hit a missing column
    pub async fn schema_error_seen(&self, error: &AppError) {
        if error.is_setup_required() {
            warn!("Schema error seen, re-checking safety check schema: {}", error);
            self.invalidate().await;
        }
    }
}
