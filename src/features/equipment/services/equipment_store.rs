use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{classify_db_error, AppError, Result};
use crate::features::equipment::models::{EquipmentSafetyRow, SafetyUpdate, TrainingVideoRef};

/// Column list for safety-check queries
const SAFETY_COLUMNS: &str = "id, name, safety_frequency, safety_instructions, \
    safety_manager_id, authorized_officers, training_video_url, training_video_name";

/// Relational access to the equipment table.
///
/// Implementations report missing columns as `AppError::SetupRequired` and
/// foreign-key violations as `AppError::ReferentialIntegrity`.
#[async_trait]
pub trait EquipmentStore: Send + Sync {
    /// Names of the columns currently present on the equipment table
    async fn column_names(&self) -> Result<Vec<String>>;

    async fn add_column(&self, name: &str, definition: &str) -> Result<()>;

    async fn fetch_safety(&self, equipment_id: Uuid) -> Result<EquipmentSafetyRow>;

    async fn update_safety(&self, equipment_id: Uuid, update: &SafetyUpdate) -> Result<()>;

    /// Set or clear both training video fields in one statement
    async fn set_training_video(
        &self,
        equipment_id: Uuid,
        video: Option<&TrainingVideoRef>,
    ) -> Result<()>;

    /// Raw `attachments` column (`Value::Null` when unset)
    async fn fetch_attachments(&self, equipment_id: Uuid) -> Result<Value>;

    async fn write_attachments(&self, equipment_id: Uuid, attachments: Value) -> Result<()>;
}

pub struct PgEquipmentStore {
    pool: PgPool,
}

impl PgEquipmentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn not_found(equipment_id: Uuid) -> AppError {
        AppError::NotFound(format!("Equipment {} not found", equipment_id))
    }
}

#[async_trait]
impl EquipmentStore for PgEquipmentStore {
    async fn column_names(&self) -> Result<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT column_name::text FROM information_schema.columns
             WHERE table_schema = current_schema() AND table_name = 'equipment'",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(classify_db_error)
    }

    async fn add_column(&self, name: &str, definition: &str) -> Result<()> {
        let query = format!("ALTER TABLE equipment ADD COLUMN {name} {definition}");
        // Keep the raw error so callers can tell "already exists" apart
        sqlx::query(&query)
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(AppError::Database)
    }

    async fn fetch_safety(&self, equipment_id: Uuid) -> Result<EquipmentSafetyRow> {
        let query = format!("SELECT {SAFETY_COLUMNS} FROM equipment WHERE id = $1");
        sqlx::query_as::<_, EquipmentSafetyRow>(&query)
            .bind(equipment_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify_db_error)?
            .ok_or_else(|| Self::not_found(equipment_id))
    }

    async fn update_safety(&self, equipment_id: Uuid, update: &SafetyUpdate) -> Result<()> {
        let instructions = serde_json::to_value(&update.instructions)
            .map_err(|e| AppError::Internal(format!("Failed to encode instructions: {}", e)))?;
        let officers = update
            .authorized_officers
            .as_ref()
            .map(|ids| Value::Array(ids.iter().map(|id| Value::String(id.to_string())).collect()));

        let result = sqlx::query(
            "UPDATE equipment
             SET safety_frequency = $2,
                 safety_instructions = $3,
                 safety_manager_id = $4,
                 authorized_officers = $5,
                 updated_at = NOW()
             WHERE id = $1",
        )
        .bind(equipment_id)
        .bind(&update.frequency)
        .bind(instructions)
        .bind(update.manager_id)
        .bind(officers)
        .execute(&self.pool)
        .await
        .map_err(classify_db_error)?;

        if result.rows_affected() == 0 {
            return Err(Self::not_found(equipment_id));
        }
        Ok(())
    }

    async fn set_training_video(
        &self,
        equipment_id: Uuid,
        video: Option<&TrainingVideoRef>,
    ) -> Result<()> {
        let result = sqlx::query(
            "UPDATE equipment
             SET training_video_url = $2, training_video_name = $3, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(equipment_id)
        .bind(video.map(|v| v.url.as_str()))
        .bind(video.map(|v| v.name.as_str()))
        .execute(&self.pool)
        .await
        .map_err(classify_db_error)?;

        if result.rows_affected() == 0 {
            return Err(Self::not_found(equipment_id));
        }
        Ok(())
    }

    async fn fetch_attachments(&self, equipment_id: Uuid) -> Result<Value> {
        let row: Option<(Option<Value>,)> =
            sqlx::query_as("SELECT attachments FROM equipment WHERE id = $1")
                .bind(equipment_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(classify_db_error)?;

        row.map(|(attachments,)| attachments.unwrap_or(Value::Null))
            .ok_or_else(|| Self::not_found(equipment_id))
    }

    async fn write_attachments(&self, equipment_id: Uuid, attachments: Value) -> Result<()> {
        let result = sqlx::query(
            "UPDATE equipment SET attachments = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(equipment_id)
        .bind(attachments)
        .execute(&self.pool)
        .await
        .map_err(classify_db_error)?;

        if result.rows_affected() == 0 {
            return Err(Self::not_found(equipment_id));
        }
        Ok(())
    }
}
