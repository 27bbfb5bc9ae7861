use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::equipment::models::{
    SafetyCheck, SafetyDraft, SafetyUpdate, SAFETY_INSTRUCTION_CATALOG,
};
use crate::features::equipment::services::{EquipmentStore, SchemaReadinessService, SchemaStatus};

/// Result of reading the safety configuration of one equipment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SafetyRead {
    SetupRequired { missing_fields: Vec<String> },
    Ready(SafetyCheck),
}

pub struct SafetyCheckService {
    store: Arc<dyn EquipmentStore>,
    schema: Arc<SchemaReadinessService>,
}

impl SafetyCheckService {
    pub fn new(store: Arc<dyn EquipmentStore>, schema: Arc<SchemaReadinessService>) -> Self {
        Self { store, schema }
    }

    /// Read the six safety fields, or report that setup is needed first
    pub async fn get(&self, equipment_id: Uuid) -> Result<SafetyRead> {
        if let SchemaStatus::NeedsSetup { missing_fields } = self.schema.status().await? {
            return Ok(SafetyRead::SetupRequired { missing_fields });
        }

        match self.store.fetch_safety(equipment_id).await {
            Ok(row) => Ok(SafetyRead::Ready(SafetyCheck::from(row))),
            Err(e) if e.is_setup_required() => self.setup_state_after(e).await,
            Err(e) => Err(e),
        }
    }

    /// Persist frequency, instructions, manager and officers in one update and read the
    /// record back.
    ///
    /// Instructions must come from the catalog; entries already stored on the record are
    /// kept so legacy free text survives an unedited re-save.
    pub async fn save(&self, equipment_id: Uuid, draft: &SafetyDraft) -> Result<SafetyCheck> {
        let stored = match self.store.fetch_safety(equipment_id).await {
            Ok(row) => SafetyCheck::from(row).instructions,
            Err(e) => {
                self.schema.schema_error_seen(&e).await;
                return Err(e);
            }
        };
        let update = to_update(draft, &stored)?;
        debug!(
            "Saving safety check for equipment {}: frequency='{}', {} instructions, {} officers",
            equipment_id,
            update.frequency,
            update.instructions.len(),
            update.authorized_officers.as_ref().map_or(0, Vec::len)
        );

        if let Err(e) = self.store.update_safety(equipment_id, &update).await {
            self.schema.schema_error_seen(&e).await;
            return Err(e);
        }

        let saved = match self.store.fetch_safety(equipment_id).await {
            Ok(row) => SafetyCheck::from(row),
            Err(e) => {
                self.schema.schema_error_seen(&e).await;
                return Err(e);
            }
        };

        info!("Safety check saved for equipment {}", equipment_id);
        Ok(saved)
    }

    /// Re-probe after a schema error; fall back to the error if the probe says ready
    async fn setup_state_after(&self, error: AppError) -> Result<SafetyRead> {
        self.schema.schema_error_seen(&error).await;
        match self.schema.status().await? {
            SchemaStatus::NeedsSetup { missing_fields } => {
                Ok(SafetyRead::SetupRequired { missing_fields })
            }
            SchemaStatus::Ready => Err(error),
        }
    }
}

/// Translate an edited draft into the persisted representation.
///
/// `stored` holds the instructions currently on the record.
pub fn to_update(draft: &SafetyDraft, stored: &[String]) -> Result<SafetyUpdate> {
    let mut instructions = Vec::with_capacity(draft.instructions.len());
    for instruction in &draft.instructions {
        let trimmed = instruction.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "Safety instructions cannot be empty".to_string(),
            ));
        }
        let known = SAFETY_INSTRUCTION_CATALOG.contains(&trimmed)
            || stored.iter().any(|existing| existing == trimmed);
        if !known {
            return Err(AppError::Validation(format!(
                "Unknown safety instruction '{}'",
                trimmed
            )));
        }
        instructions.push(trimmed.to_string());
    }

    let mut officers: Vec<Uuid> = Vec::with_capacity(draft.authorized_officers.len());
    for officer in &draft.authorized_officers {
        if !officers.contains(officer) {
            officers.push(*officer);
        }
    }

    Ok(SafetyUpdate {
        frequency: draft.frequency.to_stored(),
        instructions,
        manager_id: draft.manager_id,
        authorized_officers: if officers.is_empty() {
            None
        } else {
            Some(officers)
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::equipment::models::{SafetyFrequency, SAFETY_INSTRUCTION_CATALOG};
    use crate::shared::test_helpers::TestBackend;

    fn draft() -> SafetyDraft {
        SafetyDraft {
            frequency: SafetyFrequency::Quarterly,
            instructions: vec![SAFETY_INSTRUCTION_CATALOG[0].to_string()],
            manager_id: None,
            authorized_officers: Vec::new(),
        }
    }

    #[test]
    fn test_to_update_uses_persistence_sentinels() {
        let mut draft = draft();
        draft.frequency = SafetyFrequency::None;

        let update = to_update(&draft, &[]).unwrap();

        assert_eq!(update.frequency, "");
        assert_eq!(update.manager_id, None);
        assert_eq!(update.authorized_officers, None);
    }

    #[test]
    fn test_to_update_rejects_blank_instruction() {
        let mut draft = draft();
        draft.instructions.push("   ".to_string());

        assert!(matches!(to_update(&draft, &[]), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_to_update_dedupes_officers_in_order() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut draft = draft();
        draft.authorized_officers = vec![a, b, a];

        assert_eq!(to_update(&draft, &[]).unwrap().authorized_officers, Some(vec![a, b]));
    }

    #[tokio::test]
    async fn test_get_reports_setup_when_columns_missing() {
        let backend = TestBackend::needs_setup();
        let id = backend.store.insert_equipment("Press");

        match backend.safety.get(id).await.unwrap() {
            SafetyRead::SetupRequired { missing_fields } => assert_eq!(missing_fields.len(), 6),
            other => panic!("expected setup, got {:?}", other),
        }
        assert_eq!(backend.store.fetch_count(), 0);
    }

    #[test]
    fn test_to_update_rejects_instruction_outside_catalog() {
        let mut draft = draft();
        draft.instructions.push("Totally made up instruction".to_string());

        match to_update(&draft, &[]) {
            Err(AppError::Validation(message)) => {
                assert!(message.contains("Totally made up instruction"))
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_to_update_keeps_already_stored_instruction() {
        let legacy = "Check the hydraulic hose clamps".to_string();
        let mut draft = draft();
        draft.instructions.push(legacy.clone());

        let update = to_update(&draft, &[legacy.clone()]).unwrap();

        assert_eq!(update.instructions.last(), Some(&legacy));
    }

    #[tokio::test]
    async fn test_save_rejects_free_text_without_writing() {
        let backend = TestBackend::ready();
        let id = backend.store.insert_equipment("Press");
        let mut draft = draft();
        draft.instructions = vec!["Totally made up instruction".to_string()];

        let err = backend.safety.save(id, &draft).await.unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert!(backend.store.write_log(id).is_empty());
    }

    #[tokio::test]
    async fn test_save_round_trip_is_idempotent() {
        let backend = TestBackend::ready();
        let id = backend.store.insert_equipment("Press");
        let legacy = "Check the hydraulic hose clamps".to_string();
        backend
            .store
            .update_safety(
                id,
                &SafetyUpdate {
                    frequency: String::new(),
                    instructions: vec![legacy.clone()],
                    manager_id: None,
                    authorized_officers: None,
                },
            )
            .await
            .unwrap();
        let mut draft = draft();
        draft.instructions = vec![
            SAFETY_INSTRUCTION_CATALOG[3].to_string(),
            SAFETY_INSTRUCTION_CATALOG[1].to_string(),
            legacy,
        ];

        let first = backend.safety.save(id, &draft).await.unwrap();
        let again = backend
            .safety
            .save(id, &SafetyDraft::from(&first))
            .await
            .unwrap();

        assert_eq!(first.instructions, draft.instructions);
        assert_eq!(again, first);
    }

    #[tokio::test]
    async fn test_schema_error_on_read_turns_into_setup_state() {
        let backend = TestBackend::ready();
        let id = backend.store.insert_equipment("Press");
        backend.safety.get(id).await.unwrap();
        backend.store.drop_safety_columns();

        let read = backend.safety.get(id).await.unwrap();

        assert!(matches!(read, SafetyRead::SetupRequired { .. }));
    }

    #[tokio::test]
    async fn test_unknown_manager_gets_remediation_message() {
        let backend = TestBackend::ready();
        let id = backend.store.insert_equipment("Press");
        backend.store.restrict_people_to(Vec::new());
        let mut draft = draft();
        draft.manager_id = Some(Uuid::new_v4());

        let err = backend.safety.save(id, &draft).await.unwrap_err();

        match err {
            AppError::ReferentialIntegrity(message) => {
                assert!(message.contains("same identifier type"))
            }
            other => panic!("expected referential error, got {:?}", other),
        }
    }
}
