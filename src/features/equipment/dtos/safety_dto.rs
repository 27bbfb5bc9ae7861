use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::equipment::models::{
    SafetyCheck, SafetyDraft, SafetyFrequency, SAFETY_INSTRUCTION_CATALOG,
};
use crate::features::people::models::Person;

/// Select-field value meaning "not set"
pub const NONE_SENTINEL: &str = "none";

/// Shown when no safety manager is assigned
pub const NOT_ASSIGNED: &str = "Not assigned";

fn none_sentinel() -> String {
    NONE_SENTINEL.to_string()
}

/// Safety-check form as submitted by the edit tab
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct SafetyFormDto {
    /// One of none/daily/weekly/monthly/quarterly/biannually/annually
    #[serde(default = "none_sentinel")]
    #[schema(example = "quarterly")]
    pub frequency: String,
    #[serde(default)]
    #[validate(length(max = 50, message = "At most 50 safety instructions are allowed"))]
    pub instructions: Vec<String>,
    /// Profile id of the safety manager, or "none"
    #[serde(default = "none_sentinel")]
    pub manager_id: String,
    #[serde(default)]
    pub authorized_officers: Vec<Uuid>,
}

impl SafetyFormDto {
    /// Translate select-field sentinels into a typed draft
    pub fn into_draft(self) -> Result<SafetyDraft> {
        let frequency = SafetyFrequency::parse(&self.frequency).ok_or_else(|| {
            AppError::Validation(format!("Unknown safety frequency '{}'", self.frequency))
        })?;

        let manager = self.manager_id.trim();
        let manager_id = if manager.is_empty() || manager == NONE_SENTINEL {
            None
        } else {
            Some(Uuid::parse_str(manager).map_err(|_| {
                AppError::Validation(format!("Invalid safety manager id '{}'", manager))
            })?)
        };

        Ok(SafetyDraft {
            frequency,
            instructions: self.instructions,
            manager_id,
            authorized_officers: self.authorized_officers,
        })
    }
}

impl From<&SafetyDraft> for SafetyFormDto {
    fn from(draft: &SafetyDraft) -> Self {
        Self {
            frequency: draft.frequency.as_str().to_string(),
            instructions: draft.instructions.clone(),
            manager_id: draft
                .manager_id
                .map(|id| id.to_string())
                .unwrap_or_else(none_sentinel),
            authorized_officers: draft.authorized_officers.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FrequencyOptionDto {
    pub value: String,
    pub label: String,
}

/// Options offered by the edit form
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SafetyFormOptionsDto {
    pub frequencies: Vec<FrequencyOptionDto>,
    pub instruction_catalog: Vec<String>,
}

impl SafetyFormOptionsDto {
    pub fn new() -> Self {
        Self {
            frequencies: SafetyFrequency::ALL
                .iter()
                .map(|f| FrequencyOptionDto {
                    value: f.as_str().to_string(),
                    label: f.label().to_string(),
                })
                .collect(),
            instruction_catalog: SAFETY_INSTRUCTION_CATALOG
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OfficerDto {
    pub id: Uuid,
    pub name: String,
}

/// Read-only safety configuration as shown on the view tab
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SafetyCheckDto {
    pub equipment_id: Uuid,
    pub equipment_name: String,
    /// Stored frequency value (empty when not set)
    pub frequency: String,
    /// Human label, e.g. "Every 3 months" or "Not set"
    pub frequency_label: String,
    pub instructions: Vec<String>,
    pub manager_id: Option<Uuid>,
    /// Full name of the manager, or "Not assigned"
    pub manager_name: String,
    pub authorized_officers: Vec<OfficerDto>,
}

fn display_name(id: Uuid, people: &[Person]) -> String {
    people
        .iter()
        .find(|p| p.id == id)
        .map(Person::full_name)
        .unwrap_or_else(|| id.to_string())
}

impl SafetyCheckDto {
    pub fn render(check: &SafetyCheck, people: &[Person]) -> Self {
        Self {
            equipment_id: check.equipment_id,
            equipment_name: check.equipment_name.clone(),
            frequency: check.frequency.to_stored(),
            frequency_label: check.frequency.label().to_string(),
            instructions: check.instructions.clone(),
            manager_id: check.manager_id,
            manager_name: check
                .manager_id
                .map(|id| display_name(id, people))
                .unwrap_or_else(|| NOT_ASSIGNED.to_string()),
            authorized_officers: check
                .authorized_officers
                .iter()
                .map(|id| OfficerDto {
                    id: *id,
                    name: display_name(*id, people),
                })
                .collect(),
        }
    }
}
