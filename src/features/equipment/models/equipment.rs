use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use super::safety::{parse_officer_ids, SafetyFrequency, StoredInstructions};

/// Safety-check columns of an equipment row
#[derive(Debug, Clone, FromRow)]
pub struct EquipmentSafetyRow {
    pub id: Uuid,
    pub name: String,
    pub safety_frequency: Option<String>,
    pub safety_instructions: Option<Value>,
    pub safety_manager_id: Option<Uuid>,
    pub authorized_officers: Option<Value>,
    pub training_video_url: Option<String>,
    pub training_video_name: Option<String>,
}

/// Reference to a stored training video; url and name always travel together
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingVideoRef {
    pub url: String,
    pub name: String,
}

/// Normalized safety configuration of one piece of equipment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafetyCheck {
    pub equipment_id: Uuid,
    pub equipment_name: String,
    pub frequency: SafetyFrequency,
    pub instructions: Vec<String>,
    pub manager_id: Option<Uuid>,
    pub authorized_officers: Vec<Uuid>,
    pub training_video: Option<TrainingVideoRef>,
}

impl From<EquipmentSafetyRow> for SafetyCheck {
    fn from(row: EquipmentSafetyRow) -> Self {
        // A half-set pair is treated as no video at all
        let training_video = match (row.training_video_url, row.training_video_name) {
            (Some(url), Some(name)) if !url.is_empty() => Some(TrainingVideoRef { url, name }),
            _ => None,
        };

        Self {
            equipment_id: row.id,
            equipment_name: row.name,
            frequency: SafetyFrequency::from_stored(row.safety_frequency.as_deref()),
            instructions: StoredInstructions::from_value(row.safety_instructions.as_ref())
                .into_list(),
            manager_id: row.safety_manager_id,
            authorized_officers: parse_officer_ids(row.authorized_officers.as_ref()),
            training_video,
        }
    }
}

/// Values written by a safety-check save
#[derive(Debug, Clone, PartialEq)]
pub struct SafetyUpdate {
    /// Empty string when not set
    pub frequency: String,
    pub instructions: Vec<String>,
    pub manager_id: Option<Uuid>,
    /// `None` when the officer list is empty
    pub authorized_officers: Option<Vec<Uuid>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row() -> EquipmentSafetyRow {
        EquipmentSafetyRow {
            id: Uuid::new_v4(),
            name: "Forklift 3".to_string(),
            safety_frequency: None,
            safety_instructions: None,
            safety_manager_id: None,
            authorized_officers: None,
            training_video_url: None,
            training_video_name: None,
        }
    }

    #[test]
    fn test_fresh_row_has_nothing_set() {
        let check = SafetyCheck::from(row());
        assert_eq!(check.frequency, SafetyFrequency::None);
        assert!(check.instructions.is_empty());
        assert!(check.manager_id.is_none());
        assert!(check.authorized_officers.is_empty());
        assert!(check.training_video.is_none());
    }

    #[test]
    fn test_video_requires_both_fields() {
        let mut half = row();
        half.training_video_url = Some("http://storage/v.mp4".to_string());
        assert!(SafetyCheck::from(half).training_video.is_none());

        let mut full = row();
        full.training_video_url = Some("http://storage/v.mp4".to_string());
        full.training_video_name = Some("v.mp4".to_string());
        assert!(SafetyCheck::from(full).training_video.is_some());
    }

    #[test]
    fn test_populated_row() {
        let officer = Uuid::new_v4();
        let mut populated = row();
        populated.safety_frequency = Some("quarterly".to_string());
        populated.safety_instructions = Some(json!(["Emergency stop functions correctly"]));
        populated.authorized_officers = Some(json!([officer.to_string()]));

        let check = SafetyCheck::from(populated);
        assert_eq!(check.frequency, SafetyFrequency::Quarterly);
        assert_eq!(check.instructions, vec!["Emergency stop functions correctly"]);
        assert_eq!(check.authorized_officers, vec![officer]);
    }
}
