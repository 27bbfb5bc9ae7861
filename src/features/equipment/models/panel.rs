use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::equipment::SafetyCheck;
use super::safety::SafetyFrequency;

/// Tab shown by the safety panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum PanelTab {
    #[default]
    View,
    Edit,
}

/// Editable copy of a safety configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafetyDraft {
    pub frequency: SafetyFrequency,
    pub instructions: Vec<String>,
    pub manager_id: Option<Uuid>,
    pub authorized_officers: Vec<Uuid>,
}

impl From<&SafetyCheck> for SafetyDraft {
    fn from(check: &SafetyCheck) -> Self {
        Self {
            frequency: check.frequency,
            instructions: check.instructions.clone(),
            manager_id: check.manager_id,
            authorized_officers: check.authorized_officers.clone(),
        }
    }
}

/// What the panel currently renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelView<'a> {
    /// Nothing fetched yet
    Empty,
    /// Only the setup action; view and edit content are suppressed
    SetupOnly { missing_fields: &'a [String] },
    View(&'a SafetyCheck),
    Edit {
        record: &'a SafetyCheck,
        draft: &'a SafetyDraft,
    },
}

/// View/edit state machine for one equipment's safety configuration.
///
/// Starts in `View`. Entering `Edit` seeds the draft from the last successfully
/// fetched record; a failed save stays in `Edit` with the draft intact.
#[derive(Debug, Clone, Default)]
pub struct SafetyPanel {
    tab: PanelTab,
    missing_fields: Option<Vec<String>>,
    record: Option<SafetyCheck>,
    draft: Option<SafetyDraft>,
}

impl SafetyPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tab(&self) -> PanelTab {
        self.tab
    }

    /// Last successfully fetched record
    pub fn record(&self) -> Option<&SafetyCheck> {
        self.record.as_ref()
    }

    pub fn needs_setup(&mut self, missing_fields: Vec<String>) {
        self.missing_fields = Some(missing_fields);
        self.draft = None;
        self.tab = PanelTab::View;
    }

    pub fn loaded(&mut self, record: SafetyCheck) {
        self.missing_fields = None;
        self.record = Some(record);
    }

    /// Switch to `Edit`; returns false when there is nothing to edit yet
    pub fn enter_edit(&mut self) -> bool {
        if self.missing_fields.is_some() {
            return false;
        }
        let Some(record) = &self.record else {
            return false;
        };
        self.draft = Some(SafetyDraft::from(record));
        self.tab = PanelTab::Edit;
        true
    }

    pub fn draft_mut(&mut self) -> Option<&mut SafetyDraft> {
        self.draft.as_mut()
    }

    pub fn save_succeeded(&mut self, saved: SafetyCheck) {
        self.record = Some(saved);
        self.draft = None;
        self.tab = PanelTab::View;
    }

    pub fn save_failed(&mut self) {
        // Draft stays so the user can retry without re-entering data
        self.tab = PanelTab::Edit;
    }

    pub fn view(&self) -> PanelView<'_> {
        if let Some(missing_fields) = &self.missing_fields {
            return PanelView::SetupOnly { missing_fields };
        }
        match (&self.record, self.tab, &self.draft) {
            (Some(record), PanelTab::Edit, Some(draft)) => PanelView::Edit { record, draft },
            (Some(record), _, _) => PanelView::View(record),
            (None, _, _) => PanelView::Empty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> SafetyCheck {
        SafetyCheck {
            equipment_id: Uuid::new_v4(),
            equipment_name: "Scissor lift".to_string(),
            frequency: SafetyFrequency::Weekly,
            instructions: vec!["Emergency stop functions correctly".to_string()],
            manager_id: None,
            authorized_officers: Vec::new(),
            training_video: None,
        }
    }

    #[test]
    fn test_starts_in_view() {
        let panel = SafetyPanel::new();
        assert_eq!(panel.tab(), PanelTab::View);
        assert_eq!(panel.view(), PanelView::Empty);
    }

    #[test]
    fn test_edit_is_seeded_from_last_fetch() {
        let mut panel = SafetyPanel::new();
        let fetched = record();
        panel.loaded(fetched.clone());

        assert!(panel.enter_edit());
        match panel.view() {
            PanelView::Edit { draft, .. } => {
                assert_eq!(draft.frequency, SafetyFrequency::Weekly);
                assert_eq!(draft.instructions, fetched.instructions);
            }
            other => panic!("expected edit view, got {:?}", other),
        }
    }

    #[test]
    fn test_failed_save_keeps_draft() {
        let mut panel = SafetyPanel::new();
        panel.loaded(record());
        panel.enter_edit();
        panel.draft_mut().unwrap().frequency = SafetyFrequency::Daily;

        panel.save_failed();

        assert_eq!(panel.tab(), PanelTab::Edit);
        match panel.view() {
            PanelView::Edit { draft, .. } => assert_eq!(draft.frequency, SafetyFrequency::Daily),
            other => panic!("expected edit view, got {:?}", other),
        }
    }

    #[test]
    fn test_successful_save_returns_to_view() {
        let mut panel = SafetyPanel::new();
        panel.loaded(record());
        panel.enter_edit();

        let mut saved = record();
        saved.frequency = SafetyFrequency::Annually;
        panel.save_succeeded(saved.clone());

        assert_eq!(panel.tab(), PanelTab::View);
        assert_eq!(panel.view(), PanelView::View(&saved));
    }

    #[test]
    fn test_setup_suppresses_view_and_edit() {
        let mut panel = SafetyPanel::new();
        panel.loaded(record());
        panel.needs_setup(vec!["safety_frequency".to_string()]);

        assert!(!panel.enter_edit());
        assert!(matches!(panel.view(), PanelView::SetupOnly { .. }));
    }
}
