use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::equipment::dtos::{
    SafetyCheckDto, SafetyFormDto, SafetyFormOptionsDto, TrainingVideoDto,
};
use crate::features::equipment::models::{PanelTab, PanelView};
use crate::features::equipment::services::PanelSnapshot;
use crate::features::people::dtos::PersonResponseDto;

/// Rendered safety panel of one equipment.
///
/// With `setup_required` set only the setup action is offered; `view` and `form`
/// are both absent.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SafetyPanelDto {
    pub tab: PanelTab,
    pub setup_required: bool,
    pub missing_fields: Vec<String>,
    /// Summary shown on the view tab
    pub view: Option<SafetyCheckDto>,
    /// Seeded form on the edit tab
    pub form: Option<SafetyFormDto>,
    pub form_options: Option<SafetyFormOptionsDto>,
    pub training_video: TrainingVideoDto,
    pub managers: Vec<PersonResponseDto>,
    pub safety_officers: Vec<PersonResponseDto>,
    /// Set when the people directory could not be loaded
    pub people_notice: Option<String>,
}

impl SafetyPanelDto {
    pub fn render(snapshot: &PanelSnapshot) -> Self {
        let people = &snapshot.people.people;
        let training_video = TrainingVideoDto::from(&snapshot.video);

        let (setup_required, missing_fields, view, form) = match snapshot.panel.view() {
            PanelView::SetupOnly { missing_fields } => (true, missing_fields.to_vec(), None, None),
            PanelView::Empty => (false, Vec::new(), None, None),
            PanelView::View(record) => (
                false,
                Vec::new(),
                Some(SafetyCheckDto::render(record, people)),
                None,
            ),
            PanelView::Edit { record, draft } => (
                false,
                Vec::new(),
                Some(SafetyCheckDto::render(record, people)),
                Some(SafetyFormDto::from(draft)),
            ),
        };

        if setup_required {
            return Self {
                tab: snapshot.panel.tab(),
                setup_required,
                missing_fields,
                view: None,
                form: None,
                form_options: None,
                training_video,
                managers: Vec::new(),
                safety_officers: Vec::new(),
                people_notice: snapshot.people.notice.clone(),
            };
        }

        let form_options = form.as_ref().map(|_| SafetyFormOptionsDto::new());
        Self {
            tab: snapshot.panel.tab(),
            setup_required,
            missing_fields,
            view,
            form,
            form_options,
            training_video,
            managers: people
                .iter()
                .filter(|p| p.is_manager)
                .cloned()
                .map(PersonResponseDto::from)
                .collect(),
            safety_officers: people
                .iter()
                .filter(|p| p.is_safety_officer)
                .cloned()
                .map(PersonResponseDto::from)
                .collect(),
            people_notice: snapshot.people.notice.clone(),
        }
    }
}
