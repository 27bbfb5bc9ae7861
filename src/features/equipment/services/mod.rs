mod attachment_service;
mod equipment_store;
mod preview_registry;
mod safety_check_service;
mod safety_panel_service;
mod schema_service;
mod training_video_service;

pub use attachment_service::{AttachmentPreview, AttachmentService, MAX_ATTACHMENT_SIZE};
pub use equipment_store::{EquipmentStore, PgEquipmentStore};
pub use preview_registry::{PendingVideo, PreviewRegistry};
pub use safety_check_service::{to_update, SafetyCheckService, SafetyRead};
pub use safety_panel_service::{PanelSnapshot, SafetyPanelService};
pub use schema_service::{
    ColumnOutcome, SchemaReadinessService, SchemaStatus, SetupReport, SAFETY_SCHEMA_VERSION,
};
#[cfg(test)]
pub use schema_service::SAFETY_CHECK_COLUMNS;
pub use training_video_service::{TrainingVideoService, TrainingVideoState};
