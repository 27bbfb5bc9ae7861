mod attachment;
mod equipment;
mod panel;
mod safety;
mod upload;

pub use attachment::{
    filter_attachments, parse_attachments, AttachmentDescriptor, AttachmentFilter, PreviewKind,
};
pub use equipment::{EquipmentSafetyRow, SafetyCheck, SafetyUpdate, TrainingVideoRef};
pub use panel::{PanelTab, PanelView, SafetyDraft, SafetyPanel};
pub use safety::{
    parse_officer_ids, SafetyFrequency, StoredInstructions, SAFETY_INSTRUCTION_CATALOG,
};
pub use upload::UploadedFile;
