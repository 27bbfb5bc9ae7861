use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth;
use crate::features::equipment::{
    dtos as equipment_dtos, handlers as equipment_handlers, models as equipment_models,
};
use crate::features::people::{dtos as people_dtos, handlers as people_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // People
        people_handlers::list_people,
        // Schema readiness
        equipment_handlers::get_schema_status,
        equipment_handlers::setup_schema,
        // Safety panel
        equipment_handlers::get_safety_panel,
        equipment_handlers::edit_safety_panel,
        equipment_handlers::save_safety_check,
        // Training video
        equipment_handlers::get_training_video,
        equipment_handlers::select_training_video,
        equipment_handlers::stream_training_video_preview,
        equipment_handlers::discard_training_video_preview,
        equipment_handlers::save_training_video,
        equipment_handlers::delete_training_video,
        // Attachments
        equipment_handlers::list_attachments,
        equipment_handlers::upload_attachment,
        equipment_handlers::remove_attachment,
        equipment_handlers::preview_attachment,
        equipment_handlers::download_attachment,
    ),
    components(
        schemas(
            // Shared
            Meta,
            auth::model::AuthenticatedUser,
            // People
            people_dtos::PersonResponseDto,
            ApiResponse<Vec<people_dtos::PersonResponseDto>>,
            // Equipment models
            equipment_models::AttachmentDescriptor,
            equipment_models::AttachmentFilter,
            equipment_models::PreviewKind,
            equipment_models::PanelTab,
            equipment_models::SafetyFrequency,
            // Equipment DTOs
            equipment_dtos::SchemaStatusDto,
            equipment_dtos::SetupReportDto,
            equipment_dtos::ColumnSetupDto,
            equipment_dtos::ColumnOutcomeDto,
            equipment_dtos::SafetyFormDto,
            equipment_dtos::SafetyFormOptionsDto,
            equipment_dtos::FrequencyOptionDto,
            equipment_dtos::SafetyCheckDto,
            equipment_dtos::OfficerDto,
            equipment_dtos::SafetyPanelDto,
            equipment_dtos::TrainingVideoDto,
            equipment_dtos::TrainingVideoStatusDto,
            equipment_dtos::SelectTrainingVideoDto,
            equipment_dtos::ConfirmQuery,
            equipment_dtos::UploadAttachmentDto,
            equipment_dtos::AttachmentPreviewDto,
            // Response wrappers
            ApiResponse<equipment_dtos::SchemaStatusDto>,
            ApiResponse<equipment_dtos::SetupReportDto>,
            ApiResponse<equipment_dtos::SafetyPanelDto>,
            ApiResponse<equipment_dtos::TrainingVideoDto>,
            ApiResponse<equipment_dtos::AttachmentPreviewDto>,
            ApiResponse<equipment_models::AttachmentDescriptor>,
            ApiResponse<Vec<equipment_models::AttachmentDescriptor>>,
        )
    ),
    tags(
        (name = "people", description = "People eligible for safety assignments"),
        (name = "equipment", description = "Safety check schema, view and edit"),
        (name = "training-video", description = "Safety training video with local preview"),
        (name = "attachments", description = "Equipment file attachments"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "EquipTrack API",
        version = "0.1.0",
        description = "API documentation for EquipTrack equipment safety checks",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to the OpenAPI document
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
