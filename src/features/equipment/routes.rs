use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::features::equipment::handlers;
use crate::features::equipment::services::{
    AttachmentService, SafetyPanelService, SchemaReadinessService, TrainingVideoService,
    MAX_ATTACHMENT_SIZE,
};

/// Multipart overhead allowed on top of the file itself
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Services behind the equipment routes
#[derive(Clone)]
pub struct EquipmentServices {
    pub schema: Arc<SchemaReadinessService>,
    pub panel: Arc<SafetyPanelService>,
    pub videos: Arc<TrainingVideoService>,
    pub attachments: Arc<AttachmentService>,
    /// Largest training video accepted in a multipart body
    pub training_video_max_size: usize,
}

/// Create routes for the equipment feature
pub fn routes(services: EquipmentServices) -> Router {
    let schema = Router::new()
        .route("/api/equipment/schema", get(handlers::get_schema_status))
        .route(
            "/api/equipment/{id}/schema/setup",
            post(handlers::setup_schema),
        )
        .with_state(services.schema);

    let safety = Router::new()
        .route(
            "/api/equipment/{id}/safety",
            get(handlers::get_safety_panel).put(handlers::save_safety_check),
        )
        .route(
            "/api/equipment/{id}/safety/edit",
            get(handlers::edit_safety_panel),
        )
        .with_state(services.panel);

    let videos = Router::new()
        .route(
            "/api/equipment/{id}/training-video",
            get(handlers::get_training_video)
                .post(handlers::save_training_video)
                .delete(handlers::delete_training_video),
        )
        .route(
            "/api/equipment/{id}/training-video/preview",
            post(handlers::select_training_video)
                .layer(DefaultBodyLimit::max(
                    services.training_video_max_size + MULTIPART_OVERHEAD,
                ))
                .delete(handlers::discard_training_video_preview),
        )
        .route(
            "/api/equipment/{id}/training-video/preview/{token}",
            get(handlers::stream_training_video_preview),
        )
        .with_state(services.videos);

    let attachments = Router::new()
        .route(
            "/api/equipment/{id}/attachments",
            get(handlers::list_attachments)
                .post(handlers::upload_attachment)
                .layer(DefaultBodyLimit::max(MAX_ATTACHMENT_SIZE + MULTIPART_OVERHEAD))
                .delete(handlers::remove_attachment),
        )
        .route(
            "/api/equipment/{id}/attachments/preview",
            get(handlers::preview_attachment),
        )
        .route(
            "/api/equipment/{id}/attachments/download",
            get(handlers::download_attachment),
        )
        .with_state(services.attachments);

    Router::new()
        .merge(schema)
        .merge(safety)
        .merge(videos)
        .merge(attachments)
}
