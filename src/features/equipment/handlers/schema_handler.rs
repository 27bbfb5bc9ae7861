use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::equipment::dtos::{SchemaStatusDto, SetupReportDto};
use crate::features::equipment::services::{SchemaReadinessService, SAFETY_SCHEMA_VERSION};
use crate::shared::types::ApiResponse;

/// Whether the safety-check fields exist on equipment records
#[utoipa::path(
    get,
    path = "/api/equipment/schema",
    tag = "equipment",
    responses(
        (status = 200, description = "Cached schema readiness", body = ApiResponse<SchemaStatusDto>),
        (status = 401, description = "Authentication required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_schema_status(
    _user: AuthenticatedUser,
    State(service): State<Arc<SchemaReadinessService>>,
) -> Result<Json<ApiResponse<SchemaStatusDto>>> {
    let status = service.status().await?;
    Ok(Json(ApiResponse::success(
        Some(SchemaStatusDto::new(&status, SAFETY_SCHEMA_VERSION)),
        None,
        None,
    )))
}

/// One-time setup of the safety-check fields and the training video bucket
///
/// Best effort: the report lists every step; `status.ready` tells whether the fields
/// are usable now.
#[utoipa::path(
    post,
    path = "/api/equipment/{id}/schema/setup",
    tag = "equipment",
    params(
        ("id" = Uuid, Path, description = "Equipment ID")
    ),
    responses(
        (status = 200, description = "Setup attempted", body = ApiResponse<SetupReportDto>),
        (status = 401, description = "Authentication required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn setup_schema(
    user: AuthenticatedUser,
    State(service): State<Arc<SchemaReadinessService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<SetupReportDto>>> {
    tracing::info!("Safety check setup requested by {} on equipment {}", user.sub, id);

    let report = SetupReportDto::from(service.setup(id).await?);
    let message = if report.status.ready {
        "Safety check fields are ready"
    } else {
        "Setup finished, but some safety check fields are still missing"
    };

    Ok(Json(ApiResponse::success(
        Some(report),
        Some(message.to_string()),
        None,
    )))
}
