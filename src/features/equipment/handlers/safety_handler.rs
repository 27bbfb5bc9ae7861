use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::extractor::ValidatedJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::equipment::dtos::{SafetyFormDto, SafetyPanelDto};
use crate::features::equipment::services::SafetyPanelService;
use crate::shared::types::ApiResponse;

/// Safety panel, view tab
///
/// Renders only the setup action when the safety-check fields are missing.
#[utoipa::path(
    get,
    path = "/api/equipment/{id}/safety",
    tag = "equipment",
    params(
        ("id" = Uuid, Path, description = "Equipment ID")
    ),
    responses(
        (status = 200, description = "Panel rendered", body = ApiResponse<SafetyPanelDto>),
        (status = 404, description = "Equipment not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_safety_panel(
    _user: AuthenticatedUser,
    State(service): State<Arc<SafetyPanelService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<SafetyPanelDto>>> {
    let snapshot = service.open_view(id).await?;
    Ok(Json(ApiResponse::success(
        Some(SafetyPanelDto::render(&snapshot)),
        None,
        None,
    )))
}

/// Safety panel, edit tab seeded from the current record
#[utoipa::path(
    get,
    path = "/api/equipment/{id}/safety/edit",
    tag = "equipment",
    params(
        ("id" = Uuid, Path, description = "Equipment ID")
    ),
    responses(
        (status = 200, description = "Edit form rendered", body = ApiResponse<SafetyPanelDto>),
        (status = 404, description = "Equipment not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn edit_safety_panel(
    _user: AuthenticatedUser,
    State(service): State<Arc<SafetyPanelService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<SafetyPanelDto>>> {
    let snapshot = service.open_edit(id).await?;
    Ok(Json(ApiResponse::success(
        Some(SafetyPanelDto::render(&snapshot)),
        None,
        None,
    )))
}

/// Save the safety check
///
/// A pending training video is uploaded first. On failure the body still carries the
/// edit tab with the submitted form so it can be retried.
#[utoipa::path(
    put,
    path = "/api/equipment/{id}/safety",
    tag = "equipment",
    params(
        ("id" = Uuid, Path, description = "Equipment ID")
    ),
    request_body = SafetyFormDto,
    responses(
        (status = 200, description = "Saved, back on the view tab", body = ApiResponse<SafetyPanelDto>),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Safety check fields need setup", body = ApiResponse<SafetyPanelDto>),
        (status = 422, description = "Manager or officer cannot be referenced", body = ApiResponse<SafetyPanelDto>),
        (status = 502, description = "Video upload failed", body = ApiResponse<SafetyPanelDto>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn save_safety_check(
    user: AuthenticatedUser,
    State(service): State<Arc<SafetyPanelService>>,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<SafetyFormDto>,
) -> Result<Response> {
    let draft = dto.into_draft()?;

    tracing::debug!("Safety check save on equipment {} by {}", id, user.sub);
    let outcome = service.save(id, draft).await?;
    let panel = SafetyPanelDto::render(&outcome.snapshot);

    let response = match outcome.error {
        None => Json(ApiResponse::success(
            Some(panel),
            Some("Safety check saved".to_string()),
            None,
        ))
        .into_response(),
        Some(error) => {
            let (status, message, errors) = error.response_parts();
            (
                status,
                Json(ApiResponse::failure(
                    Some(panel),
                    Some(format!("Failed to save safety check: {}", message)),
                    errors,
                )),
            )
                .into_response()
        }
    };

    Ok(response)
}
