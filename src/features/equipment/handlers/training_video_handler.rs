use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::equipment::dtos::{ConfirmQuery, SelectTrainingVideoDto, TrainingVideoDto};
use crate::features::equipment::handlers::multipart::read_file_field;
use crate::features::equipment::services::{TrainingVideoService, TrainingVideoState};
use crate::shared::types::ApiResponse;

fn video_response(state: &TrainingVideoState, message: Option<&str>) -> Json<ApiResponse<TrainingVideoDto>> {
    Json(ApiResponse::success(
        Some(TrainingVideoDto::from(state)),
        message.map(str::to_string),
        None,
    ))
}

/// Current training video of an equipment
#[utoipa::path(
    get,
    path = "/api/equipment/{id}/training-video",
    tag = "training-video",
    params(
        ("id" = Uuid, Path, description = "Equipment ID")
    ),
    responses(
        (status = 200, description = "Video state", body = ApiResponse<TrainingVideoDto>),
        (status = 409, description = "Safety check fields need setup")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_training_video(
    _user: AuthenticatedUser,
    State(service): State<Arc<TrainingVideoService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TrainingVideoDto>>> {
    let state = service.state(id).await?;
    Ok(video_response(&state, None))
}

/// Select a video for local preview; nothing is uploaded until save
#[utoipa::path(
    post,
    path = "/api/equipment/{id}/training-video/preview",
    tag = "training-video",
    params(
        ("id" = Uuid, Path, description = "Equipment ID")
    ),
    request_body(
        content = SelectTrainingVideoDto,
        content_type = "multipart/form-data",
    ),
    responses(
        (status = 200, description = "Preview staged", body = ApiResponse<TrainingVideoDto>),
        (status = 400, description = "No file in the form")
    ),
    security(("bearer_auth" = []))
)]
pub async fn select_training_video(
    _user: AuthenticatedUser,
    State(service): State<Arc<TrainingVideoService>>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<TrainingVideoDto>>> {
    let file = read_file_field(&mut multipart).await?;
    let state = service.select(id, file).await?;
    Ok(video_response(&state, None))
}

/// Stream the bytes of a staged preview
#[utoipa::path(
    get,
    path = "/api/equipment/{id}/training-video/preview/{token}",
    tag = "training-video",
    params(
        ("id" = Uuid, Path, description = "Equipment ID"),
        ("token" = Uuid, Path, description = "Preview token")
    ),
    responses(
        (status = 200, description = "Video bytes", content_type = "video/*"),
        (status = 404, description = "Preview released or replaced")
    ),
    security(("bearer_auth" = []))
)]
pub async fn stream_training_video_preview(
    _user: AuthenticatedUser,
    State(service): State<Arc<TrainingVideoService>>,
    Path((id, token)): Path<(Uuid, Uuid)>,
) -> Result<Response> {
    let pending = service.open_preview(id, token)?;
    Ok((
        [
            (header::CONTENT_TYPE, pending.content_type.clone()),
            (header::CACHE_CONTROL, "no-store".to_string()),
        ],
        Body::from(pending.data.as_ref().clone()),
    )
        .into_response())
}

/// Release the staged preview (view torn down)
#[utoipa::path(
    delete,
    path = "/api/equipment/{id}/training-video/preview",
    tag = "training-video",
    params(
        ("id" = Uuid, Path, description = "Equipment ID")
    ),
    responses(
        (status = 200, description = "Preview released", body = ApiResponse<bool>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn discard_training_video_preview(
    _user: AuthenticatedUser,
    State(service): State<Arc<TrainingVideoService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<bool>>> {
    let released = service.discard_preview(id);
    Ok(Json(ApiResponse::success(Some(released), None, None)))
}

/// Upload the staged video and record it on the equipment
#[utoipa::path(
    post,
    path = "/api/equipment/{id}/training-video",
    tag = "training-video",
    params(
        ("id" = Uuid, Path, description = "Equipment ID")
    ),
    responses(
        (status = 200, description = "Video saved", body = ApiResponse<TrainingVideoDto>),
        (status = 409, description = "Safety check fields need setup"),
        (status = 502, description = "Upload rejected or failed")
    ),
    security(("bearer_auth" = []))
)]
pub async fn save_training_video(
    _user: AuthenticatedUser,
    State(service): State<Arc<TrainingVideoService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TrainingVideoDto>>> {
    let state = service.save(id).await?;
    Ok(video_response(&state, Some("Training video saved")))
}

/// Delete the training video
///
/// An unsaved preview is dropped without touching storage. A saved video needs
/// `confirm=true`.
#[utoipa::path(
    delete,
    path = "/api/equipment/{id}/training-video",
    tag = "training-video",
    params(
        ("id" = Uuid, Path, description = "Equipment ID"),
        ("confirm" = Option<bool>, Query, description = "Required to delete a saved video")
    ),
    responses(
        (status = 200, description = "Video removed", body = ApiResponse<TrainingVideoDto>),
        (status = 400, description = "Confirmation missing")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_training_video(
    user: AuthenticatedUser,
    State(service): State<Arc<TrainingVideoService>>,
    Path(id): Path<Uuid>,
    Query(query): Query<ConfirmQuery>,
) -> Result<Json<ApiResponse<TrainingVideoDto>>> {
    tracing::debug!("Training video delete on equipment {} by {}", id, user.sub);
    let state = service.delete(id, query.confirm).await?;
    Ok(video_response(&state, Some("Training video removed")))
}
