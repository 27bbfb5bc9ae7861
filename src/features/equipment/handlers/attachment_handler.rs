use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::Redirect,
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::extractor::ValidatedQuery;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::equipment::dtos::{
    AttachmentListQuery, AttachmentPathQuery, AttachmentPreviewDto, UploadAttachmentDto,
};
use crate::features::equipment::handlers::multipart::read_file_field;
use crate::features::equipment::models::AttachmentDescriptor;
use crate::features::equipment::services::AttachmentService;
use crate::shared::types::{ApiResponse, Meta};

/// List attachments, optionally filtered to images or documents
#[utoipa::path(
    get,
    path = "/api/equipment/{id}/attachments",
    tag = "attachments",
    params(
        ("id" = Uuid, Path, description = "Equipment ID"),
        AttachmentListQuery
    ),
    responses(
        (status = 200, description = "Attachments", body = ApiResponse<Vec<AttachmentDescriptor>>),
        (status = 404, description = "Equipment not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_attachments(
    _user: AuthenticatedUser,
    State(service): State<Arc<AttachmentService>>,
    Path(id): Path<Uuid>,
    Query(query): Query<AttachmentListQuery>,
) -> Result<Json<ApiResponse<Vec<AttachmentDescriptor>>>> {
    let attachments = service.list(id, query.filter).await?;
    let total = attachments.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(attachments),
        None,
        Some(Meta { total }),
    )))
}

/// Upload an attachment
#[utoipa::path(
    post,
    path = "/api/equipment/{id}/attachments",
    tag = "attachments",
    params(
        ("id" = Uuid, Path, description = "Equipment ID")
    ),
    request_body(
        content = UploadAttachmentDto,
        content_type = "multipart/form-data",
    ),
    responses(
        (status = 201, description = "Attachment uploaded", body = ApiResponse<AttachmentDescriptor>),
        (status = 400, description = "File too large or type not allowed"),
        (status = 502, description = "Storage upload failed")
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_attachment(
    _user: AuthenticatedUser,
    State(service): State<Arc<AttachmentService>>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<AttachmentDescriptor>>)> {
    let file = read_file_field(&mut multipart).await?;
    AttachmentService::validate(&file)?;

    let (attachment, all) = service.upload(id, file).await?;
    let total = all.len() as i64;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(attachment),
            Some("File uploaded successfully".to_string()),
            Some(Meta { total }),
        )),
    ))
}

/// Remove an attachment by storage path (`confirm=true` required)
#[utoipa::path(
    delete,
    path = "/api/equipment/{id}/attachments",
    tag = "attachments",
    params(
        ("id" = Uuid, Path, description = "Equipment ID"),
        AttachmentPathQuery
    ),
    responses(
        (status = 200, description = "Remaining attachments", body = ApiResponse<Vec<AttachmentDescriptor>>),
        (status = 400, description = "Confirmation missing"),
        (status = 404, description = "Attachment not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn remove_attachment(
    user: AuthenticatedUser,
    State(service): State<Arc<AttachmentService>>,
    Path(id): Path<Uuid>,
    ValidatedQuery(query): ValidatedQuery<AttachmentPathQuery>,
) -> Result<Json<ApiResponse<Vec<AttachmentDescriptor>>>> {
    tracing::debug!("Attachment '{}' removal by {}", query.path, user.sub);
    let remaining = service.remove(id, &query.path, query.confirm).await?;
    let total = remaining.len() as i64;

    Ok(Json(ApiResponse::success(
        Some(remaining),
        Some("File removed".to_string()),
        Some(Meta { total }),
    )))
}

/// Preview information for an attachment
#[utoipa::path(
    get,
    path = "/api/equipment/{id}/attachments/preview",
    tag = "attachments",
    params(
        ("id" = Uuid, Path, description = "Equipment ID"),
        AttachmentPathQuery
    ),
    responses(
        (status = 200, description = "Preview", body = ApiResponse<AttachmentPreviewDto>),
        (status = 404, description = "Attachment not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn preview_attachment(
    _user: AuthenticatedUser,
    State(service): State<Arc<AttachmentService>>,
    Path(id): Path<Uuid>,
    ValidatedQuery(query): ValidatedQuery<AttachmentPathQuery>,
) -> Result<Json<ApiResponse<AttachmentPreviewDto>>> {
    let preview = service.preview(id, &query.path).await?;
    let message = preview
        .url
        .is_none()
        .then(|| "Preview not available".to_string());

    Ok(Json(ApiResponse::success(
        Some(AttachmentPreviewDto::from(preview)),
        message,
        None,
    )))
}

/// Redirect to a freshly resolved download URL
#[utoipa::path(
    get,
    path = "/api/equipment/{id}/attachments/download",
    tag = "attachments",
    params(
        ("id" = Uuid, Path, description = "Equipment ID"),
        AttachmentPathQuery
    ),
    responses(
        (status = 307, description = "Redirect to the object URL"),
        (status = 404, description = "Attachment not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn download_attachment(
    _user: AuthenticatedUser,
    State(service): State<Arc<AttachmentService>>,
    Path(id): Path<Uuid>,
    ValidatedQuery(query): ValidatedQuery<AttachmentPathQuery>,
) -> Result<Redirect> {
    let url = service.download_url(id, &query.path).await?;
    Ok(Redirect::temporary(&url))
}
