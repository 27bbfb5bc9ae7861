use std::sync::Arc;

use axum::{extract::State, Json};

use crate::core::error::Result;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::people::dtos::PersonResponseDto;
use crate::features::people::services::PeopleService;
use crate::shared::types::{ApiResponse, Meta};

/// List people eligible as safety manager or authorized officer
///
/// A directory read failure still answers 200 with an empty list and a notice.
#[utoipa::path(
    get,
    path = "/api/people",
    tag = "people",
    responses(
        (status = 200, description = "People with derived roles", body = ApiResponse<Vec<PersonResponseDto>>),
        (status = 401, description = "Authentication required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_people(
    _user: AuthenticatedUser,
    State(service): State<Arc<PeopleService>>,
) -> Result<Json<ApiResponse<Vec<PersonResponseDto>>>> {
    let listing = service.list_people().await;
    let total = listing.people.len() as i64;
    let people = listing
        .people
        .into_iter()
        .map(PersonResponseDto::from)
        .collect();

    Ok(Json(ApiResponse::success(
        Some(people),
        listing.notice,
        Some(Meta { total }),
    )))
}
