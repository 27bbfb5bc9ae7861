use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::shared::types::ApiResponse;

/// Message shown when a manager or officer reference points outside the profiles table
pub const REFERENTIAL_REMEDIATION: &str = "The selected person could not be linked to this \
    equipment. The referenced table must use the same identifier type as people profiles.";

#[derive(Debug, Error)]
#[allow(dead_code)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Setup required: {0}")]
    SetupRequired(String),

    #[error("Referential integrity error: {0}")]
    ReferentialIntegrity(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl AppError {
    pub fn is_setup_required(&self) -> bool {
        matches!(self, AppError::SetupRequired(_))
    }
}

/// Map a raw database error onto the error taxonomy.
///
/// Missing columns or relations become `SetupRequired`, foreign-key violations become
/// `ReferentialIntegrity`, anything else stays a plain database error.
pub fn classify_db_error(err: sqlx::Error) -> AppError {
    if let Some(db_err) = err.as_database_error() {
        let code = db_err.code().map(|c| c.into_owned()).unwrap_or_default();
        let message = db_err.message().to_string();

        if code == "42703" || code == "42P01" || message.contains("does not exist") {
            return AppError::SetupRequired(message);
        }
        if code == "23503" {
            return AppError::ReferentialIntegrity(REFERENTIAL_REMEDIATION.to_string());
        }
    }
    AppError::Database(err)
}

impl AppError {
    /// Status code, user-visible notice and detail lines; logs server-side failures
    pub fn response_parts(&self) -> (StatusCode, String, Option<Vec<String>>) {
        match self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error occurred".to_string(),
                    None,
                )
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), None),
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                msg.clone(),
                Some(vec![msg.clone()]),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
            AppError::Auth(msg) => (StatusCode::UNAUTHORIZED, msg.clone(), None),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone(), None),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone(), None),
            AppError::SetupRequired(msg) => {
                tracing::warn!("Safety check schema not ready: {}", msg);
                (
                    StatusCode::CONFLICT,
                    "Safety check fields are not set up for equipment yet".to_string(),
                    Some(vec![msg.clone()]),
                )
            }
            AppError::ReferentialIntegrity(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, msg.clone(), None)
            }
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {}", msg);
                (StatusCode::BAD_GATEWAY, msg.clone(), None)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, errors) = self.response_parts();
        let body = Json(ApiResponse::<()>::error(Some(message), errors));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
