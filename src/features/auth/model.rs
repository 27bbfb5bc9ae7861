use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Caller identity attached to every authenticated request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Subject of the access token
    pub sub: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub roles: Vec<String>,
}

/// Namespaced claims carried by access tokens issued for this service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomClaims {
    #[serde(default)]
    pub roles: Vec<String>,
}
