use sqlx::FromRow;
use uuid::Uuid;

/// Database model for a user profile
#[derive(Debug, Clone, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Free-text account type, e.g. "Site Manager" or "employee"
    pub user_type: Option<String>,
}
