use sqlx::FromRow;
use uuid::Uuid;

/// Database model for an invitation sent to a (future) user
#[derive(Debug, Clone, FromRow)]
#[allow(dead_code)]
pub struct Invitation {
    pub id: Uuid,
    pub email: String,
    pub user_type: Option<String>,
    pub role: Option<String>,
}
