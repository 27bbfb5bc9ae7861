use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::people::models::Person;

/// Person eligible for safety assignments
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PersonResponseDto {
    pub id: Uuid,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: String,
    /// Eligible as safety manager
    pub is_manager: bool,
    /// Eligible as authorized safety officer
    pub is_safety_officer: bool,
}

impl From<Person> for PersonResponseDto {
    fn from(person: Person) -> Self {
        Self {
            full_name: person.full_name(),
            id: person.id,
            email: person.email,
            first_name: person.first_name,
            last_name: person.last_name,
            is_manager: person.is_manager,
            is_safety_officer: person.is_safety_officer,
        }
    }
}
