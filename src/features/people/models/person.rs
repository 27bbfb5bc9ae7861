use uuid::Uuid;

/// A profile combined with the roles derived for safety assignments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub id: Uuid,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_manager: bool,
    pub is_safety_officer: bool,
}

impl Person {
    /// "First Last", falling back to the email, then the id
    pub fn full_name(&self) -> String {
        let name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if !name.is_empty() {
            name
        } else if let Some(email) = self.email.as_deref().filter(|e| !e.is_empty()) {
            email.to_string()
        } else {
            self.id.to_string()
        }
    }
}
