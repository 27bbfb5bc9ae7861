// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// Invitation roles that make a person eligible as safety manager
pub const MANAGER_ROLES: &[&str] = &[
    "manager",
    "site_manager",
    "facility_manager",
    "operations_manager",
    "admin",
];

/// Invitation roles that make a person eligible as authorized safety officer
pub const SAFETY_OFFICER_ROLES: &[&str] = &[
    "safety_officer",
    "safety_manager",
    "health_and_safety",
    "inspector",
    "compliance_officer",
];

/// Keyword matched against free-text `user_type` values for managers
pub const MANAGER_KEYWORD: &str = "manager";

/// Keyword matched against free-text `user_type` values for safety officers
pub const SAFETY_KEYWORD: &str = "safety";
