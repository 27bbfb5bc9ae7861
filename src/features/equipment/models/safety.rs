use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use utoipa::ToSchema;
use uuid::Uuid;

/// Canned instructions offered by the edit form
pub const SAFETY_INSTRUCTION_CATALOG: [&str; 10] = [
    "Equipment exterior is clean and free of damage",
    "All safety guards and covers are in place",
    "Emergency stop functions correctly",
    "Warning labels and signage are legible",
    "No visible leaks of oil, fuel or coolant",
    "Electrical cords and plugs are undamaged",
    "Operator is wearing the required protective equipment",
    "Controls and indicators operate as expected",
    "Work area around the equipment is clear of hazards",
    "Lockout/tagout points are accessible and labelled",
];

/// How often the safety check must be performed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum SafetyFrequency {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Biannually,
    Annually,
}

impl SafetyFrequency {
    pub const ALL: [SafetyFrequency; 7] = [
        SafetyFrequency::None,
        SafetyFrequency::Daily,
        SafetyFrequency::Weekly,
        SafetyFrequency::Monthly,
        SafetyFrequency::Quarterly,
        SafetyFrequency::Biannually,
        SafetyFrequency::Annually,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SafetyFrequency::None => "none",
            SafetyFrequency::Daily => "daily",
            SafetyFrequency::Weekly => "weekly",
            SafetyFrequency::Monthly => "monthly",
            SafetyFrequency::Quarterly => "quarterly",
            SafetyFrequency::Biannually => "biannually",
            SafetyFrequency::Annually => "annually",
        }
    }

    /// Parse a form value; "" and "none" both mean not set
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "" | "none" => Some(SafetyFrequency::None),
            "daily" => Some(SafetyFrequency::Daily),
            "weekly" => Some(SafetyFrequency::Weekly),
            "monthly" => Some(SafetyFrequency::Monthly),
            "quarterly" => Some(SafetyFrequency::Quarterly),
            "biannually" => Some(SafetyFrequency::Biannually),
            "annually" => Some(SafetyFrequency::Annually),
            _ => None,
        }
    }

    /// Read the stored column; unknown legacy values are treated as not set
    pub fn from_stored(value: Option<&str>) -> Self {
        let Some(value) = value else {
            return SafetyFrequency::None;
        };
        Self::parse(value).unwrap_or_else(|| {
            warn!("Unknown stored safety frequency '{}', treating as not set", value);
            SafetyFrequency::None
        })
    }

    /// Value written to the database: empty string when not set
    pub fn to_stored(&self) -> String {
        match self {
            SafetyFrequency::None => String::new(),
            other => other.as_str().to_string(),
        }
    }

    /// Human readable label for the summary view
    pub fn label(&self) -> &'static str {
        match self {
            SafetyFrequency::None => "Not set",
            SafetyFrequency::Daily => "Daily",
            SafetyFrequency::Weekly => "Weekly",
            SafetyFrequency::Monthly => "Monthly",
            SafetyFrequency::Quarterly => "Every 3 months",
            SafetyFrequency::Biannually => "Every 6 months",
            SafetyFrequency::Annually => "Annually",
        }
    }
}

impl std::fmt::Display for SafetyFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The shapes `safety_instructions` can be found in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredInstructions {
    List(Vec<String>),
    /// Free-text value written before instructions became a list
    Legacy(String),
    Empty,
}

impl StoredInstructions {
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Array(items)) => StoredInstructions::List(strings_of(items)),
            Some(Value::String(text)) => Self::from_text(text),
            Some(Value::Null) | None => StoredInstructions::Empty,
            Some(other) => {
                warn!("Unexpected safety_instructions value: {}", other);
                StoredInstructions::Legacy(other.to_string())
            }
        }
    }

    pub fn from_text(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return StoredInstructions::Empty;
        }
        if trimmed.starts_with('[') && trimmed.ends_with(']') {
            if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(trimmed) {
                return StoredInstructions::List(strings_of(&items));
            }
        }
        StoredInstructions::Legacy(text.to_string())
    }

    pub fn into_list(self) -> Vec<String> {
        match self {
            StoredInstructions::List(items) => items,
            StoredInstructions::Legacy(text) => vec![text],
            StoredInstructions::Empty => Vec::new(),
        }
    }
}

fn strings_of(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .map(|item| match item {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect()
}

/// Read `authorized_officers`, accepting a JSON array or a JSON-encoded string of one.
/// Entries that are not person ids are skipped.
pub fn parse_officer_ids(value: Option<&Value>) -> Vec<Uuid> {
    let items = match value {
        Some(Value::Array(items)) => items.clone(),
        Some(Value::String(text)) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Array(items)) => items,
            _ => vec![Value::String(text.clone())],
        },
        _ => return Vec::new(),
    };

    items
        .iter()
        .filter_map(|item| item.as_str())
        .filter_map(|id| match Uuid::parse_str(id.trim()) {
            Ok(uuid) => Some(uuid),
            Err(_) => {
                warn!("Skipping invalid authorized officer id '{}'", id);
                None
            }
        })
        .collect()
}
