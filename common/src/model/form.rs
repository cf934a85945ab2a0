use crate::model::field::FieldSpec;
use serde::{Deserialize, Serialize};

/// A form definition: the input schema plus its approval configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Form {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Ordered field sequence; must be non-empty.
    pub fields: Vec<FieldSpec>,
    /// Email addresses of the managers authorized to decide approvals.
    #[serde(default)]
    pub managers: Vec<String>,
    #[serde(default)]
    pub requires_approval: bool,
    #[serde(default)]
    pub is_published: bool,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Reduced form metadata joined onto submissions and approval entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormSummary {
    pub id: String,
    pub title: String,
}
