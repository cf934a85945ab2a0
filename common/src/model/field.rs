use serde::{Deserialize, Serialize};

/// The kind of input a form field renders as.
///
/// Layout-only variants (`Section`, `Heading`, `Paragraph`, `Spacer`,
/// `PageBreak`) structure the form visually and never carry a submitted
/// value, so they are skipped when snapshotting answers and when building
/// CSV export columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    Text,
    Email,
    Tel,
    Number,
    Date,
    Textarea,
    Select,
    Radio,
    Checkbox,
    Section,
    Heading,
    Paragraph,
    Spacer,
    PageBreak,
}

impl FieldType {
    /// Layout elements hold no user data.
    pub fn is_layout(&self) -> bool {
        matches!(
            self,
            FieldType::Section
                | FieldType::Heading
                | FieldType::Paragraph
                | FieldType::Spacer
                | FieldType::PageBreak
        )
    }
}

/// One selectable choice for `Select`, `Radio` and `Checkbox` fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldOption {
    pub label: String,
    pub value: String,
}

/// A single field in a form definition, in display order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Identifier unique within the form (e.g. `field-3`). Submission
    /// answers are keyed by this id.
    pub id: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<FieldOption>>,
    /// Visible rows for `Textarea` fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<u32>,
}
