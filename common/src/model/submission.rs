use crate::model::approval::Approval;
use crate::model::field::FieldType;
use crate::model::form::FormSummary;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lifecycle status of a submission, derived from its approval entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    /// Accepted against a form that does not require approval.
    Submitted,
    /// Waiting on at least one manager decision.
    Pending,
    /// Every approval entry is approved. Terminal.
    Approved,
    /// At least one approval entry is rejected. Terminal.
    Rejected,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Submitted => "submitted",
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Approved => "approved",
            SubmissionStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "submitted" => Some(SubmissionStatus::Submitted),
            "pending" => Some(SubmissionStatus::Pending),
            "approved" => Some(SubmissionStatus::Approved),
            "rejected" => Some(SubmissionStatus::Rejected),
            _ => None,
        }
    }
}

/// One answered field, with the label and type copied from the form at
/// submission time. Display and export read these snapshots instead of
/// reconciling answer keys against the (possibly since edited) form schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerSnapshot {
    pub field_id: String,
    pub label: String,
    pub field_type: FieldType,
    pub value: Value,
}

/// One instance of user-provided data against a form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: String,
    pub form_id: String,
    pub answers: Vec<AnswerSnapshot>,
    pub submitter_name: String,
    pub submitter_email: String,
    pub status: SubmissionStatus,
    pub submitted_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<FormSummary>,
    /// Populated on single-submission reads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approvals: Option<Vec<Approval>>,
}

/// Reduced submission metadata joined onto approval entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionSummary {
    pub id: String,
    pub submitter_name: String,
    pub submitter_email: String,
    pub submitted_at: String,
}
