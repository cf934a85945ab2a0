use crate::model::form::FormSummary;
use crate::model::submission::SubmissionSummary;
use serde::{Deserialize, Serialize};

/// A manager's individual decision state on one submission.
///
/// `Approved` and `Rejected` are terminal: an entry transitions out of
/// `Pending` exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ApprovalStatus::Pending),
            "approved" => Some(ApprovalStatus::Approved),
            "rejected" => Some(ApprovalStatus::Rejected),
            _ => None,
        }
    }
}

/// One approval ledger entry: exactly one per (submission, manager) pair,
/// created when the submission fans out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Approval {
    pub id: String,
    pub submission_id: String,
    pub manager_email: String,
    pub status: ApprovalStatus,
    #[serde(default)]
    pub comments: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<String>,
    /// Display name of the deciding manager, captured at decision time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,
    pub created_at: String,
}

/// An approval entry joined with the submission and form it belongs to,
/// as returned by the manager-facing listing endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalDetail {
    #[serde(flatten)]
    pub approval: Approval,
    pub submission: SubmissionSummary,
    pub form: FormSummary,
}
