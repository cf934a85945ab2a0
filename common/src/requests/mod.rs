use crate::model::approval::Approval;
use crate::model::field::FieldSpec;
use crate::model::user::AuthedUser;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Payload for `POST /api/forms`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFormRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub fields: Vec<FieldSpec>,
    #[serde(default)]
    pub managers: Vec<String>,
    #[serde(default)]
    pub requires_approval: bool,
    #[serde(default)]
    pub is_published: bool,
}

/// Payload for `PUT /api/forms/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateFormRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub fields: Option<Vec<FieldSpec>>,
    pub managers: Option<Vec<String>>,
    pub requires_approval: Option<bool>,
    pub is_published: Option<bool>,
}

/// Payload for `POST /api/submissions`. Answers are keyed by field id;
/// the backend snapshots labels and types from the form at creation time.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubmissionRequest {
    pub form_id: String,
    pub submission_data: HashMap<String, Value>,
    #[serde(default)]
    pub submitter_email: Option<String>,
    #[serde(default)]
    pub submitter_name: Option<String>,
}

/// Payload for `PUT /api/submissions/{id}`. Unknown keys are rejected so
/// callers cannot try to overwrite `id`, `form_id`, `status` or
/// `submitted_at`; those columns are immutable after creation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateSubmissionRequest {
    pub submitter_name: Option<String>,
    pub submitter_email: Option<String>,
    /// Replacement answer values keyed by field id. Labels and types come
    /// from the snapshots stored with the submission, never from the live
    /// form; keys with no matching snapshot are ignored.
    pub submission_data: Option<HashMap<String, Value>>,
}

/// Payload for `POST /api/approvals/{id}/approve` and `/reject`.
/// Comments are optional for approve and required non-blank for reject.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DecisionRequest {
    #[serde(default)]
    pub comments: Option<String>,
}

/// Response for a decision call: the updated ledger entry plus whether the
/// submission just reached the terminal approved state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionResponse {
    #[serde(flatten)]
    pub approval: Approval,
    pub submission_fully_approved: bool,
}

/// Response for `DELETE /api/forms/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteFormResponse {
    pub message: String,
    pub deleted_submissions: usize,
}

/// Payload for `POST /api/users/validate-email`.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidateEmailRequest {
    pub email: String,
}

/// Response for `POST /api/users/validate-email`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateEmailResponse {
    pub valid: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<AuthedUser>,
}
