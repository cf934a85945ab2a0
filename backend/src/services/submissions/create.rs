//! Submission creation and approval fan-out.
//!
//! A submission against a form that requires approval starts `pending` and
//! receives one `pending` approval entry per manager, all inserted in a
//! single transaction with the submission row itself. Either everything
//! commits or nothing does, so the ledger can never be partially fanned
//! out. Each manager then acts independently; the aggregate rules live in
//! `services::approvals::decide`.

use crate::auth::{self, AuthState};
use crate::db::{new_id, now_rfc3339, Db};
use crate::error::ApiError;
use actix_web::{web, HttpRequest, HttpResponse};
use common::model::field::FieldSpec;
use common::model::form::FormSummary;
use common::model::submission::{AnswerSnapshot, Submission, SubmissionStatus};
use common::model::user::AuthedUser;
use common::requests::CreateSubmissionRequest;
use log::{info, warn};
use rusqlite::params;
use serde_json::Value;
use std::collections::HashMap;

/// `POST /api/submissions` — public intake; the resolved identity is used
/// for the submitter fields when a valid token accompanies the request.
pub async fn process(
    req: HttpRequest,
    auth: web::Data<AuthState>,
    db: web::Data<Db>,
    payload: web::Json<CreateSubmissionRequest>,
) -> Result<HttpResponse, ApiError> {
    let user = auth::optional_user(&req, &auth).await;
    let submission = create_submission(&db, payload.into_inner(), user.as_ref())?;
    Ok(HttpResponse::Created().json(submission))
}

pub fn create_submission(
    db: &Db,
    req: CreateSubmissionRequest,
    user: Option<&AuthedUser>,
) -> Result<Submission, ApiError> {
    if req.form_id.trim().is_empty() {
        return Err(ApiError::Validation(
            "Form ID and submission data are required".to_string(),
        ));
    }

    let mut conn = db.conn()?;
    let form = crate::services::forms::get::fetch_form(&conn, &req.form_id)?
        .ok_or_else(|| ApiError::NotFound("Form not found".to_string()))?;
    if !form.is_published {
        return Err(ApiError::UnpublishedForm);
    }

    let answers = snapshot_answers(&form.fields, &req.submission_data);

    // Approval only happens when there is at least one manager to decide.
    // A form that requires approval but names no managers bypasses the
    // workflow entirely; that misconfiguration is logged, not failed.
    let fan_out = form.requires_approval && !form.managers.is_empty();
    if form.requires_approval && form.managers.is_empty() {
        warn!(
            "form {} requires approval but has no managers; submission bypasses approval",
            form.id
        );
    }
    let status = if fan_out {
        SubmissionStatus::Pending
    } else {
        SubmissionStatus::Submitted
    };

    let submitter_email = user
        .map(|u| u.email.clone())
        .or_else(|| req.submitter_email.clone())
        .unwrap_or_else(|| "anonymous".to_string());
    let submitter_name = user
        .map(|u| u.display_name.clone())
        .or_else(|| req.submitter_name.clone())
        .unwrap_or_else(|| submitter_email.clone());

    let now = now_rfc3339();
    let submission = Submission {
        id: new_id(),
        form_id: form.id.clone(),
        answers,
        submitter_name,
        submitter_email,
        status,
        submitted_at: now.clone(),
        form: Some(FormSummary {
            id: form.id.clone(),
            title: form.title.clone(),
        }),
        approvals: None,
    };

    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO submissions (id, form_id, answers, submitter_name, submitter_email, \
         status, submitted_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            submission.id,
            submission.form_id,
            serde_json::to_string(&submission.answers)?,
            submission.submitter_name,
            submission.submitter_email,
            submission.status.as_str(),
            submission.submitted_at,
        ],
    )?;
    if fan_out {
        for manager in &form.managers {
            tx.execute(
                "INSERT INTO approvals (id, submission_id, manager_email, status, comments, \
                 created_at) VALUES (?1, ?2, ?3, 'pending', '', ?4)",
                params![new_id(), submission.id, manager, now],
            )?;
        }
    }
    tx.commit()?;

    if fan_out {
        info!(
            "submission {} created pending {} approvals",
            submission.id,
            form.managers.len()
        );
    } else {
        info!("submission {} created with status submitted", submission.id);
    }
    Ok(submission)
}

/// Copies each non-layout field's label and type next to its submitted
/// value, so later display and export never depend on the form schema at
/// read time.
pub fn snapshot_answers(
    fields: &[FieldSpec],
    data: &HashMap<String, Value>,
) -> Vec<AnswerSnapshot> {
    fields
        .iter()
        .filter(|field| !field.field_type.is_layout())
        .map(|field| AnswerSnapshot {
            field_id: field.id.clone(),
            label: field.label.clone(),
            field_type: field.field_type.clone(),
            value: data.get(&field.id).cloned().unwrap_or(Value::Null),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::field::FieldType;
    use serde_json::json;

    fn field(id: &str, field_type: FieldType, label: &str) -> FieldSpec {
        FieldSpec {
            id: id.to_string(),
            field_type,
            label: label.to_string(),
            required: false,
            placeholder: None,
            options: None,
            rows: None,
        }
    }

    #[test]
    fn snapshots_skip_layout_fields_and_keep_order() {
        let fields = vec![
            field("section-1", FieldType::Section, "Personal"),
            field("field-0", FieldType::Text, "Name"),
            field("field-1", FieldType::Email, "Email"),
        ];
        let mut data = HashMap::new();
        data.insert("field-0".to_string(), json!("Ada"));

        let answers = snapshot_answers(&fields, &data);
        assert_eq!(answers.len(), 2);
        assert_eq!(answers[0].field_id, "field-0");
        assert_eq!(answers[0].label, "Name");
        assert_eq!(answers[0].value, json!("Ada"));
        // Unanswered fields snapshot as null rather than being dropped.
        assert_eq!(answers[1].field_id, "field-1");
        assert_eq!(answers[1].value, Value::Null);
    }
}
