use crate::auth::{self, AuthState};
use crate::db::Db;
use crate::error::ApiError;
use crate::services::submissions::get::fetch_submission;
use actix_web::{web, HttpRequest, HttpResponse};
use common::model::submission::Submission;
use common::requests::UpdateSubmissionRequest;
use rusqlite::params;

/// `PUT /api/submissions/{id}` — the submitter fields and answer values
/// are updatable. `id`, `form_id`, `status` and `submitted_at` are
/// immutable: status belongs to the approval engine alone, and the payload
/// type rejects unknown keys so attempts to alter the rest fail with 400.
pub async fn process(
    req: HttpRequest,
    auth: web::Data<AuthState>,
    db: web::Data<Db>,
    id: web::Path<String>,
    payload: web::Json<UpdateSubmissionRequest>,
) -> Result<HttpResponse, ApiError> {
    auth::require_user(&req, &auth).await?;
    let submission = update_submission(&db, &id, payload.into_inner())?;
    Ok(HttpResponse::Ok().json(submission))
}

pub fn update_submission(
    db: &Db,
    id: &str,
    req: UpdateSubmissionRequest,
) -> Result<Submission, ApiError> {
    let conn = db.conn()?;
    let existing = fetch_submission(&conn, id)?
        .ok_or_else(|| ApiError::NotFound("Submission not found".to_string()))?;

    // New values slot into the stored snapshots; labels and types stay as
    // captured at creation, and keys naming no snapshot are dropped.
    let mut answers = existing.answers;
    if let Some(data) = req.submission_data {
        for answer in &mut answers {
            if let Some(value) = data.get(&answer.field_id) {
                answer.value = value.clone();
            }
        }
    }

    let submitter_name = req.submitter_name.unwrap_or(existing.submitter_name);
    let submitter_email = req.submitter_email.unwrap_or(existing.submitter_email);
    conn.execute(
        "UPDATE submissions SET answers = ?1, submitter_name = ?2, submitter_email = ?3 \
         WHERE id = ?4",
        params![
            serde_json::to_string(&answers)?,
            submitter_name,
            submitter_email,
            id
        ],
    )?;

    fetch_submission(&conn, id)?
        .ok_or_else(|| ApiError::NotFound("Submission not found".to_string()))
}
