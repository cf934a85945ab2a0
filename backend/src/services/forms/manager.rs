use crate::auth::{self, AuthState};
use crate::db::{map_form, map_submission, Db, FORM_COLUMNS, SUBMISSION_COLUMNS};
use crate::error::ApiError;
use actix_web::{web, HttpRequest, HttpResponse};
use common::model::form::{Form, FormSummary};
use common::model::submission::Submission;
use rusqlite::params;

/// `GET /api/forms/manager` — forms where the caller is a manager and
/// approval is required.
pub async fn forms(
    req: HttpRequest,
    auth: web::Data<AuthState>,
    db: web::Data<Db>,
) -> Result<HttpResponse, ApiError> {
    let user = auth::require_user(&req, &auth).await?;
    let forms = managed_forms(&db, &user.email)?;
    Ok(HttpResponse::Ok().json(forms))
}

/// `GET /api/forms/requiring-approval` — pending submissions across the
/// caller's managed forms, newest first.
pub async fn submissions(
    req: HttpRequest,
    auth: web::Data<AuthState>,
    db: web::Data<Db>,
) -> Result<HttpResponse, ApiError> {
    let user = auth::require_user(&req, &auth).await?;
    let submissions = submissions_awaiting(&db, &user.email)?;
    Ok(HttpResponse::Ok().json(submissions))
}

/// Managers are stored as a JSON array column, so membership is checked
/// here after deserialization rather than inside the SQL query.
pub fn managed_forms(db: &Db, manager_email: &str) -> Result<Vec<Form>, ApiError> {
    let conn = db.conn()?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {FORM_COLUMNS} FROM forms WHERE requires_approval = 1 \
         ORDER BY created_at DESC"
    ))?;
    let forms = stmt
        .query_map([], map_form)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(forms
        .into_iter()
        .filter(|form| form.managers.iter().any(|m| m == manager_email))
        .collect())
}

pub fn submissions_awaiting(db: &Db, manager_email: &str) -> Result<Vec<Submission>, ApiError> {
    let managed = managed_forms(db, manager_email)?;
    let conn = db.conn()?;
    let mut pending: Vec<Submission> = Vec::new();

    for form in &managed {
        let mut stmt = conn.prepare(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM submissions \
             WHERE form_id = ?1 AND status = 'pending'"
        ))?;
        let rows = stmt
            .query_map(params![form.id], map_submission)?
            .collect::<Result<Vec<_>, _>>()?;
        for mut submission in rows {
            submission.form = Some(FormSummary {
                id: form.id.clone(),
                title: form.title.clone(),
            });
            pending.push(submission);
        }
    }

    pending.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
    Ok(pending)
}
