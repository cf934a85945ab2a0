use crate::auth::{self, AuthState};
use crate::db::{map_approval, map_submission, Db, APPROVAL_COLUMNS};
use crate::error::ApiError;
use actix_web::{web, HttpRequest, HttpResponse};
use common::model::form::FormSummary;
use common::model::submission::Submission;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct SubmissionListQuery {
    pub status: Option<String>,
    pub submitter_email: Option<String>,
    pub form_id: Option<String>,
}

/// `GET /api/submissions` — filtered listing, newest first.
pub async fn list(
    req: HttpRequest,
    auth: web::Data<AuthState>,
    db: web::Data<Db>,
    query: web::Query<SubmissionListQuery>,
) -> Result<HttpResponse, ApiError> {
    auth::require_user(&req, &auth).await?;
    let submissions = list_submissions(&db, &query)?;
    Ok(HttpResponse::Ok().json(submissions))
}

/// `GET /api/submissions/form/{form_id}`
pub async fn by_form(
    req: HttpRequest,
    auth: web::Data<AuthState>,
    db: web::Data<Db>,
    form_id: web::Path<String>,
    query: web::Query<SubmissionListQuery>,
) -> Result<HttpResponse, ApiError> {
    auth::require_user(&req, &auth).await?;
    let mut query = query.into_inner();
    query.form_id = Some(form_id.into_inner());
    let submissions = list_submissions(&db, &query)?;
    Ok(HttpResponse::Ok().json(submissions))
}

/// `GET /api/submissions/{id}` — single submission with its approval
/// ledger entries attached.
pub async fn process(
    req: HttpRequest,
    auth: web::Data<AuthState>,
    db: web::Data<Db>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    auth::require_user(&req, &auth).await?;
    let conn = db.conn()?;
    let submission = fetch_submission(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Submission not found".to_string()))?;
    Ok(HttpResponse::Ok().json(submission))
}

pub fn list_submissions(
    db: &Db,
    query: &SubmissionListQuery,
) -> Result<Vec<Submission>, ApiError> {
    let conn = db.conn()?;
    let mut sql = String::from(
        "SELECT s.id, s.form_id, s.answers, s.submitter_name, s.submitter_email, \
         s.status, s.submitted_at, f.title \
         FROM submissions s JOIN forms f ON f.id = s.form_id",
    );
    let mut clauses: Vec<&str> = Vec::new();
    let mut params: Vec<Value> = Vec::new();

    if let Some(status) = &query.status {
        clauses.push("s.status = ?");
        params.push(Value::Text(status.clone()));
    }
    if let Some(email) = &query.submitter_email {
        clauses.push("s.submitter_email = ?");
        params.push(Value::Text(email.clone()));
    }
    if let Some(form_id) = &query.form_id {
        clauses.push("s.form_id = ?");
        params.push(Value::Text(form_id.clone()));
    }
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY s.submitted_at DESC");

    let mut stmt = conn.prepare(&sql)?;
    let submissions = stmt
        .query_map(params_from_iter(params), |row| {
            let mut submission = map_submission(row)?;
            submission.form = Some(FormSummary {
                id: submission.form_id.clone(),
                title: row.get(7)?,
            });
            Ok(submission)
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(submissions)
}

pub fn fetch_submission(conn: &Connection, id: &str) -> Result<Option<Submission>, ApiError> {
    let found = conn
        .query_row(
            "SELECT s.id, s.form_id, s.answers, s.submitter_name, s.submitter_email, \
             s.status, s.submitted_at, f.title \
             FROM submissions s JOIN forms f ON f.id = s.form_id WHERE s.id = ?1",
            params![id],
            |row| {
                let mut submission = map_submission(row)?;
                submission.form = Some(FormSummary {
                    id: submission.form_id.clone(),
                    title: row.get(7)?,
                });
                Ok(submission)
            },
        )
        .optional()?;

    let Some(mut submission) = found else {
        return Ok(None);
    };

    let mut stmt = conn.prepare(&format!(
        "SELECT {APPROVAL_COLUMNS} FROM approvals WHERE submission_id = ?1 \
         ORDER BY created_at ASC"
    ))?;
    let approvals = stmt
        .query_map(params![id], map_approval)?
        .collect::<Result<Vec<_>, _>>()?;
    submission.approvals = Some(approvals);
    Ok(Some(submission))
}
