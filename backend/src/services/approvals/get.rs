use crate::auth::{self, AuthState};
use crate::db::{map_approval, Db};
use crate::error::ApiError;
use actix_web::{web, HttpRequest, HttpResponse};
use common::model::approval::{ApprovalDetail, ApprovalStatus};
use common::model::form::FormSummary;
use common::model::submission::SubmissionSummary;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Row};
use serde::Deserialize;

const DETAIL_SELECT: &str = "SELECT a.id, a.submission_id, a.manager_email, a.status, \
     a.comments, a.approved_at, a.approved_by, a.created_at, \
     s.id, s.submitter_name, s.submitter_email, s.submitted_at, \
     f.id, f.title \
     FROM approvals a \
     JOIN submissions s ON s.id = a.submission_id \
     JOIN forms f ON f.id = s.form_id";

fn map_detail(row: &Row<'_>) -> rusqlite::Result<ApprovalDetail> {
    Ok(ApprovalDetail {
        approval: map_approval(row)?,
        submission: SubmissionSummary {
            id: row.get(8)?,
            submitter_name: row.get(9)?,
            submitter_email: row.get(10)?,
            submitted_at: row.get(11)?,
        },
        form: FormSummary {
            id: row.get(12)?,
            title: row.get(13)?,
        },
    })
}

/// `GET /api/approvals/pending` — the caller's own pending entries.
pub async fn pending(
    req: HttpRequest,
    auth: web::Data<AuthState>,
    db: web::Data<Db>,
) -> Result<HttpResponse, ApiError> {
    let user = auth::require_user(&req, &auth).await?;
    let entries = manager_approvals(&db, &user.email, Some(ApprovalStatus::Pending))?;
    Ok(HttpResponse::Ok().json(entries))
}

#[derive(Debug, Default, Deserialize)]
pub struct ManagerApprovalsQuery {
    pub status: Option<String>,
}

/// `GET /api/approvals/manager/{manager_email}`
pub async fn by_manager(
    req: HttpRequest,
    auth: web::Data<AuthState>,
    db: web::Data<Db>,
    manager_email: web::Path<String>,
    query: web::Query<ManagerApprovalsQuery>,
) -> Result<HttpResponse, ApiError> {
    auth::require_user(&req, &auth).await?;
    let status = query
        .status
        .as_deref()
        .map(|s| {
            ApprovalStatus::parse(s)
                .ok_or_else(|| ApiError::Validation(format!("unknown status '{s}'")))
        })
        .transpose()?;
    let entries = manager_approvals(&db, &manager_email, status)?;
    Ok(HttpResponse::Ok().json(entries))
}

/// `GET /api/approvals/{id}`
pub async fn process(
    req: HttpRequest,
    auth: web::Data<AuthState>,
    db: web::Data<Db>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    auth::require_user(&req, &auth).await?;
    let conn = db.conn()?;
    let mut stmt = conn.prepare(&format!("{DETAIL_SELECT} WHERE a.id = ?"))?;
    let mut entries = stmt
        .query_map(params_from_iter([Value::Text(id.to_string())]), map_detail)?
        .collect::<Result<Vec<_>, _>>()?;
    match entries.pop() {
        Some(entry) => Ok(HttpResponse::Ok().json(entry)),
        None => Err(ApiError::NotFound("Approval not found".to_string())),
    }
}

pub fn manager_approvals(
    db: &Db,
    manager_email: &str,
    status: Option<ApprovalStatus>,
) -> Result<Vec<ApprovalDetail>, ApiError> {
    let conn = db.conn()?;
    let mut sql = format!("{DETAIL_SELECT} WHERE a.manager_email = ?");
    let mut params = vec![Value::Text(manager_email.to_string())];
    if let Some(status) = status {
        sql.push_str(" AND a.status = ?");
        params.push(Value::Text(status.as_str().to_string()));
    }
    sql.push_str(" ORDER BY a.created_at DESC");

    let mut stmt = conn.prepare(&sql)?;
    let entries = stmt
        .query_map(params_from_iter(params), map_detail)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(entries)
}
