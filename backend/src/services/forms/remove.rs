use crate::auth::{self, AuthState};
use crate::db::Db;
use crate::error::ApiError;
use actix_web::{web, HttpRequest, HttpResponse};
use common::requests::DeleteFormResponse;
use log::info;
use rusqlite::{params, OptionalExtension};

/// `DELETE /api/forms/{id}` — cascade delete. Approval entries go first,
/// then submissions, then the form, all in one transaction so a failure
/// partway through never leaves orphaned foreign keys.
pub async fn process(
    req: HttpRequest,
    auth: web::Data<AuthState>,
    db: web::Data<Db>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    auth::require_user(&req, &auth).await?;
    let response = delete_form(&db, &id)?;
    Ok(HttpResponse::Ok().json(response))
}

pub fn delete_form(db: &Db, id: &str) -> Result<DeleteFormResponse, ApiError> {
    let mut conn = db.conn()?;
    let tx = conn.transaction()?;

    let exists: Option<String> = tx
        .query_row("SELECT id FROM forms WHERE id = ?1", params![id], |row| {
            row.get(0)
        })
        .optional()?;
    if exists.is_none() {
        return Err(ApiError::NotFound("Form not found".to_string()));
    }

    tx.execute(
        "DELETE FROM approvals WHERE submission_id IN \
         (SELECT id FROM submissions WHERE form_id = ?1)",
        params![id],
    )?;
    let deleted_submissions = tx.execute("DELETE FROM submissions WHERE form_id = ?1", params![id])?;
    tx.execute("DELETE FROM forms WHERE id = ?1", params![id])?;
    tx.commit()?;

    info!(
        "form {} deleted along with {} submissions",
        id, deleted_submissions
    );
    Ok(DeleteFormResponse {
        message: "Form deleted successfully".to_string(),
        deleted_submissions,
    })
}
