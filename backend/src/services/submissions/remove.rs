use crate::auth::{self, AuthState};
use crate::db::Db;
use crate::error::ApiError;
use actix_web::{web, HttpRequest, HttpResponse};
use log::info;
use rusqlite::params;
use serde_json::json;

/// `DELETE /api/submissions/{id}` — removes the submission together with
/// its approval ledger entries, in one transaction.
pub async fn process(
    req: HttpRequest,
    auth: web::Data<AuthState>,
    db: web::Data<Db>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    auth::require_user(&req, &auth).await?;
    delete_submission(&db, &id)?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Submission deleted successfully" })))
}

pub fn delete_submission(db: &Db, id: &str) -> Result<(), ApiError> {
    let mut conn = db.conn()?;
    let tx = conn.transaction()?;
    tx.execute(
        "DELETE FROM approvals WHERE submission_id = ?1",
        params![id],
    )?;
    let deleted = tx.execute("DELETE FROM submissions WHERE id = ?1", params![id])?;
    if deleted == 0 {
        return Err(ApiError::NotFound("Submission not found".to_string()));
    }
    tx.commit()?;
    info!("submission {} deleted", id);
    Ok(())
}
