use crate::auth::{self, AuthState};
use crate::db::{now_rfc3339, Db};
use crate::error::ApiError;
use crate::services::forms::get::require_form;
use actix_web::{web, HttpRequest, HttpResponse};
use common::model::form::Form;
use rusqlite::params;

/// `PATCH /api/forms/{id}/publish`
pub async fn publish(
    req: HttpRequest,
    auth: web::Data<AuthState>,
    db: web::Data<Db>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    auth::require_user(&req, &auth).await?;
    let form = set_published(&db, &id, true)?;
    Ok(HttpResponse::Ok().json(form))
}

/// `PATCH /api/forms/{id}/unpublish` — in-flight submissions are not
/// affected; only new intake is stopped.
pub async fn unpublish(
    req: HttpRequest,
    auth: web::Data<AuthState>,
    db: web::Data<Db>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    auth::require_user(&req, &auth).await?;
    let form = set_published(&db, &id, false)?;
    Ok(HttpResponse::Ok().json(form))
}

pub fn set_published(db: &Db, id: &str, published: bool) -> Result<Form, ApiError> {
    let conn = db.conn()?;
    let changed = conn.execute(
        "UPDATE forms SET is_published = ?1, updated_at = ?2 WHERE id = ?3",
        params![published as i64, now_rfc3339(), id],
    )?;
    if changed == 0 {
        return Err(ApiError::NotFound("Form not found".to_string()));
    }
    require_form(&conn, id)
}
