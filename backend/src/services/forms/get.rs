use crate::auth::{self, AuthState};
use crate::db::{map_form, Db, FORM_COLUMNS};
use crate::error::ApiError;
use actix_web::{web, HttpRequest, HttpResponse};
use common::model::form::Form;
use rusqlite::{params, Connection, OptionalExtension};

/// `GET /api/forms/{id}`
pub async fn process(
    req: HttpRequest,
    auth: web::Data<AuthState>,
    db: web::Data<Db>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    auth::require_user(&req, &auth).await?;
    let conn = db.conn()?;
    let form = require_form(&conn, &id)?;
    Ok(HttpResponse::Ok().json(form))
}

pub fn fetch_form(conn: &Connection, id: &str) -> Result<Option<Form>, ApiError> {
    let form = conn
        .query_row(
            &format!("SELECT {FORM_COLUMNS} FROM forms WHERE id = ?1"),
            params![id],
            map_form,
        )
        .optional()?;
    Ok(form)
}

pub fn require_form(conn: &Connection, id: &str) -> Result<Form, ApiError> {
    fetch_form(conn, id)?.ok_or_else(|| ApiError::NotFound("Form not found".to_string()))
}
