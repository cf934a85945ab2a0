use crate::auth::{self, AuthState};
use crate::db::{map_form, Db, FORM_COLUMNS};
use crate::error::ApiError;
use actix_web::{web, HttpRequest, HttpResponse};
use common::model::form::Form;
use rusqlite::params_from_iter;
use rusqlite::types::Value;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct FormListQuery {
    pub published: Option<bool>,
    pub created_by: Option<String>,
}

/// `GET /api/forms` — list forms, optionally filtered by publication state
/// and creator.
pub async fn process(
    req: HttpRequest,
    auth: web::Data<AuthState>,
    db: web::Data<Db>,
    query: web::Query<FormListQuery>,
) -> Result<HttpResponse, ApiError> {
    auth::require_user(&req, &auth).await?;
    let forms = list_forms(&db, &query)?;
    Ok(HttpResponse::Ok().json(forms))
}

/// `GET /api/forms/published` — the public feed used for submission intake.
/// No authentication required.
pub async fn published(db: web::Data<Db>) -> Result<HttpResponse, ApiError> {
    let forms = list_forms(
        &db,
        &FormListQuery {
            published: Some(true),
            created_by: None,
        },
    )?;
    Ok(HttpResponse::Ok().json(forms))
}

pub fn list_forms(db: &Db, query: &FormListQuery) -> Result<Vec<Form>, ApiError> {
    let conn = db.conn()?;
    let mut sql = format!("SELECT {FORM_COLUMNS} FROM forms");
    let mut clauses: Vec<&str> = Vec::new();
    let mut params: Vec<Value> = Vec::new();

    if let Some(published) = query.published {
        clauses.push("is_published = ?");
        params.push(Value::Integer(published as i64));
    }
    if let Some(creator) = &query.created_by {
        clauses.push("created_by = ?");
        params.push(Value::Text(creator.clone()));
    }
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY created_at DESC");

    let mut stmt = conn.prepare(&sql)?;
    let forms = stmt
        .query_map(params_from_iter(params), map_form)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(forms)
}
