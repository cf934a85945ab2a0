use crate::auth::{self, AuthState};
use crate::db::{new_id, now_rfc3339, Db};
use crate::error::ApiError;
use crate::services::forms::get::require_form;
use actix_web::{web, HttpRequest, HttpResponse};
use common::model::field::FieldSpec;
use common::model::form::Form;
use common::model::user::AuthedUser;
use common::requests::{CreateFormRequest, UpdateFormRequest};
use log::info;
use rusqlite::params;

/// `POST /api/forms`
pub async fn create(
    req: HttpRequest,
    auth: web::Data<AuthState>,
    db: web::Data<Db>,
    payload: web::Json<CreateFormRequest>,
) -> Result<HttpResponse, ApiError> {
    let user = auth::require_user(&req, &auth).await?;
    let form = create_form(&db, payload.into_inner(), &user)?;
    Ok(HttpResponse::Created().json(form))
}

/// `PUT /api/forms/{id}`
pub async fn update(
    req: HttpRequest,
    auth: web::Data<AuthState>,
    db: web::Data<Db>,
    id: web::Path<String>,
    payload: web::Json<UpdateFormRequest>,
) -> Result<HttpResponse, ApiError> {
    auth::require_user(&req, &auth).await?;
    let form = update_form(&db, &id, payload.into_inner())?;
    Ok(HttpResponse::Ok().json(form))
}

fn validate_fields(fields: &[FieldSpec]) -> Result<(), ApiError> {
    if fields.is_empty() {
        return Err(ApiError::Validation(
            "Form configuration must include a non-empty fields array".to_string(),
        ));
    }
    Ok(())
}

pub fn create_form(db: &Db, req: CreateFormRequest, user: &AuthedUser) -> Result<Form, ApiError> {
    if req.title.trim().is_empty() {
        return Err(ApiError::Validation("Title is required".to_string()));
    }
    validate_fields(&req.fields)?;

    let now = now_rfc3339();
    let form = Form {
        id: new_id(),
        title: req.title.trim().to_string(),
        description: req.description.trim().to_string(),
        fields: req.fields,
        managers: req.managers,
        requires_approval: req.requires_approval,
        is_published: req.is_published,
        created_by: user.email.clone(),
        created_at: now.clone(),
        updated_at: now,
    };

    let conn = db.conn()?;
    conn.execute(
        "INSERT INTO forms (id, title, description, fields, managers, requires_approval, \
         is_published, created_by, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            form.id,
            form.title,
            form.description,
            serde_json::to_string(&form.fields)?,
            serde_json::to_string(&form.managers)?,
            form.requires_approval as i64,
            form.is_published as i64,
            form.created_by,
            form.created_at,
            form.updated_at,
        ],
    )?;

    info!("form '{}' created by {}", form.title, form.created_by);
    Ok(form)
}

pub fn update_form(db: &Db, id: &str, req: UpdateFormRequest) -> Result<Form, ApiError> {
    let conn = db.conn()?;
    let mut form = require_form(&conn, id)?;

    if let Some(fields) = &req.fields {
        validate_fields(fields)?;
    }

    if let Some(title) = req.title {
        if title.trim().is_empty() {
            return Err(ApiError::Validation("Title is required".to_string()));
        }
        form.title = title.trim().to_string();
    }
    if let Some(description) = req.description {
        form.description = description.trim().to_string();
    }
    if let Some(fields) = req.fields {
        form.fields = fields;
    }
    if let Some(managers) = req.managers {
        form.managers = managers;
    }
    if let Some(requires_approval) = req.requires_approval {
        form.requires_approval = requires_approval;
    }
    if let Some(is_published) = req.is_published {
        form.is_published = is_published;
    }
    form.updated_at = now_rfc3339();

    conn.execute(
        "UPDATE forms SET title = ?1, description = ?2, fields = ?3, managers = ?4, \
         requires_approval = ?5, is_published = ?6, updated_at = ?7 WHERE id = ?8",
        params![
            form.title,
            form.description,
            serde_json::to_string(&form.fields)?,
            serde_json::to_string(&form.managers)?,
            form.requires_approval as i64,
            form.is_published as i64,
            form.updated_at,
            form.id,
        ],
    )?;

    Ok(form)
}
