use crate::auth::{self, AuthState};
use crate::db::{map_submission, Db, SUBMISSION_COLUMNS};
use crate::error::ApiError;
use crate::services::forms::get::require_form;
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use rusqlite::params;
use serde_json::Value;
use std::collections::HashMap;

/// `GET /api/forms/{id}/export` — CSV download of a form's submissions.
/// Only the form's managers may export.
pub async fn process(
    req: HttpRequest,
    auth: web::Data<AuthState>,
    db: web::Data<Db>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let user = auth::require_user(&req, &auth).await?;
    let (file_name, content) = export_csv(&db, &id, &user.email)?;
    Ok(HttpResponse::Ok()
        .content_type("text/csv")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{file_name}\""),
        ))
        .body(content))
}

/// Builds the CSV. Fixed leading columns, then one column per non-layout
/// field of the form, then one per snapshot field no longer in the form
/// schema. Answer values come from the snapshots stored with each
/// submission, keyed by field id, so editing a form after the fact never
/// loses exported data.
pub fn export_csv(db: &Db, form_id: &str, caller: &str) -> Result<(String, String), ApiError> {
    let conn = db.conn()?;
    let form = require_form(&conn, form_id)?;

    if !form.managers.iter().any(|m| m == caller) {
        return Err(ApiError::Forbidden(
            "Access denied. You are not a manager of this form.".to_string(),
        ));
    }

    let mut stmt = conn.prepare(&format!(
        "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE form_id = ?1 \
         ORDER BY submitted_at DESC"
    ))?;
    let submissions = stmt
        .query_map(params![form_id], map_submission)?
        .collect::<Result<Vec<_>, _>>()?;

    let mut columns: Vec<ExportColumn> = form
        .fields
        .iter()
        .filter(|f| !f.field_type.is_layout())
        .map(|f| ExportColumn {
            field_id: f.id.clone(),
            label: f.label.clone(),
        })
        .collect();
    // Snapshots outlive schema edits: fields removed from the form still
    // get a column, appended after the live ones in first-seen order.
    for submission in &submissions {
        for answer in &submission.answers {
            if !columns.iter().any(|c| c.field_id == answer.field_id) {
                columns.push(ExportColumn {
                    field_id: answer.field_id.clone(),
                    label: answer.label.clone(),
                });
            }
        }
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    let mut header = vec![
        "Submission ID".to_string(),
        "Submitter Name".to_string(),
        "Submitter Email".to_string(),
        "Status".to_string(),
        "Submitted At".to_string(),
    ];
    header.extend(columns.iter().map(|c| c.label.clone()));
    writer.write_record(&header)?;

    for submission in &submissions {
        let answers: HashMap<&str, &Value> = submission
            .answers
            .iter()
            .map(|a| (a.field_id.as_str(), &a.value))
            .collect();

        let mut row = vec![
            submission.id.clone(),
            if submission.submitter_name.is_empty() {
                "Anonymous".to_string()
            } else {
                submission.submitter_name.clone()
            },
            submission.submitter_email.clone(),
            submission.status.as_str().to_string(),
            submission.submitted_at.clone(),
        ];
        for column in &columns {
            let value = answers.get(column.field_id.as_str());
            row.push(value.map(|v| cell_value(v)).unwrap_or_default());
        }
        writer.write_record(&row)?;
    }

    let data = writer
        .into_inner()
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let content =
        String::from_utf8(data).map_err(|e| ApiError::Internal(e.to_string()))?;

    let file_name = format!(
        "{}_submissions_{}.csv",
        sanitize_title(&form.title),
        Utc::now().format("%Y-%m-%d")
    );
    Ok((file_name, content))
}

struct ExportColumn {
    field_id: String,
    label: String,
}

/// Multi-value answers (checkbox groups) are joined with `"; "`.
fn cell_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(cell_value)
            .collect::<Vec<_>>()
            .join("; "),
        other => other.to_string(),
    }
}

fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn arrays_join_with_semicolons() {
        assert_eq!(cell_value(&json!(["a", "b"])), "a; b");
        assert_eq!(cell_value(&json!("plain")), "plain");
        assert_eq!(cell_value(&json!(null)), "");
        assert_eq!(cell_value(&json!(42)), "42");
    }

    #[test]
    fn titles_are_sanitized_for_filenames() {
        assert_eq!(sanitize_title("Contact Form #1"), "Contact_Form__1");
    }
}
