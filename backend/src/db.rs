//! SQLite access for the form builder.
//!
//! Each request opens its own connection through [`Db::conn`]; SQLite's
//! row-level locking is sufficient for this workload (edits are rare and
//! low-contention). Multi-step writes — submission fan-out, decision plus
//! aggregate recompute, and cascade deletes — run inside a single
//! `rusqlite` transaction so a partial failure never leaves an orphaned or
//! half-written ledger.

use crate::error::ApiError;
use chrono::Utc;
use common::model::approval::{Approval, ApprovalStatus};
use common::model::field::{FieldOption, FieldSpec, FieldType};
use common::model::form::Form;
use common::model::submission::{Submission, SubmissionStatus};
use log::info;
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use uuid::Uuid;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS forms (
    id                TEXT PRIMARY KEY,
    title             TEXT NOT NULL,
    description       TEXT NOT NULL DEFAULT '',
    fields            TEXT NOT NULL,
    managers          TEXT NOT NULL DEFAULT '[]',
    requires_approval INTEGER NOT NULL DEFAULT 0,
    is_published      INTEGER NOT NULL DEFAULT 0,
    created_by        TEXT NOT NULL,
    created_at        TEXT NOT NULL,
    updated_at        TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS submissions (
    id              TEXT PRIMARY KEY,
    form_id         TEXT NOT NULL REFERENCES forms(id),
    answers         TEXT NOT NULL,
    submitter_name  TEXT NOT NULL DEFAULT '',
    submitter_email TEXT NOT NULL DEFAULT '',
    status          TEXT NOT NULL,
    submitted_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS approvals (
    id            TEXT PRIMARY KEY,
    submission_id TEXT NOT NULL REFERENCES submissions(id),
    manager_email TEXT NOT NULL,
    status        TEXT NOT NULL,
    comments      TEXT NOT NULL DEFAULT '',
    approved_at   TEXT,
    approved_by   TEXT,
    created_at    TEXT NOT NULL,
    UNIQUE (submission_id, manager_email)
);

CREATE INDEX IF NOT EXISTS idx_submissions_form ON submissions(form_id);
CREATE INDEX IF NOT EXISTS idx_approvals_submission ON approvals(submission_id);
CREATE INDEX IF NOT EXISTS idx_approvals_manager ON approvals(manager_email, status);
";

/// Column lists shared between the queries and the row mappers below.
/// Keep these in sync: the mappers read columns by position.
pub const FORM_COLUMNS: &str = "id, title, description, fields, managers, \
    requires_approval, is_published, created_by, created_at, updated_at";
pub const SUBMISSION_COLUMNS: &str =
    "id, form_id, answers, submitter_name, submitter_email, status, submitted_at";
pub const APPROVAL_COLUMNS: &str = "id, submission_id, manager_email, status, comments, \
    approved_at, approved_by, created_at";

/// Handle to the SQLite database file. Cheap to clone; connections are
/// opened per operation.
#[derive(Debug, Clone)]
pub struct Db {
    path: PathBuf,
}

impl Db {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Db { path: path.into() }
    }

    pub fn conn(&self) -> Result<Connection, ApiError> {
        let conn = Connection::open(&self.path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(conn)
    }

    pub fn init_schema(&self) -> Result<(), ApiError> {
        let conn = self.conn()?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Inserts the two example forms the original setup installed with
    /// `--sample-data`. Idempotent: existing rows are left alone.
    pub fn seed_sample_forms(&self) -> Result<(), ApiError> {
        let conn = self.conn()?;
        let now = now_rfc3339();
        for form in sample_forms() {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO forms (id, title, description, fields, managers, \
                 requires_approval, is_published, created_by, created_at, updated_at) \
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
                    now,
                    now,
                ],
            )?;
            if inserted > 0 {
                info!("seeded sample form '{}'", form.title);
            }
        }
        Ok(())
    }
}

/// Current UTC time in the RFC 3339 format used for every timestamp column.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

fn json_column<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn status_column<T>(
    row: &Row<'_>,
    idx: usize,
    parse: impl Fn(&str) -> Option<T>,
) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    parse(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("unknown status '{raw}'").into(),
        )
    })
}

/// Maps a row selected with [`FORM_COLUMNS`].
pub fn map_form(row: &Row<'_>) -> rusqlite::Result<Form> {
    Ok(Form {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        fields: json_column(row, 3)?,
        managers: json_column(row, 4)?,
        requires_approval: row.get::<_, i64>(5)? != 0,
        is_published: row.get::<_, i64>(6)? != 0,
        created_by: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

/// Maps a row selected with [`SUBMISSION_COLUMNS`]. Form metadata and
/// approval entries are joined on by the callers that need them.
pub fn map_submission(row: &Row<'_>) -> rusqlite::Result<Submission> {
    Ok(Submission {
        id: row.get(0)?,
        form_id: row.get(1)?,
        answers: json_column(row, 2)?,
        submitter_name: row.get(3)?,
        submitter_email: row.get(4)?,
        status: status_column(row, 5, SubmissionStatus::parse)?,
        submitted_at: row.get(6)?,
        form: None,
        approvals: None,
    })
}

/// Maps a row selected with [`APPROVAL_COLUMNS`].
pub fn map_approval(row: &Row<'_>) -> rusqlite::Result<Approval> {
    Ok(Approval {
        id: row.get(0)?,
        submission_id: row.get(1)?,
        manager_email: row.get(2)?,
        status: status_column(row, 3, ApprovalStatus::parse)?,
        comments: row.get(4)?,
        approved_at: row.get(5)?,
        approved_by: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn sample_forms() -> Vec<Form> {
    let text = |id: &str, label: &str, placeholder: &str| FieldSpec {
        id: id.to_string(),
        field_type: FieldType::Text,
        label: label.to_string(),
        required: true,
        placeholder: Some(placeholder.to_string()),
        options: None,
        rows: None,
    };
    let option = |label: &str, value: &str| FieldOption {
        label: label.to_string(),
        value: value.to_string(),
    };

    let contact = Form {
        id: "sample-contact".to_string(),
        title: "Sample Contact Form".to_string(),
        description: "A simple contact form for gathering user information".to_string(),
        fields: vec![
            text("field-1", "Full Name", "Enter your full name"),
            FieldSpec {
                id: "field-2".to_string(),
                field_type: FieldType::Email,
                label: "Email Address".to_string(),
                required: true,
                placeholder: Some("Enter your email address".to_string()),
                options: None,
                rows: None,
            },
            FieldSpec {
                id: "field-3".to_string(),
                field_type: FieldType::Textarea,
                label: "Message".to_string(),
                required: true,
                placeholder: Some("Enter your message".to_string()),
                options: None,
                rows: Some(4),
            },
        ],
        managers: Vec::new(),
        requires_approval: false,
        is_published: true,
        created_by: "system".to_string(),
        created_at: String::new(),
        updated_at: String::new(),
    };

    let feedback = Form {
        id: "sample-feedback".to_string(),
        title: "Employee Feedback Form".to_string(),
        description: "Collect feedback from employees about workplace satisfaction".to_string(),
        fields: vec![
            text("field-4", "Employee Name", "Enter your name"),
            FieldSpec {
                id: "field-5".to_string(),
                field_type: FieldType::Select,
                label: "Department".to_string(),
                required: true,
                placeholder: None,
                options: Some(vec![
                    option("Engineering", "engineering"),
                    option("Marketing", "marketing"),
                    option("Sales", "sales"),
                    option("HR", "hr"),
                ]),
                rows: None,
            },
            FieldSpec {
                id: "field-6".to_string(),
                field_type: FieldType::Radio,
                label: "Overall Satisfaction".to_string(),
                required: true,
                placeholder: None,
                options: Some(vec![
                    option("Very Satisfied", "very_satisfied"),
                    option("Satisfied", "satisfied"),
                    option("Neutral", "neutral"),
                    option("Dissatisfied", "dissatisfied"),
                ]),
                rows: None,
            },
            FieldSpec {
                id: "field-7".to_string(),
                field_type: FieldType::Textarea,
                label: "Additional Comments".to_string(),
                required: false,
                placeholder: Some("Share any additional feedback...".to_string()),
                options: None,
                rows: Some(3),
            },
        ],
        managers: Vec::new(),
        requires_approval: false,
        is_published: true,
        created_by: "system".to_string(),
        created_at: String::new(),
        updated_at: String::new(),
    };

    vec![contact, feedback]
}

/// Convenience used by handlers that only need a fresh UUID string.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}
