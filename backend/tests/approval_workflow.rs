//! End-to-end workflow tests for the submission and approval lifecycle,
//! driving the service layer against a throwaway SQLite database.

use backend::db::Db;
use backend::error::ApiError;
use backend::services::approvals::decide::{decide, find_for_manager};
use backend::services::approvals::get::manager_approvals;
use backend::services::forms::manager::{managed_forms, submissions_awaiting};
use backend::services::forms::remove::delete_form;
use backend::services::forms::save::create_form;
use backend::services::submissions::create::create_submission;
use backend::services::submissions::get::fetch_submission;
use backend::services::submissions::update::update_submission;
use common::model::approval::ApprovalStatus;
use common::model::field::{FieldSpec, FieldType};
use common::model::form::Form;
use common::model::submission::{Submission, SubmissionStatus};
use common::model::user::AuthedUser;
use common::requests::{CreateFormRequest, CreateSubmissionRequest, UpdateSubmissionRequest};
use rusqlite::params;
use serde_json::json;
use std::collections::HashMap;
use tempfile::TempDir;

fn test_db() -> (TempDir, Db) {
    let dir = TempDir::new().unwrap();
    let db = Db::new(dir.path().join("test.sqlite"));
    db.init_schema().unwrap();
    (dir, db)
}

fn user(email: &str, name: &str) -> AuthedUser {
    AuthedUser {
        email: email.to_string(),
        display_name: name.to_string(),
    }
}

fn text_field(id: &str, label: &str) -> FieldSpec {
    FieldSpec {
        id: id.to_string(),
        field_type: FieldType::Text,
        label: label.to_string(),
        required: true,
        placeholder: None,
        options: None,
        rows: None,
    }
}

fn make_form(db: &Db, managers: &[&str], requires_approval: bool, published: bool) -> Form {
    let req = CreateFormRequest {
        title: "Expense Report".to_string(),
        description: "Reimbursement request".to_string(),
        fields: vec![text_field("field-0", "Amount"), text_field("field-1", "Reason")],
        managers: managers.iter().map(|m| m.to_string()).collect(),
        requires_approval,
        is_published: published,
    };
    create_form(db, req, &user("admin@x.com", "Admin")).unwrap()
}

fn submit(db: &Db, form_id: &str) -> Submission {
    let mut data = HashMap::new();
    data.insert("field-0".to_string(), json!("120.50"));
    data.insert("field-1".to_string(), json!("conference travel"));
    let req = CreateSubmissionRequest {
        form_id: form_id.to_string(),
        submission_data: data,
        submitter_email: Some("sam@x.com".to_string()),
        submitter_name: Some("Sam".to_string()),
    };
    create_submission(db, req, None).unwrap()
}

fn reload(db: &Db, submission_id: &str) -> Submission {
    let conn = db.conn().unwrap();
    fetch_submission(&conn, submission_id).unwrap().unwrap()
}

#[test]
fn fan_out_creates_one_pending_entry_per_manager() {
    let (_dir, db) = test_db();
    let form = make_form(&db, &["m1@x.com", "m2@x.com"], true, true);

    let submission = submit(&db, &form.id);
    assert_eq!(submission.status, SubmissionStatus::Pending);

    let ledger = reload(&db, &submission.id).approvals.unwrap();
    assert_eq!(ledger.len(), 2);
    assert!(ledger.iter().all(|a| a.status == ApprovalStatus::Pending));
    let mut managers: Vec<_> = ledger.iter().map(|a| a.manager_email.clone()).collect();
    managers.sort();
    assert_eq!(managers, vec!["m1@x.com", "m2@x.com"]);
}

#[test]
fn approval_requires_every_manager() {
    let (_dir, db) = test_db();
    let form = make_form(&db, &["m1@x.com", "m2@x.com"], true, true);
    let submission = submit(&db, &form.id);
    let ledger = reload(&db, &submission.id).approvals.unwrap();

    let m1_entry = ledger.iter().find(|a| a.manager_email == "m1@x.com").unwrap();
    let outcome = decide(
        &db,
        &m1_entry.id,
        &user("m1@x.com", "Manager One"),
        ApprovalStatus::Approved,
        "ok".to_string(),
    )
    .unwrap();
    assert_eq!(outcome.approval.status, ApprovalStatus::Approved);
    assert_eq!(outcome.approval.approved_by.as_deref(), Some("Manager One"));
    assert!(!outcome.submission_fully_approved);
    assert_eq!(reload(&db, &submission.id).status, SubmissionStatus::Pending);

    let m2_entry = ledger.iter().find(|a| a.manager_email == "m2@x.com").unwrap();
    let outcome = decide(
        &db,
        &m2_entry.id,
        &user("m2@x.com", "Manager Two"),
        ApprovalStatus::Approved,
        String::new(),
    )
    .unwrap();
    assert!(outcome.submission_fully_approved);

    let resolved = reload(&db, &submission.id);
    assert_eq!(resolved.status, SubmissionStatus::Approved);
    assert!(resolved
        .approvals
        .unwrap()
        .iter()
        .all(|a| a.status == ApprovalStatus::Approved));
}

#[test]
fn one_rejection_is_terminal_regardless_of_order() {
    let (_dir, db) = test_db();
    let form = make_form(&db, &["m1@x.com", "m2@x.com"], true, true);
    let submission = submit(&db, &form.id);
    let ledger = reload(&db, &submission.id).approvals.unwrap();

    // m2 rejects while m1 has never decided.
    let m2_entry = ledger.iter().find(|a| a.manager_email == "m2@x.com").unwrap();
    let outcome = decide(
        &db,
        &m2_entry.id,
        &user("m2@x.com", "Manager Two"),
        ApprovalStatus::Rejected,
        "missing info".to_string(),
    )
    .unwrap();
    assert!(!outcome.submission_fully_approved);
    assert_eq!(outcome.approval.comments, "missing info");

    let resolved = reload(&db, &submission.id);
    assert_eq!(resolved.status, SubmissionStatus::Rejected);
    let m1_entry = resolved
        .approvals
        .unwrap()
        .into_iter()
        .find(|a| a.manager_email == "m1@x.com")
        .unwrap();
    assert_eq!(m1_entry.status, ApprovalStatus::Pending);
}

#[test]
fn rejection_without_comments_mutates_nothing() {
    let (_dir, db) = test_db();
    let form = make_form(&db, &["m1@x.com"], true, true);
    let submission = submit(&db, &form.id);
    let ledger = reload(&db, &submission.id).approvals.unwrap();

    let err = decide(
        &db,
        &ledger[0].id,
        &user("m1@x.com", "Manager One"),
        ApprovalStatus::Rejected,
        "   ".to_string(),
    )
    .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));

    let resolved = reload(&db, &submission.id);
    assert_eq!(resolved.status, SubmissionStatus::Pending);
    assert_eq!(
        resolved.approvals.unwrap()[0].status,
        ApprovalStatus::Pending
    );
}

#[test]
fn strangers_cannot_decide_someone_elses_entry() {
    let (_dir, db) = test_db();
    let form = make_form(&db, &["m1@x.com"], true, true);
    let submission = submit(&db, &form.id);
    let ledger = reload(&db, &submission.id).approvals.unwrap();

    let err = decide(
        &db,
        &ledger[0].id,
        &user("m3@x.com", "Intruder"),
        ApprovalStatus::Approved,
        String::new(),
    )
    .unwrap_err();
    assert!(matches!(err, ApiError::NotFoundOrUnauthorized));

    // The entry is untouched and still visible to its real manager.
    let conn = db.conn().unwrap();
    let entry = find_for_manager(&conn, &ledger[0].id, "m1@x.com")
        .unwrap()
        .unwrap();
    assert_eq!(entry.status, ApprovalStatus::Pending);
    assert!(find_for_manager(&conn, &ledger[0].id, "m3@x.com")
        .unwrap()
        .is_none());
}

#[test]
fn decided_entries_are_immutable() {
    let (_dir, db) = test_db();
    let form = make_form(&db, &["m1@x.com"], true, true);
    let submission = submit(&db, &form.id);
    let ledger = reload(&db, &submission.id).approvals.unwrap();
    let manager = user("m1@x.com", "Manager One");

    decide(
        &db,
        &ledger[0].id,
        &manager,
        ApprovalStatus::Approved,
        String::new(),
    )
    .unwrap();
    let err = decide(
        &db,
        &ledger[0].id,
        &manager,
        ApprovalStatus::Rejected,
        "changed my mind".to_string(),
    )
    .unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)));
    assert_eq!(reload(&db, &submission.id).status, SubmissionStatus::Approved);
}

#[test]
fn updating_answers_keeps_the_stored_labels() {
    let (_dir, db) = test_db();
    let form = make_form(&db, &["m1@x.com"], true, true);
    let submission = submit(&db, &form.id);

    let mut data = HashMap::new();
    data.insert("field-0".to_string(), json!("99.00"));
    data.insert("field-9".to_string(), json!("not a field"));
    let updated = update_submission(
        &db,
        &submission.id,
        UpdateSubmissionRequest {
            submitter_name: None,
            submitter_email: Some("sam@corp.com".to_string()),
            submission_data: Some(data),
        },
    )
    .unwrap();

    let amount = updated
        .answers
        .iter()
        .find(|a| a.field_id == "field-0")
        .unwrap();
    assert_eq!(amount.value, json!("99.00"));
    assert_eq!(amount.label, "Amount");
    // Untouched answers survive, unknown field ids are dropped, and the
    // workflow state is not affected.
    let reason = updated
        .answers
        .iter()
        .find(|a| a.field_id == "field-1")
        .unwrap();
    assert_eq!(reason.value, json!("conference travel"));
    assert!(updated.answers.iter().all(|a| a.field_id != "field-9"));
    assert_eq!(updated.submitter_email, "sam@corp.com");
    assert_eq!(updated.status, SubmissionStatus::Pending);
}

#[test]
fn unknown_status_rows_surface_as_errors() {
    let (_dir, db) = test_db();
    let form = make_form(&db, &["m1@x.com", "m2@x.com"], true, true);
    let submission = submit(&db, &form.id);
    let ledger = reload(&db, &submission.id).approvals.unwrap();

    let m2_entry = ledger.iter().find(|a| a.manager_email == "m2@x.com").unwrap();
    let conn = db.conn().unwrap();
    conn.execute(
        "UPDATE approvals SET status = 'maybe' WHERE id = ?1",
        params![m2_entry.id],
    )
    .unwrap();
    drop(conn);

    // The corrupt row must fail the recompute, not masquerade as pending.
    let m1_entry = ledger.iter().find(|a| a.manager_email == "m1@x.com").unwrap();
    let err = decide(
        &db,
        &m1_entry.id,
        &user("m1@x.com", "Manager One"),
        ApprovalStatus::Approved,
        String::new(),
    )
    .unwrap_err();
    assert!(matches!(err, ApiError::Store(_)));
}

#[test]
fn forms_without_approval_skip_the_ledger() {
    let (_dir, db) = test_db();
    let form = make_form(&db, &["m1@x.com"], false, true);
    let submission = submit(&db, &form.id);
    assert_eq!(submission.status, SubmissionStatus::Submitted);
    assert!(reload(&db, &submission.id).approvals.unwrap().is_empty());
}

#[test]
fn empty_manager_set_bypasses_approval() {
    let (_dir, db) = test_db();
    let form = make_form(&db, &[], true, true);
    let submission = submit(&db, &form.id);
    assert_eq!(submission.status, SubmissionStatus::Submitted);
    assert!(reload(&db, &submission.id).approvals.unwrap().is_empty());
}

#[test]
fn submissions_against_missing_or_draft_forms_fail() {
    let (_dir, db) = test_db();
    let req = CreateSubmissionRequest {
        form_id: "no-such-form".to_string(),
        submission_data: HashMap::new(),
        submitter_email: None,
        submitter_name: None,
    };
    assert!(matches!(
        create_submission(&db, req, None).unwrap_err(),
        ApiError::NotFound(_)
    ));

    let draft = make_form(&db, &["m1@x.com"], true, false);
    let req = CreateSubmissionRequest {
        form_id: draft.id,
        submission_data: HashMap::new(),
        submitter_email: None,
        submitter_name: None,
    };
    assert!(matches!(
        create_submission(&db, req, None).unwrap_err(),
        ApiError::UnpublishedForm
    ));
}

#[test]
fn manager_queries_cover_forms_and_pending_work() {
    let (_dir, db) = test_db();
    let form = make_form(&db, &["m1@x.com", "m2@x.com"], true, true);
    // A second form m1 does not manage.
    make_form(&db, &["m2@x.com"], true, true);
    let submission = submit(&db, &form.id);

    let forms = managed_forms(&db, "m1@x.com").unwrap();
    assert_eq!(forms.len(), 1);
    assert_eq!(forms[0].id, form.id);

    let awaiting = submissions_awaiting(&db, "m1@x.com").unwrap();
    assert_eq!(awaiting.len(), 1);
    assert_eq!(awaiting[0].id, submission.id);
    assert_eq!(awaiting[0].form.as_ref().unwrap().title, "Expense Report");

    let pending = manager_approvals(&db, "m1@x.com", Some(ApprovalStatus::Pending)).unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].submission.id, submission.id);

    // Once m1 decides, the pending queue drains.
    decide(
        &db,
        &pending[0].approval.id,
        &user("m1@x.com", "Manager One"),
        ApprovalStatus::Approved,
        String::new(),
    )
    .unwrap();
    assert!(manager_approvals(&db, "m1@x.com", Some(ApprovalStatus::Pending))
        .unwrap()
        .is_empty());
}

#[test]
fn deleting_a_form_cascades_through_the_ledger() {
    let (_dir, db) = test_db();
    let form = make_form(&db, &["m1@x.com"], true, true);
    let first = submit(&db, &form.id);
    let second = submit(&db, &form.id);

    let response = delete_form(&db, &form.id).unwrap();
    assert_eq!(response.deleted_submissions, 2);

    let conn = db.conn().unwrap();
    assert!(fetch_submission(&conn, &first.id).unwrap().is_none());
    assert!(fetch_submission(&conn, &second.id).unwrap().is_none());
    let orphans: i64 = conn
        .query_row("SELECT COUNT(*) FROM approvals", [], |row| row.get(0))
        .unwrap();
    assert_eq!(orphans, 0);

    assert!(matches!(
        delete_form(&db, &form.id).unwrap_err(),
        ApiError::NotFound(_)
    ));
}
