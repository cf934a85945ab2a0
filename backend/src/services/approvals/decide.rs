//! The decision transition of the approval resolution engine.
//!
//! Per-submission state machine:
//!
//! ```text
//! pending --(all entries approved)--> approved   [terminal]
//! pending --(any entry rejected)----> rejected   [terminal]
//! ```
//!
//! Approval requires unanimous consent; a single rejection is terminal for
//! the whole submission regardless of the other managers' entries. Each
//! ledger entry itself transitions out of `pending` exactly once — a second
//! decision on the same entry fails with 409.
//!
//! Authorization is enforced by the lookup itself: [`find_for_manager`]
//! matches the entry id and the caller's email in one query, and a miss is
//! reported as not-found-or-unauthorized without distinguishing the two, so
//! callers cannot probe for entries belonging to other managers.
//!
//! The update and the aggregate recompute run in one transaction. The
//! recompute re-reads every entry of the submission after the write, so
//! concurrent decisions by different managers always resolve against a
//! consistent ledger.

use crate::auth::{self, AuthState};
use crate::db::{map_approval, now_rfc3339, status_column, Db, APPROVAL_COLUMNS};
use crate::error::ApiError;
use actix_web::{web, HttpRequest, HttpResponse};
use common::model::approval::{Approval, ApprovalStatus};
use common::model::submission::SubmissionStatus;
use common::model::user::AuthedUser;
use common::requests::{DecisionRequest, DecisionResponse};
use log::info;
use rusqlite::{params, Connection, OptionalExtension};

/// `POST /api/approvals/{id}/approve`
pub async fn approve(
    req: HttpRequest,
    auth: web::Data<AuthState>,
    db: web::Data<Db>,
    id: web::Path<String>,
    payload: web::Json<DecisionRequest>,
) -> Result<HttpResponse, ApiError> {
    let user = auth::require_user(&req, &auth).await?;
    let comments = payload.comments.clone().unwrap_or_default();
    let response = decide(&db, &id, &user, ApprovalStatus::Approved, comments)?;
    Ok(HttpResponse::Ok().json(response))
}

/// `POST /api/approvals/{id}/reject` — comments are mandatory so the
/// submitter always learns why.
pub async fn reject(
    req: HttpRequest,
    auth: web::Data<AuthState>,
    db: web::Data<Db>,
    id: web::Path<String>,
    payload: web::Json<DecisionRequest>,
) -> Result<HttpResponse, ApiError> {
    let user = auth::require_user(&req, &auth).await?;
    let comments = payload.comments.clone().unwrap_or_default();
    let response = decide(&db, &id, &user, ApprovalStatus::Rejected, comments)?;
    Ok(HttpResponse::Ok().json(response))
}

/// Looks up an approval entry by id AND manager identity in a single
/// query. Existence and ownership are deliberately indistinguishable.
pub fn find_for_manager(
    conn: &Connection,
    approval_id: &str,
    manager_email: &str,
) -> Result<Option<Approval>, ApiError> {
    let entry = conn
        .query_row(
            &format!(
                "SELECT {APPROVAL_COLUMNS} FROM approvals \
                 WHERE id = ?1 AND manager_email = ?2"
            ),
            params![approval_id, manager_email],
            map_approval,
        )
        .optional()?;
    Ok(entry)
}

/// Applies one manager decision and recomputes the submission's aggregate
/// status, atomically.
pub fn decide(
    db: &Db,
    approval_id: &str,
    user: &AuthedUser,
    decision: ApprovalStatus,
    comments: String,
) -> Result<DecisionResponse, ApiError> {
    debug_assert_ne!(decision, ApprovalStatus::Pending);
    if decision == ApprovalStatus::Rejected && comments.trim().is_empty() {
        return Err(ApiError::Validation(
            "Comments are required for rejection".to_string(),
        ));
    }

    let mut conn = db.conn()?;
    let tx = conn.transaction()?;

    let mut entry =
        find_for_manager(&tx, approval_id, &user.email)?.ok_or(ApiError::NotFoundOrUnauthorized)?;
    if entry.status != ApprovalStatus::Pending {
        return Err(ApiError::Conflict(
            "Approval has already been decided".to_string(),
        ));
    }

    let now = now_rfc3339();
    tx.execute(
        "UPDATE approvals SET status = ?1, comments = ?2, approved_at = ?3, approved_by = ?4 \
         WHERE id = ?5",
        params![
            decision.as_str(),
            comments,
            now,
            user.display_name,
            entry.id
        ],
    )?;
    entry.status = decision;
    entry.comments = comments;
    entry.approved_at = Some(now);
    entry.approved_by = Some(user.display_name.clone());

    // Re-read the full ledger after the write; inside the transaction this
    // is the authoritative state.
    let mut stmt = tx.prepare("SELECT status FROM approvals WHERE submission_id = ?1")?;
    let statuses = stmt
        .query_map(params![entry.submission_id], |row| {
            status_column(row, 0, ApprovalStatus::parse)
        })?
        .collect::<Result<Vec<_>, _>>()?;
    drop(stmt);

    let aggregate = aggregate_status(&statuses);
    if let Some(status) = aggregate {
        tx.execute(
            "UPDATE submissions SET status = ?1 WHERE id = ?2",
            params![status.as_str(), entry.submission_id],
        )?;
    }
    tx.commit()?;

    let fully_approved = aggregate == Some(SubmissionStatus::Approved);
    info!(
        "manager {} marked approval {} as {}; submission {} is {}",
        user.email,
        entry.id,
        entry.status.as_str(),
        entry.submission_id,
        aggregate.map(|s| s.as_str()).unwrap_or("still pending"),
    );
    Ok(DecisionResponse {
        approval: entry,
        submission_fully_approved: fully_approved,
    })
}

/// Derives the submission-level status from the ledger. Pure function of
/// the entries: any rejection is terminal, approval requires unanimity,
/// and anything else leaves the submission untouched (`None`).
pub fn aggregate_status(entries: &[ApprovalStatus]) -> Option<SubmissionStatus> {
    if entries.iter().any(|s| *s == ApprovalStatus::Rejected) {
        Some(SubmissionStatus::Rejected)
    } else if !entries.is_empty() && entries.iter().all(|s| *s == ApprovalStatus::Approved) {
        Some(SubmissionStatus::Approved)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ApprovalStatus::{Approved, Pending, Rejected};

    #[test]
    fn approval_requires_unanimity() {
        assert_eq!(aggregate_status(&[Approved, Pending]), None);
        assert_eq!(
            aggregate_status(&[Approved, Approved]),
            Some(SubmissionStatus::Approved)
        );
        assert_eq!(aggregate_status(&[Approved]), Some(SubmissionStatus::Approved));
    }

    #[test]
    fn a_single_rejection_dominates() {
        assert_eq!(
            aggregate_status(&[Approved, Rejected]),
            Some(SubmissionStatus::Rejected)
        );
        assert_eq!(
            aggregate_status(&[Rejected, Pending, Pending]),
            Some(SubmissionStatus::Rejected)
        );
    }

    #[test]
    fn empty_ledger_never_resolves() {
        assert_eq!(aggregate_status(&[]), None);
    }

    #[test]
    fn recomputation_is_idempotent() {
        let ledger = [Approved, Pending, Approved];
        assert_eq!(aggregate_status(&ledger), aggregate_status(&ledger));
    }
}
