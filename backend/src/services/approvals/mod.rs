//! # Approval Service
//!
//! The approval resolution engine and its query surface, under
//! `/api/approvals`.
//!
//! ## Registered routes:
//!
//! *   **`GET /pending`** — the caller's own pending ledger entries, joined
//!     with submission and form metadata, newest first.
//! *   **`GET /manager/{manager_email}`** — a manager's entries, optionally
//!     filtered by status.
//! *   **`GET /{id}`** — one ledger entry with submission context.
//! *   **`POST /{id}/approve`** — the caller approves their entry; comments
//!     optional.
//! *   **`POST /{id}/reject`** — the caller rejects their entry; comments
//!     required.
//!
//! The decision handlers enforce that only the manager named on an entry
//! may act on it, and recompute the submission's aggregate status inside
//! the same transaction. See `decide` for the state machine.

pub mod decide;
pub mod get;

use actix_web::web;
use actix_web::Scope;

const API_PATH: &str = "/api/approvals";

pub fn configure_routes() -> Scope {
    web::scope(API_PATH)
        .route("/pending", web::get().to(get::pending))
        .route("/manager/{manager_email}", web::get().to(get::by_manager))
        .route("/{id}/approve", web::post().to(decide::approve))
        .route("/{id}/reject", web::post().to(decide::reject))
        .route("/{id}", web::get().to(get::process))
}
