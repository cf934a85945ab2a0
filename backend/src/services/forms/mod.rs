//! # Form Registry Service
//!
//! CRUD over form definitions plus the manager-facing queries and the CSV
//! export. All endpoints live under `/api/forms`.
//!
//! ## Sub-modules:
//! - `list`: listing with filters, and the public published-forms feed.
//! - `get`: single-form retrieval.
//! - `save`: creation and update, including field validation.
//! - `publish`: flipping `is_published` in either direction.
//! - `remove`: cascade deletion of a form with its submissions and
//!   approval ledger entries.
//! - `manager`: "forms I manage" and "submissions awaiting approval across
//!   my forms".
//! - `export`: CSV download of a form's submissions, restricted to its
//!   managers.
//!
//! Literal paths (`/published`, `/manager`, `/requiring-approval`) are
//! registered before the `/{id}` routes so they are not captured as ids.

pub mod export;
pub mod get;
pub mod list;
pub mod manager;
pub mod publish;
pub mod remove;
pub mod save;

use actix_web::web;
use actix_web::Scope;

const API_PATH: &str = "/api/forms";

pub fn configure_routes() -> Scope {
    web::scope(API_PATH)
        .route("", web::get().to(list::process))
        .route("", web::post().to(save::create))
        .route("/published", web::get().to(list::published))
        .route("/manager", web::get().to(manager::forms))
        .route("/requiring-approval", web::get().to(manager::submissions))
        .route("/{id}/export", web::get().to(export::process))
        .route("/{id}/publish", web::patch().to(publish::publish))
        .route("/{id}/unpublish", web::patch().to(publish::unpublish))
        .route("/{id}", web::get().to(get::process))
        .route("/{id}", web::put().to(save::update))
        .route("/{id}", web::delete().to(remove::process))
}
