//! # Submission Service
//!
//! CRUD over submission records under `/api/submissions`. Creation is the
//! interesting path: it runs the approval fan-out, inserting one pending
//! ledger entry per manager of the target form in the same transaction as
//! the submission itself (see `create`).

pub mod create;
pub mod get;
pub mod remove;
pub mod update;

use actix_web::web;
use actix_web::Scope;

const API_PATH: &str = "/api/submissions";

pub fn configure_routes() -> Scope {
    web::scope(API_PATH)
        .route("", web::get().to(get::list))
        .route("", web::post().to(create::process))
        .route("/form/{form_id}", web::get().to(get::by_form))
        .route("/{id}", web::get().to(get::process))
        .route("/{id}", web::put().to(update::process))
        .route("/{id}", web::delete().to(remove::process))
}
