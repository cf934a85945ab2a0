pub mod approvals;
pub mod forms;
pub mod submissions;
pub mod users;

use crate::db::now_rfc3339;
use actix_web::HttpResponse;
use serde_json::json;

/// `GET /api/health` — public liveness probe.
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "OK",
        "message": "Form Builder API is running",
        "timestamp": now_rfc3339(),
    }))
}
