//! # User Service
//!
//! Identity-adjacent endpoints under `/api/users`: the caller's resolved
//! profile and the email-format check the form builder runs before adding
//! a manager to a form.

use crate::auth::{self, AuthState};
use crate::error::ApiError;
use actix_web::{web, HttpRequest, HttpResponse, Scope};
use common::model::user::AuthedUser;
use common::requests::{ValidateEmailRequest, ValidateEmailResponse};
use regex::Regex;

const API_PATH: &str = "/api/users";

pub fn configure_routes() -> Scope {
    web::scope(API_PATH)
        .route("/me", web::get().to(me))
        .route("/validate-email", web::post().to(validate_email))
}

/// `GET /api/users/me`
pub async fn me(req: HttpRequest, auth: web::Data<AuthState>) -> Result<HttpResponse, ApiError> {
    let user = auth::require_user(&req, &auth).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// `POST /api/users/validate-email` — format check only; the directory is
/// not consulted. An invalid address is a `valid: false` answer, not an
/// error.
pub async fn validate_email(
    req: HttpRequest,
    auth: web::Data<AuthState>,
    payload: web::Json<ValidateEmailRequest>,
) -> Result<HttpResponse, ApiError> {
    auth::require_user(&req, &auth).await?;
    let email = payload.email.trim();
    if email.is_empty() {
        return Err(ApiError::Validation("Email is required".to_string()));
    }
    Ok(HttpResponse::Ok().json(check_email(email)?))
}

pub fn check_email(email: &str) -> Result<ValidateEmailResponse, ApiError> {
    let email_re = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
        .map_err(|e| ApiError::Internal(format!("regex error: {e}")))?;
    if email_re.is_match(email) {
        let display_name = email.split('@').next().unwrap_or(email).to_string();
        Ok(ValidateEmailResponse {
            valid: true,
            message: "Valid email address".to_string(),
            user: Some(AuthedUser {
                email: email.to_string(),
                display_name,
            }),
        })
    } else {
        Ok(ValidateEmailResponse {
            valid: false,
            message: "Please enter a valid email address".to_string(),
            user: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        let res = check_email("m1@x.com").unwrap();
        assert!(res.valid);
        assert_eq!(res.user.unwrap().display_name, "m1");
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!check_email("not-an-email").unwrap().valid);
        assert!(!check_email("a@b").unwrap().valid);
        assert!(!check_email("a b@c.com").unwrap().valid);
    }
}
