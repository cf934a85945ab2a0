//! Request identity resolution and the bearer-token cache.
//!
//! The identity provider itself is an external collaborator: everything the
//! engine needs is `resolve(token) -> AuthedUser`, expressed by the
//! [`IdentityResolver`] trait. The shipped [`DirectoryResolver`] reads a
//! token-to-user map from a JSON file; a production deployment swaps in a
//! resolver that calls the real provider without touching any handler.
//!
//! Resolved identities are cached per token with a bounded TTL. The cache is
//! a convenience, never an authority: expired entries are re-resolved, so a
//! revoked token stops resolving within one TTL. A background task spawned
//! from `main.rs` sweeps expired entries on the same interval.

use crate::error::ApiError;
use actix_web::HttpRequest;
use common::model::user::AuthedUser;
use log::debug;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Capability consumed by the engine: turn a bearer credential into a
/// stable identity, or fail with an authentication error.
pub trait IdentityResolver: Send + Sync {
    fn resolve(&self, token: &str) -> Result<AuthedUser, ApiError>;
}

/// File-backed resolver: a JSON object mapping bearer tokens to users.
/// Stands in for the real identity provider behind the same trait seam.
pub struct DirectoryResolver {
    users: HashMap<String, AuthedUser>,
}

impl DirectoryResolver {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ApiError> {
        let raw = fs::read_to_string(path.as_ref())
            .map_err(|e| ApiError::Internal(format!("cannot read users file: {e}")))?;
        let users = serde_json::from_str(&raw)?;
        Ok(DirectoryResolver { users })
    }

    pub fn from_map(users: HashMap<String, AuthedUser>) -> Self {
        DirectoryResolver { users }
    }

    /// Empty directory: every token is rejected. Used when no users file
    /// is configured.
    pub fn empty() -> Self {
        DirectoryResolver {
            users: HashMap::new(),
        }
    }
}

impl IdentityResolver for DirectoryResolver {
    fn resolve(&self, token: &str) -> Result<AuthedUser, ApiError> {
        self.users
            .get(token)
            .cloned()
            .ok_or_else(|| ApiError::Authentication("Invalid or expired token".to_string()))
    }
}

struct CachedIdentity {
    user: AuthedUser,
    cached_at: Instant,
}

/// Shared authentication state: the resolver plus the per-token cache.
/// Injected into the Actix application as `web::Data` and cloned per worker.
#[derive(Clone)]
pub struct AuthState {
    resolver: Arc<dyn IdentityResolver>,
    cache: Arc<RwLock<HashMap<String, CachedIdentity>>>,
    ttl: Duration,
}

impl AuthState {
    pub fn new(resolver: Arc<dyn IdentityResolver>, ttl: Duration) -> Self {
        AuthState {
            resolver,
            cache: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Resolves a bearer token, consulting the cache first. A hit older
    /// than the TTL is ignored and the token is re-resolved.
    pub async fn resolve_token(&self, token: &str) -> Result<AuthedUser, ApiError> {
        {
            let cache = self.cache.read().await;
            if let Some(entry) = cache.get(token) {
                if entry.cached_at.elapsed() < self.ttl {
                    return Ok(entry.user.clone());
                }
            }
        }

        let user = self.resolver.resolve(token)?;
        let mut cache = self.cache.write().await;
        cache.insert(
            token.to_string(),
            CachedIdentity {
                user: user.clone(),
                cached_at: Instant::now(),
            },
        );
        Ok(user)
    }

    /// Drops every cache entry older than the TTL.
    pub async fn evict_expired(&self) {
        let mut cache = self.cache.write().await;
        let before = cache.len();
        cache.retain(|_, entry| entry.cached_at.elapsed() < self.ttl);
        let evicted = before - cache.len();
        if evicted > 0 {
            debug!("evicted {} expired token cache entries", evicted);
        }
    }

    #[cfg(test)]
    async fn cached_len(&self) -> usize {
        self.cache.read().await.len()
    }
}

/// Periodic cache sweep, spawned once from `main.rs`.
pub async fn start_cache_sweeper(state: AuthState) {
    let mut interval = tokio::time::interval(sweep_period(state.ttl()));
    loop {
        interval.tick().await;
        state.evict_expired().await;
    }
}

/// `tokio::time::interval` panics on a zero period, so a zero TTL (cache
/// disabled) still sweeps once a second.
fn sweep_period(ttl: Duration) -> Duration {
    ttl.max(Duration::from_secs(1))
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Resolves the caller's identity or fails with 401. Every protected
/// handler calls this first.
pub async fn require_user(req: &HttpRequest, auth: &AuthState) -> Result<AuthedUser, ApiError> {
    let token = bearer_token(req)
        .ok_or_else(|| ApiError::Authentication("No token provided".to_string()))?;
    auth.resolve_token(token).await
}

/// Like [`require_user`] but tolerant of missing or invalid credentials,
/// for endpoints with anonymous intake (public submission creation).
pub async fn optional_user(req: &HttpRequest, auth: &AuthState) -> Option<AuthedUser> {
    let token = bearer_token(req)?;
    auth.resolve_token(token).await.ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> Arc<DirectoryResolver> {
        let mut users = HashMap::new();
        users.insert(
            "token-m1".to_string(),
            AuthedUser {
                email: "m1@x.com".to_string(),
                display_name: "Manager One".to_string(),
            },
        );
        Arc::new(DirectoryResolver::from_map(users))
    }

    #[actix_web::test]
    async fn resolves_and_caches_known_tokens() {
        let auth = AuthState::new(directory(), Duration::from_secs(300));
        let user = auth.resolve_token("token-m1").await.unwrap();
        assert_eq!(user.email, "m1@x.com");
        assert_eq!(auth.cached_len().await, 1);
    }

    #[actix_web::test]
    async fn rejects_unknown_tokens() {
        let auth = AuthState::new(directory(), Duration::from_secs(300));
        let err = auth.resolve_token("bogus").await.unwrap_err();
        assert!(matches!(err, ApiError::Authentication(_)));
        assert_eq!(auth.cached_len().await, 0);
    }

    #[test]
    fn zero_ttl_never_yields_a_zero_sweep_period() {
        assert_eq!(sweep_period(Duration::ZERO), Duration::from_secs(1));
        assert_eq!(
            sweep_period(Duration::from_secs(300)),
            Duration::from_secs(300)
        );
    }

    #[actix_web::test]
    async fn expired_entries_are_swept() {
        let auth = AuthState::new(directory(), Duration::from_millis(0));
        auth.resolve_token("token-m1").await.unwrap();
        auth.evict_expired().await;
        assert_eq!(auth.cached_len().await, 0);
    }
}
