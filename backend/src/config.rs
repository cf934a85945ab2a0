use std::env;
use std::time::Duration;

/// Server configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Path of the SQLite database file.
    pub database_path: String,
    /// How long a resolved bearer token stays in the identity cache.
    pub token_ttl: Duration,
    /// Optional JSON file mapping bearer tokens to directory users.
    pub users_file: Option<String>,
    /// Insert the example forms on startup when the database is empty.
    pub seed_sample_data: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(5000);
        let token_ttl_secs = env::var("TOKEN_CACHE_TTL_SECS")
            .ok()
            .and_then(|t| t.parse().ok())
            .unwrap_or(300);

        AppConfig {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port,
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "formbuilder.sqlite".to_string()),
            token_ttl: Duration::from_secs(token_ttl_secs),
            users_file: env::var("USERS_FILE").ok(),
            seed_sample_data: env::var("SEED_SAMPLE_DATA")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }
}
