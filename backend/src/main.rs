use actix_web::{web, App, HttpServer};
use backend::auth::{self, AuthState, DirectoryResolver};
use backend::config::AppConfig;
use backend::db::Db;
use backend::services;
use env_logger::Env;
use log::{info, warn};
use std::io;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    let config = AppConfig::from_env();

    let db = Db::new(&config.database_path);
    db.init_schema().map_err(io::Error::other)?;
    if config.seed_sample_data {
        db.seed_sample_forms().map_err(io::Error::other)?;
    }

    let resolver: Arc<DirectoryResolver> = match &config.users_file {
        Some(path) => Arc::new(DirectoryResolver::from_file(path).map_err(io::Error::other)?),
        None => {
            warn!("no USERS_FILE configured; every bearer token will be rejected");
            Arc::new(DirectoryResolver::empty())
        }
    };
    let auth_state = AuthState::new(resolver, config.token_ttl);

    // Periodically drop expired token cache entries.
    let sweeper_state = auth_state.clone();
    tokio::spawn(async move {
        auth::start_cache_sweeper(sweeper_state).await;
    });

    info!(
        "Server running at http://{}:{} (database: {})",
        config.host, config.port, config.database_path
    );

    let bind_addr = (config.host.clone(), config.port);
    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(10 * 1024 * 1024)) // 10 MB
            .app_data(web::Data::new(db.clone()))
            .app_data(web::Data::new(auth_state.clone()))
            .route("/api/health", web::get().to(services::health))
            .service(services::forms::configure_routes())
            .service(services::submissions::configure_routes())
            .service(services::approvals::configure_routes())
            .service(services::users::configure_routes())
    })
    .bind(bind_addr)?
    .run()
    .await
}
