use std::net::SocketAddr;

use axum::Router;
use configs::AppConfig;
use migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use tracing::info;

use models::db::{connect_with_config, DatabaseConfig};
use service::auth::service::AuthConfig;

use crate::errors::StartupError;
use crate::routes::{self, auth};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Configuration plus the reason `config.toml` was skipped, if it was.
/// Logging is not initialised yet when this runs.
pub struct LoadedConfig {
    pub config: AppConfig,
    pub file_error: Option<String>,
}

/// `config.toml` when present, otherwise environment variables only
pub fn load_config() -> Result<LoadedConfig, StartupError> {
    match AppConfig::load_and_validate() {
        Ok(config) => Ok(LoadedConfig { config, file_error: None }),
        Err(file_err) => {
            let config = AppConfig::from_env().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
            Ok(LoadedConfig { config, file_error: Some(file_err.to_string()) })
        }
    }
}

fn auth_config(cfg: &AppConfig) -> AuthConfig {
    AuthConfig {
        jwt_secret: Some(cfg.auth.jwt_secret.clone()),
        token_ttl_hours: cfg.auth.token_ttl_hours,
        ..AuthConfig::default()
    }
}

/// Connect, migrate and serve with an already loaded configuration.
/// Logging is the caller's to initialise.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    // DB connection and schema
    let db = connect_with_config(&DatabaseConfig::from(&cfg.database))
        .await
        .map_err(|e| StartupError::Database(e.to_string()))?;
    migration::Migrator::up(&db, None)
        .await
        .map_err(|e| StartupError::Database(e.to_string()))?;
    info!("database migrated");

    let state = auth::ServerState::new(db, auth_config(&cfg));
    let app: Router = routes::build_router(state, build_cors());

    // Bind and serve
    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bad bind address: {e}")))?;
    info!(%addr, "starting titles server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_config_carries_secret_and_ttl() {
        let mut cfg = AppConfig::default();
        cfg.auth.jwt_secret = "s3cret".into();
        cfg.auth.token_ttl_hours = 2;
        let auth = auth_config(&cfg);
        assert_eq!(auth.jwt_secret.as_deref(), Some("s3cret"));
        assert_eq!(auth.token_ttl_hours, 2);
        assert_eq!(auth.password_algorithm, "argon2");
    }

    #[test]
    fn missing_config_file_falls_back_to_env_and_reports_why() {
        std::env::set_var("CONFIG_PATH", "/nonexistent/titles-config.toml");
        std::env::set_var("DATABASE_URL", "sqlite::memory:");
        std::env::set_var("JWT_SECRET", "env-secret");
        let loaded = load_config().unwrap();
        assert!(loaded.file_error.is_some());
        assert_eq!(loaded.config.database.url, "sqlite::memory:");
        assert_eq!(loaded.config.auth.jwt_secret, "env-secret");
    }

    #[tokio::test]
    async fn run_reports_unreachable_database() {
        let mut cfg = AppConfig::default();
        cfg.database.url = "sqlite:/nonexistent-dir/titles.db".into();
        cfg.database.min_connections = 1;
        cfg.database.max_connections = 1;
        cfg.database.connect_timeout_secs = 1;
        cfg.database.acquire_timeout_secs = 1;
        let err = run(cfg).await.unwrap_err();
        assert!(err.to_string().starts_with("database setup failed"), "{err}");
    }
}
