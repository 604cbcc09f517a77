//! PostgreSQL pool shared by the Warden repositories.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use warden_core::config::DatabaseConfig;
use warden_core::error::{AppError, ErrorKind};
use warden_core::result::AppResult;

use crate::repositories::{GraphRepository, PermissionRepository};

/// A connected pool and the repositories built on it.
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// Opens a pool sized by `config`.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        info!(
            url = %mask_password(&config.url),
            max_connections = config.max_connections,
            "Opening authorization store pool"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .connect(&config.url)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Authorization store unreachable: {e}"),
                    e,
                )
            })?;
        Ok(Self { pool })
    }

    /// Wraps a pool owned by the host application.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying sqlx pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Permission rows.
    pub fn permissions(&self) -> PermissionRepository {
        PermissionRepository::new(self.pool.clone())
    }

    /// Groups, bundles, subjects, and their edges.
    pub fn graph(&self) -> GraphRepository {
        GraphRepository::new(self.pool.clone())
    }

    /// Round-trips a trivial query.
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Ping failed", e))
    }
}

/// Mask the password portion of a database URL for safe logging.
fn mask_password(url: &str) -> String {
    let Some(at_pos) = url.rfind('@') else {
        return url.to_string();
    };
    let scheme_end = url.find("://").map(|p| p + 3).unwrap_or(0);
    match url[..at_pos].rfind(':') {
        Some(colon_pos) if colon_pos > scheme_end => {
            format!("{}:****@{}", &url[..colon_pos], &url[at_pos + 1..])
        }
        _ => url.to_string(),
    }
}
