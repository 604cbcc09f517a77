//! Permission repository implementation.

use sqlx::PgPool;
use tracing::info;

use warden_core::error::{AppError, ErrorKind};
use warden_core::result::AppResult;
use warden_core::types::PermissionId;
use warden_entity::permission::{CreatePermission, Permission};

/// Repository for permission rows.
#[derive(Debug, Clone)]
pub struct PermissionRepository {
    pool: PgPool,
}

impl PermissionRepository {
    /// Create a new permission repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a permission.
    ///
    /// A duplicate token surfaces the store's unique violation as a
    /// `Conflict` error; nothing is overwritten.
    pub async fn create(&self, input: CreatePermission) -> AppResult<Permission> {
        input.validate()?;
        let permission = input.into_permission();

        let created = sqlx::query_as::<_, Permission>(
            "INSERT INTO permissions (id, token, description) VALUES ($1, $2, $3) \
             RETURNING id, token, description",
        )
        .bind(permission.id)
        .bind(&permission.token)
        .bind(&permission.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match AppError::from(e) {
            err if err.kind == ErrorKind::Conflict => AppError {
                message: format!("Permission token '{}' already exists", permission.token),
                ..err
            },
            err => err,
        })?;

        info!(permission_id = %created.id, token = %created.token, "Permission created");
        Ok(created)
    }

    /// Find a permission by ID.
    pub async fn find_by_id(&self, id: PermissionId) -> AppResult<Option<Permission>> {
        sqlx::query_as::<_, Permission>(
            "SELECT id, token, description FROM permissions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find permission", e))
    }

    /// Find a permission by token.
    pub async fn find_by_token(&self, token: &str) -> AppResult<Option<Permission>> {
        sqlx::query_as::<_, Permission>(
            "SELECT id, token, description FROM permissions WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find permission", e))
    }

    /// List all permissions ordered by token.
    pub async fn find_all(&self) -> AppResult<Vec<Permission>> {
        sqlx::query_as::<_, Permission>(
            "SELECT id, token, description FROM permissions ORDER BY token ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list permissions", e))
    }

    /// Delete a permission. Its edges go with it via `ON DELETE CASCADE`.
    pub async fn delete(&self, id: PermissionId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM permissions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete permission", e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}
