//! Group, bundle, subject, and association repository.
//!
//! Reads load a [`GraphSnapshot`] inside one `REPEATABLE READ` read-only
//! transaction so a single resolution sees a single consistent graph.

use sqlx::{PgConnection, PgPool};
use tracing::debug;
use uuid::Uuid;

use warden_core::error::{AppError, ErrorKind};
use warden_core::result::AppResult;
use warden_core::types::{PermissionBundleId, PermissionId, SubjectId, UserGroupId};
use warden_entity::group::{CreateUserGroup, UserGroup};
use warden_entity::permission::{CreatePermissionBundle, Permission, PermissionBundle};
use warden_entity::subject::{CreateSubject, Subject};

use crate::snapshot::GraphSnapshot;

/// Row shape of a permission joined through a link table.
type LinkedPermissionRow = (Uuid, PermissionId, String, String);

/// Repository for the non-permission collections and their edges.
#[derive(Debug, Clone)]
pub struct GraphRepository {
    pool: PgPool,
}

impl GraphRepository {
    /// Create a new graph repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load a subject with its memberships and the edges below them.
    ///
    /// Fails with `NotFound` if the subject row does not exist.
    pub async fn load_subject_graph(
        &self,
        subject_id: SubjectId,
    ) -> AppResult<(Subject, GraphSnapshot)> {
        let mut tx = self.begin_snapshot().await?;

        let mut subject =
            sqlx::query_as::<_, Subject>("SELECT id, name FROM subjects WHERE id = $1")
                .bind(subject_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| db_error("Failed to load subject", e))?
                .ok_or_else(|| AppError::not_found(format!("Subject {subject_id} not found")))?;

        subject.user_groups = sqlx::query_scalar::<_, UserGroupId>(
            "SELECT user_group_id FROM subject_user_group_map WHERE subject_id = $1",
        )
        .bind(subject_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to load subject memberships", e))?;

        let snapshot = load_edges(&mut *tx, &subject.user_groups).await?;
        tx.commit()
            .await
            .map_err(|e| db_error("Failed to close snapshot transaction", e))?;

        debug!(
            subject_id = %subject_id,
            groups = subject.user_groups.len(),
            "Loaded subject graph"
        );
        Ok((subject, snapshot))
    }

    /// Load the edges below a single group, for group-level auditing.
    pub async fn load_group_graph(&self, group_id: UserGroupId) -> AppResult<GraphSnapshot> {
        let mut tx = self.begin_snapshot().await?;
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM user_groups WHERE id = $1)",
        )
        .bind(group_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to load user group", e))?;
        if !exists {
            return Err(AppError::not_found(format!("User group {group_id} not found")));
        }

        let snapshot = load_edges(&mut *tx, &[group_id]).await?;
        tx.commit()
            .await
            .map_err(|e| db_error("Failed to close snapshot transaction", e))?;
        Ok(snapshot)
    }

    async fn begin_snapshot(&self) -> AppResult<sqlx::Transaction<'static, sqlx::Postgres>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin snapshot transaction", e))?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to set snapshot isolation", e))?;
        Ok(tx)
    }

    /// Insert a user group.
    pub async fn create_group(&self, input: CreateUserGroup) -> AppResult<UserGroup> {
        let group = input.into_group();
        sqlx::query_as::<_, UserGroup>(
            "INSERT INTO user_groups (id, label) VALUES ($1, $2) RETURNING id, label",
        )
        .bind(group.id)
        .bind(&group.label)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)
    }

    /// Insert a permission bundle.
    pub async fn create_bundle(&self, input: CreatePermissionBundle) -> AppResult<PermissionBundle> {
        let bundle = input.into_bundle();
        sqlx::query_as::<_, PermissionBundle>(
            "INSERT INTO permission_bundles (id, label) VALUES ($1, $2) RETURNING id, label",
        )
        .bind(bundle.id)
        .bind(&bundle.label)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)
    }

    /// Insert a subject.
    pub async fn create_subject(&self, input: CreateSubject) -> AppResult<Subject> {
        let subject = input.into_subject();
        sqlx::query_as::<_, Subject>(
            "INSERT INTO subjects (id, name) VALUES ($1, $2) RETURNING id, name",
        )
        .bind(subject.id)
        .bind(&subject.name)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)
    }

    /// Grant a permission directly to a group.
    pub async fn link_group_permission(
        &self,
        group: UserGroupId,
        permission: PermissionId,
    ) -> AppResult<()> {
        self.link(
            "INSERT INTO user_group_permission_map (user_group_id, permission_id) \
             VALUES ($1, $2) ON CONFLICT DO NOTHING",
            group.into_uuid(),
            permission.into_uuid(),
        )
        .await
    }

    /// Attach a bundle to a group.
    pub async fn link_group_bundle(
        &self,
        group: UserGroupId,
        bundle: PermissionBundleId,
    ) -> AppResult<()> {
        self.link(
            "INSERT INTO user_group_bundle_map (user_group_id, permission_bundle_id) \
             VALUES ($1, $2) ON CONFLICT DO NOTHING",
            group.into_uuid(),
            bundle.into_uuid(),
        )
        .await
    }

    /// Add a permission to a bundle.
    pub async fn link_bundle_permission(
        &self,
        bundle: PermissionBundleId,
        permission: PermissionId,
    ) -> AppResult<()> {
        self.link(
            "INSERT INTO bundle_permission_map (permission_bundle_id, permission_id) \
             VALUES ($1, $2) ON CONFLICT DO NOTHING",
            bundle.into_uuid(),
            permission.into_uuid(),
        )
        .await
    }

    /// Add a subject to a group.
    pub async fn add_subject_to_group(
        &self,
        subject: SubjectId,
        group: UserGroupId,
    ) -> AppResult<()> {
        self.link(
            "INSERT INTO subject_user_group_map (subject_id, user_group_id) \
             VALUES ($1, $2) ON CONFLICT DO NOTHING",
            subject.into_uuid(),
            group.into_uuid(),
        )
        .await
    }

    /// Remove a subject from a group.
    pub async fn remove_subject_from_group(
        &self,
        subject: SubjectId,
        group: UserGroupId,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "DELETE FROM subject_user_group_map WHERE subject_id = $1 AND user_group_id = $2",
        )
        .bind(subject)
        .bind(group)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to remove membership", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn link(&self, sql: &'static str, left: Uuid, right: Uuid) -> AppResult<()> {
        // A missing row on either side is a foreign key violation, which
        // maps to NotFound.
        sqlx::query(sql)
            .bind(left)
            .bind(right)
            .execute(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(())
    }
}

/// Read the direct and bundle edges below `groups`.
async fn load_edges(conn: &mut PgConnection, groups: &[UserGroupId]) -> AppResult<GraphSnapshot> {
    let mut snapshot = GraphSnapshot::new();
    if groups.is_empty() {
        return Ok(snapshot);
    }
    let group_ids: Vec<Uuid> = groups.iter().map(|g| g.into_uuid()).collect();

    let direct = sqlx::query_as::<_, LinkedPermissionRow>(
        "SELECT m.user_group_id, p.id, p.token, p.description \
         FROM user_group_permission_map m \
         JOIN permissions p ON p.id = m.permission_id \
         WHERE m.user_group_id = ANY($1)",
    )
    .bind(&group_ids)
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| db_error("Failed to load group permissions", e))?;
    for (group, id, token, description) in direct {
        snapshot.add_group_permission(
            UserGroupId::from_uuid(group),
            Permission {
                id,
                token,
                description,
            },
        );
    }

    let bundle_edges = sqlx::query_as::<_, (Uuid, Uuid)>(
        "SELECT user_group_id, permission_bundle_id FROM user_group_bundle_map \
         WHERE user_group_id = ANY($1)",
    )
    .bind(&group_ids)
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| db_error("Failed to load group bundles", e))?;

    let mut bundle_ids: Vec<Uuid> = Vec::with_capacity(bundle_edges.len());
    for (group, bundle) in bundle_edges {
        snapshot.add_group_bundle(
            UserGroupId::from_uuid(group),
            PermissionBundleId::from_uuid(bundle),
        );
        if !bundle_ids.contains(&bundle) {
            bundle_ids.push(bundle);
        }
    }
    if bundle_ids.is_empty() {
        return Ok(snapshot);
    }

    let bundled = sqlx::query_as::<_, LinkedPermissionRow>(
        "SELECT m.permission_bundle_id, p.id, p.token, p.description \
         FROM bundle_permission_map m \
         JOIN permissions p ON p.id = m.permission_id \
         WHERE m.permission_bundle_id = ANY($1)",
    )
    .bind(&bundle_ids)
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| db_error("Failed to load bundle permissions", e))?;
    for (bundle, id, token, description) in bundled {
        snapshot.add_bundle_permission(
            PermissionBundleId::from_uuid(bundle),
            Permission {
                id,
                token,
                description,
            },
        );
    }

    Ok(snapshot)
}

fn db_error(message: &str, err: sqlx::Error) -> AppError {
    AppError::with_source(ErrorKind::Database, format!("{message}: {err}"), err)
}
