//! Integration tests for the PostgreSQL repositories.
//!
//! Skipped unless `WARDEN_TEST_DATABASE_URL` points at a scratch database.
//! Every test namespaces its rows with a fresh UUID so runs can share one
//! database.

use std::sync::Arc;

use uuid::Uuid;

use warden::Authorizer;
use warden::config::DatabaseConfig;
use warden::database::DatabasePool;
use warden::database::repositories::{GraphRepository, PermissionRepository};
use warden::entity::group::CreateUserGroup;
use warden::entity::permission::{CreatePermission, CreatePermissionBundle};
use warden::entity::subject::CreateSubject;
use warden::error::ErrorKind;
use warden::types::SubjectId;

use crate::helpers::tokens;

const DATABASE_URL_VAR: &str = "WARDEN_TEST_DATABASE_URL";

struct TestDb {
    pool: DatabasePool,
    permissions: PermissionRepository,
    graph: GraphRepository,
    prefix: String,
}

impl TestDb {
    /// Connect and apply the fixture schema, or `None` when no database
    /// is configured.
    async fn connect() -> Option<Self> {
        let Ok(url) = std::env::var(DATABASE_URL_VAR) else {
            eprintln!("{DATABASE_URL_VAR} not set, skipping");
            return None;
        };

        let pool = DatabasePool::connect(&DatabaseConfig::with_url(url))
            .await
            .expect("Failed to connect to test database");
        sqlx::raw_sql(include_str!("../fixtures/schema.sql"))
            .execute(pool.pool())
            .await
            .expect("Failed to apply schema");

        Some(Self {
            permissions: pool.permissions(),
            graph: pool.graph(),
            pool,
            prefix: Uuid::new_v4().simple().to_string(),
        })
    }

    fn token(&self, name: &str) -> String {
        format!("{}:{name}", self.prefix)
    }

    async fn permission(&self, name: &str) -> warden::entity::Permission {
        self.permissions
            .create(CreatePermission::new(self.token(name), name))
            .await
            .expect("Failed to create permission")
    }
}

#[tokio::test]
async fn test_ping() {
    let Some(db) = TestDb::connect().await else {
        return;
    };
    db.pool.ping().await.unwrap();
}

#[tokio::test]
async fn test_scenario_round_trips_through_postgres() {
    let Some(db) = TestDb::connect().await else {
        return;
    };

    let p1 = db.permission("p1").await;
    let p2 = db.permission("p2").await;
    let p3 = db.permission("p3").await;

    let b1 = db
        .graph
        .create_bundle(CreatePermissionBundle {
            label: "B1".to_string(),
        })
        .await
        .unwrap();
    db.graph.link_bundle_permission(b1.id, p2.id).await.unwrap();

    let g1 = db
        .graph
        .create_group(CreateUserGroup {
            label: "G1".to_string(),
        })
        .await
        .unwrap();
    let g2 = db
        .graph
        .create_group(CreateUserGroup {
            label: "G2".to_string(),
        })
        .await
        .unwrap();
    db.graph.link_group_permission(g1.id, p1.id).await.unwrap();
    db.graph.link_group_permission(g1.id, p3.id).await.unwrap();
    db.graph.link_group_bundle(g2.id, b1.id).await.unwrap();
    // Linking twice is a no-op.
    db.graph.link_group_bundle(g2.id, b1.id).await.unwrap();

    let you = db
        .graph
        .create_subject(CreateSubject {
            name: "you".to_string(),
        })
        .await
        .unwrap();
    db.graph.add_subject_to_group(you.id, g1.id).await.unwrap();
    db.graph.add_subject_to_group(you.id, g2.id).await.unwrap();

    let (subject, snapshot) = db.graph.load_subject_graph(you.id).await.unwrap();
    assert_eq!(subject.user_groups.len(), 2);

    let authorizer = Authorizer::new(Arc::new(snapshot));
    let all = authorizer.get_all_permissions(&subject).unwrap();
    let mut expected = vec![db.token("p1"), db.token("p2"), db.token("p3")];
    expected.sort();
    assert_eq!(tokens(&all), expected);

    let group = db.graph.load_group_graph(g2.id).await.unwrap();
    let authorizer = Authorizer::new(Arc::new(group));
    assert_eq!(
        tokens(&authorizer.group_permissions(g2.id).unwrap()),
        [db.token("p2")]
    );

    assert!(db.graph.remove_subject_from_group(you.id, g1.id).await.unwrap());
    let (subject, _) = db.graph.load_subject_graph(you.id).await.unwrap();
    assert_eq!(subject.user_groups, vec![g2.id]);
}

#[tokio::test]
async fn test_duplicate_token_is_conflict() {
    let Some(db) = TestDb::connect().await else {
        return;
    };
    db.permission("dup").await;
    let err = db
        .permissions
        .create(CreatePermission::new(db.token("dup"), "again"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
async fn test_deleting_permission_cascades_links() {
    let Some(db) = TestDb::connect().await else {
        return;
    };
    let p = db.permission("gone").await;
    let g = db
        .graph
        .create_group(CreateUserGroup {
            label: "G".to_string(),
        })
        .await
        .unwrap();
    db.graph.link_group_permission(g.id, p.id).await.unwrap();

    assert!(db.permissions.delete(p.id).await.unwrap());
    assert!(db.permissions.find_by_id(p.id).await.unwrap().is_none());
    assert!(db.permissions.find_by_token(&p.token).await.unwrap().is_none());

    let snapshot = db.graph.load_group_graph(g.id).await.unwrap();
    let authorizer = Authorizer::new(Arc::new(snapshot));
    assert!(authorizer.group_permissions(g.id).unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_rows_are_not_found() {
    let Some(db) = TestDb::connect().await else {
        return;
    };
    let err = db
        .graph
        .load_subject_graph(SubjectId::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let p = db.permission("orphan").await;
    let err = db
        .graph
        .link_group_permission(warden::types::UserGroupId::new(), p.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}
