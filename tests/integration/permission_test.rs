//! Integration tests for permission resolution and the query API.

use std::sync::Arc;

use warden::Authorizer;
use warden::config::CacheConfig;
use warden::entity::permission::CreatePermission;
use warden::error::ErrorKind;

use crate::helpers::{Scenario, tokens};

#[test]
fn test_group_resolution() {
    let s = Scenario::new();
    let authorizer = Authorizer::new(Arc::clone(&s.store));

    let g1 = authorizer.group_permissions(s.g1.id).unwrap();
    let g2 = authorizer.group_permissions(s.g2.id).unwrap();
    let g3 = authorizer.group_permissions(s.g3.id).unwrap();

    assert_eq!(tokens(&g1), ["p1", "p3"]);
    assert_eq!(tokens(&g2), ["p2"]);
    assert_eq!(tokens(&g3), ["p1", "p2", "p3"]);
}

#[test]
fn test_subject_is_union_of_its_groups() {
    let s = Scenario::new();
    let authorizer = Authorizer::new(Arc::clone(&s.store));
    let you = s.subject("you", &[&s.g1, &s.g2]);

    let all = authorizer.get_all_permissions(&you).unwrap();
    assert_eq!(tokens(&all), ["p1", "p2", "p3"]);

    let mut union = authorizer.group_permissions(s.g1.id).unwrap();
    union.extend(authorizer.group_permissions(s.g2.id).unwrap());
    assert_eq!(*all, union);
}

#[test]
fn test_subject_without_groups_holds_nothing() {
    let s = Scenario::new();
    let authorizer = Authorizer::new(Arc::clone(&s.store));
    let loner = s.subject("loner", &[]);

    assert!(authorizer.get_all_permissions(&loner).unwrap().is_empty());
    assert!(!authorizer.has_permissions(&loner, ["p1"]).unwrap());
    assert!(authorizer.has_permissions(&loner, Vec::<String>::new()).unwrap());
}

#[test]
fn test_has_permissions_queries() {
    let s = Scenario::new();
    let authorizer = Authorizer::new(Arc::clone(&s.store));
    let you = s.subject("you", &[&s.g2]);

    assert!(authorizer.has_permissions(&you, ["p2"]).unwrap());
    assert!(!authorizer.has_permissions(&you, ["p1", "p2"]).unwrap());
    assert!(authorizer.has_any_permissions(&you, ["p1", "p2"]).unwrap());
    assert!(!authorizer.has_any_permissions(&you, ["p1", "p3"]).unwrap());
    assert!(!authorizer.has_any_permissions(&you, Vec::<&str>::new()).unwrap());
    assert!(!authorizer.has_permissions(&you, ["does-not-exist"]).unwrap());

    let err = authorizer
        .require_permissions(&you, vec!["p1".to_string(), "p2".to_string()])
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);
    assert!(err.message.contains("p1"));
}

#[test]
fn test_cache_holds_until_reset() {
    let s = Scenario::new();
    let authorizer = Authorizer::new(Arc::clone(&s.store));
    let you = s.subject("you", &[&s.g2]);
    let handle = s.store.handle(you.id);

    assert!(!authorizer.has_permissions(&handle, ["p1"]).unwrap());

    s.store.add_subject_to_group(you.id, s.g1.id).unwrap();
    assert!(!authorizer.has_permissions(&handle, ["p1"]).unwrap());

    authorizer.reset_permission_cache(you.id);
    assert!(authorizer.has_permissions(&handle, ["p1"]).unwrap());
}

#[test]
fn test_reset_affects_only_one_subject() {
    let s = Scenario::new();
    let authorizer = Authorizer::new(Arc::clone(&s.store));
    let a = s.subject("a", &[&s.g1]);
    let b = s.subject("b", &[&s.g1]);

    authorizer.get_all_permissions(&a).unwrap();
    authorizer.get_all_permissions(&b).unwrap();
    let cache = authorizer.cache().unwrap();
    assert_eq!(cache.len(), 2);

    authorizer.reset_permission_cache(a.id);
    assert!(!cache.is_cached(a.id));
    assert!(cache.is_cached(b.id));
}

#[test]
fn test_disabled_cache_always_resolves() {
    let s = Scenario::new();
    let authorizer =
        Authorizer::from_config(Arc::clone(&s.store), &CacheConfig { enabled: false });
    let you = s.subject("you", &[&s.g2]);
    let handle = s.store.handle(you.id);

    assert!(!authorizer.has_permissions(&handle, ["p3"]).unwrap());
    s.store.link_group_permission(s.g2.id, s.p3.id).unwrap();
    assert!(authorizer.has_permissions(&handle, ["p3"]).unwrap());
}

#[test]
fn test_bundle_edits_reach_subjects() {
    let s = Scenario::new();
    let authorizer = Authorizer::new(Arc::clone(&s.store));
    let you = s.subject("you", &[&s.g2]);

    s.store.link_bundle_permission(s.b1.id, s.p1.id).unwrap();
    assert!(authorizer.has_permissions(&you, ["p1", "p2"]).unwrap());
}

#[test]
fn test_deleted_permission_disappears_everywhere() {
    let s = Scenario::new();
    let authorizer = Authorizer::new(Arc::clone(&s.store));

    assert!(s.store.delete_permission(s.p2.id).unwrap());
    assert_eq!(tokens(&authorizer.group_permissions(s.g3.id).unwrap()), ["p1", "p3"]);
    assert!(authorizer.group_permissions(s.g2.id).unwrap().is_empty());
    assert!(s.store.bundle(s.b2.id).is_ok());
}

#[test]
fn test_duplicate_token_is_rejected() {
    let s = Scenario::new();
    let err = s
        .store
        .create_permission(CreatePermission::new("p1", "again"))
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
    assert_eq!(s.store.permissions().unwrap().len(), 3);
}

#[test]
fn test_stale_subject_propagates_not_found() {
    let s = Scenario::new();
    let authorizer = Authorizer::new(Arc::clone(&s.store));
    let gone = s.subject("gone", &[&s.g1]);
    let handle = s.store.handle(gone.id);
    s.store.delete_subject(gone.id).unwrap();

    let err = authorizer.has_permissions(&handle, ["p1"]).unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert!(authorizer.cache().unwrap().is_empty());
}

#[test]
fn test_concurrent_population_yields_one_set() {
    let s = Scenario::new();
    let authorizer = Authorizer::new(Arc::clone(&s.store));
    let you = s.subject("you", &[&s.g1, &s.g2]);

    let results: Vec<_> = std::thread::scope(|scope| {
        let workers: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| authorizer.get_all_permissions(&you).unwrap()))
            .collect();
        workers.into_iter().map(|w| w.join().unwrap()).collect()
    });

    let cached = authorizer.get_all_permissions(&you).unwrap();
    for result in &results {
        assert_eq!(**result, *cached);
    }
    assert_eq!(tokens(&cached), ["p1", "p2", "p3"]);
    assert_eq!(authorizer.cache().unwrap().len(), 1);
}

#[test]
fn test_loaded_subject_survives_group_deletion() {
    let s = Scenario::new();
    let authorizer = Authorizer::uncached(Arc::clone(&s.store));
    let you = s.subject("you", &[&s.g1, &s.g2]);

    assert!(s.store.delete_group(s.g1.id).unwrap());
    let all = authorizer.get_all_permissions(&you).unwrap();
    assert_eq!(tokens(&all), ["p2"]);
}

#[test]
fn test_snapshot_resolution_matches_live_store() {
    let s = Scenario::new();
    let you = s.subject("you", &[&s.g1, &s.g2]);

    let (subject, snapshot) = s.store.snapshot_for(you.id).unwrap();
    let authorizer = Authorizer::new(Arc::new(snapshot));
    assert_eq!(
        tokens(&authorizer.get_all_permissions(&subject).unwrap()),
        ["p1", "p2", "p3"]
    );
}
