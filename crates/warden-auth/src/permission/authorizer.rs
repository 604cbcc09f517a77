//! Yes/no permission queries for a subject.

use std::sync::Arc;

use tracing::debug;

use warden_core::config::CacheConfig;
use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::types::{SubjectId, UserGroupId};
use warden_entity::graph::{AuthorizationSubject, PermissionGraph};

use super::cache::PermissionCache;
use super::resolver::PermissionResolver;
use super::set::PermissionSet;

/// Answers permission questions about subjects, memoizing each subject's
/// resolved set.
#[derive(Debug)]
pub struct Authorizer<G> {
    resolver: PermissionResolver<G>,
    /// `None` when caching is disabled by configuration.
    cache: Option<PermissionCache>,
}

impl<G: PermissionGraph> Authorizer<G> {
    /// Creates an authorizer with a fresh permission cache.
    pub fn new(graph: Arc<G>) -> Self {
        Self {
            resolver: PermissionResolver::new(graph),
            cache: Some(PermissionCache::new()),
        }
    }

    /// Creates an authorizer that resolves on every query.
    pub fn uncached(graph: Arc<G>) -> Self {
        Self {
            resolver: PermissionResolver::new(graph),
            cache: None,
        }
    }

    /// Creates an authorizer honouring `cache.enabled`.
    pub fn from_config(graph: Arc<G>, config: &CacheConfig) -> Self {
        if config.enabled {
            Self::new(graph)
        } else {
            Self::uncached(graph)
        }
    }

    /// The underlying resolver.
    pub fn resolver(&self) -> &PermissionResolver<G> {
        &self.resolver
    }

    /// The permission cache, if enabled.
    pub fn cache(&self) -> Option<&PermissionCache> {
        self.cache.as_ref()
    }

    /// Every permission the subject holds, memoized after the first call.
    pub fn get_all_permissions(
        &self,
        subject: &dyn AuthorizationSubject,
    ) -> AppResult<Arc<PermissionSet>> {
        match &self.cache {
            Some(cache) => cache.get_all_permissions(&self.resolver, subject),
            None => self.resolver.resolve(subject).map(Arc::new),
        }
    }

    /// Forgets the subject's memoized set.
    pub fn reset_permission_cache(&self, subject_id: SubjectId) {
        if let Some(cache) = &self.cache {
            cache.reset(subject_id);
        }
    }

    /// Every permission a group grants. Never cached.
    pub fn group_permissions(&self, group: UserGroupId) -> AppResult<PermissionSet> {
        self.resolver.resolve_group(group)
    }

    /// `true` iff the subject holds every token. No tokens is `true`.
    pub fn has_permissions<I, T>(
        &self,
        subject: &dyn AuthorizationSubject,
        tokens: I,
    ) -> AppResult<bool>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let held = self.get_all_permissions(subject)?;
        Ok(tokens
            .into_iter()
            .all(|token| held.contains_token(token.as_ref())))
    }

    /// `true` iff the subject holds at least one token. No tokens is
    /// `false`.
    pub fn has_any_permissions<I, T>(
        &self,
        subject: &dyn AuthorizationSubject,
        tokens: I,
    ) -> AppResult<bool>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let held = self.get_all_permissions(subject)?;
        Ok(tokens
            .into_iter()
            .any(|token| held.contains_token(token.as_ref())))
    }

    /// Like [`has_permissions`](Self::has_permissions) but fails with an
    /// `Authorization` error listing the missing tokens.
    pub fn require_permissions<I, T>(
        &self,
        subject: &dyn AuthorizationSubject,
        tokens: I,
    ) -> AppResult<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let held = self.get_all_permissions(subject)?;
        let missing: Vec<String> = tokens
            .into_iter()
            .filter(|token| !held.contains_token(token.as_ref()))
            .map(|token| token.as_ref().to_string())
            .collect();

        if missing.is_empty() {
            return Ok(());
        }
        debug!(
            subject_id = %subject.subject_id(),
            missing = ?missing,
            "Permission check denied"
        );
        Err(AppError::authorization(format!(
            "Subject '{}' lacks required permissions: {}",
            subject.subject_id(),
            missing.join(", ")
        )))
    }
}
