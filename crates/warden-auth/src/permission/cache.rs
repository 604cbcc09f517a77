//! Per-subject permission memo.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{debug, info};

use warden_core::result::AppResult;
use warden_core::types::SubjectId;
use warden_entity::graph::{AuthorizationSubject, PermissionGraph};

use super::resolver::PermissionResolver;
use super::set::PermissionSet;

/// One subject's memo. `generation` advances on every reset so a
/// resolution that started before the reset cannot store its result.
#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    permissions: Option<Arc<PermissionSet>>,
}

/// Memoizes resolved permission sets keyed by subject identity.
///
/// A slot is filled on first access and kept until [`reset`] or
/// [`clear`] is called. Graph mutations never invalidate it.
///
/// [`reset`]: PermissionCache::reset
/// [`clear`]: PermissionCache::clear
#[derive(Debug, Default)]
pub struct PermissionCache {
    slots: DashMap<SubjectId, Slot>,
    /// Advanced by [`clear`](PermissionCache::clear).
    epoch: AtomicU64,
}

impl PermissionCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the memoized set for `subject`, resolving it on a miss.
    ///
    /// The map is not locked while resolving. Two callers racing on the
    /// same miss both resolve and the first stored set wins. A set
    /// resolved across a [`reset`](Self::reset) or [`clear`](Self::clear)
    /// is returned to its caller but never stored. A failed resolution
    /// leaves the slot empty.
    pub fn get_all_permissions<G: PermissionGraph>(
        &self,
        resolver: &PermissionResolver<G>,
        subject: &dyn AuthorizationSubject,
    ) -> AppResult<Arc<PermissionSet>> {
        let subject_id = subject.subject_id();
        let epoch = self.epoch.load(Ordering::SeqCst);
        let generation = match self.slots.get(&subject_id) {
            Some(slot) => {
                if let Some(cached) = &slot.permissions {
                    debug!(subject_id = %subject_id, "Permission cache hit");
                    return Ok(Arc::clone(cached));
                }
                slot.generation
            }
            None => 0,
        };

        debug!(subject_id = %subject_id, "Permission cache miss");
        let resolved = Arc::new(resolver.resolve(subject)?);

        let mut slot = match self.slots.entry(subject_id) {
            Entry::Occupied(entry) => entry.into_ref(),
            Entry::Vacant(entry) => entry.insert(Slot::default()),
        };
        if slot.generation != generation || self.epoch.load(Ordering::SeqCst) != epoch {
            debug!(subject_id = %subject_id, "Permission cache reset during resolution");
            return Ok(resolved);
        }
        let stored = slot.permissions.get_or_insert(resolved);
        Ok(Arc::clone(stored))
    }

    /// Drops the memo for one subject. The next lookup recomputes.
    pub fn reset(&self, subject_id: SubjectId) {
        let mut slot = self.slots.entry(subject_id).or_default();
        slot.generation += 1;
        if slot.permissions.take().is_some() {
            info!(subject_id = %subject_id, "Permission cache reset");
        }
    }

    /// Drops every memo.
    pub fn clear(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        let count = self.len();
        self.slots.clear();
        info!(count, "Permission cache cleared");
    }

    /// Whether a memo exists for the subject.
    pub fn is_cached(&self, subject_id: SubjectId) -> bool {
        self.slots
            .get(&subject_id)
            .is_some_and(|slot| slot.permissions.is_some())
    }

    /// Number of memoized subjects.
    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.permissions.is_some())
            .count()
    }

    /// Whether no subject is memoized.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
