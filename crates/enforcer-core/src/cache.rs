//! Session-scoped result cache
//!
//! Records which `(implementation, cache id)` pairs already ran in this
//! build session so equivalent rules declared by several modules execute
//! at most once. Only identities are stored, never results.
//!
//! The implementation half of the key is the registry's type reference
//! (`enforcer_rules::RequireFilesExist`), the same string carried by
//! [`crate::RuleDescriptor::implementation`] and printed by `list`.
//!
//! One store is created per build session and shared (via `Arc`) by every
//! enforcement pass of that session, including passes running on other
//! threads. A single mutex guards lookup-and-insert.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::rule::{CachedRun, Rule};

/// Result of [`ResultCache::lookup`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    /// An equivalent rule already ran; skip execution
    Hit,
    /// First occurrence; the id is now recorded under this caller's name
    ///
    /// Hand it back through [`ResultCache::release`] if execution fails.
    Reserved(String),
    /// Execute without touching the cache: no id, opted out, or the rule
    /// rejected the earlier run
    Uncached,
}

/// Map from implementation identity to the cache ids seen for it, in insertion order
#[derive(Debug, Default)]
pub struct ResultCache {
    entries: Mutex<HashMap<String, Vec<String>>>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check-and-reserve in one step
    ///
    /// On a miss the rule's id is recorded before returning, so a concurrent
    /// caller for the same pair sees a hit. Only a [`CacheLookup::Reserved`]
    /// result makes the caller the owner of the recorded id.
    pub fn lookup(&self, implementation: &str, rule: &dyn Rule) -> CacheLookup {
        let Some(cache_id) = rule.cache_id() else {
            return CacheLookup::Uncached;
        };
        if !rule.is_cacheable() {
            return CacheLookup::Uncached;
        }

        let hit = {
            let mut entries = self.lock();
            let ids = entries.entry(implementation.to_string()).or_default();
            if ids.iter().any(|id| id == &cache_id) {
                true
            } else {
                ids.push(cache_id.clone());
                false
            }
        };

        if !hit {
            tracing::trace!(implementation, cache_id = %cache_id, "Cache miss, rule id reserved");
            return CacheLookup::Reserved(cache_id);
        }

        let previous = CachedRun {
            implementation,
            cache_id: &cache_id,
        };
        if rule.is_result_valid(&previous) {
            tracing::debug!(implementation, cache_id = %cache_id, "Cache hit");
            CacheLookup::Hit
        } else {
            tracing::debug!(implementation, cache_id = %cache_id, "Cached result rejected by rule");
            CacheLookup::Uncached
        }
    }

    /// `true` when the caller must skip execution; see [`Self::lookup`]
    pub fn is_cached(&self, implementation: &str, rule: &dyn Rule) -> bool {
        self.lookup(implementation, rule) == CacheLookup::Hit
    }

    /// Drop a reservation after a failed execution
    ///
    /// Only successful runs stay cached, so a later equivalent rule gets to
    /// execute (and fail) on its own. Pass only ids obtained from
    /// [`CacheLookup::Reserved`]; an id recorded by someone else's successful
    /// run must stay.
    pub fn release(&self, implementation: &str, cache_id: &str) {
        let mut entries = self.lock();
        if let Some(ids) = entries.get_mut(implementation) {
            ids.retain(|id| id != cache_id);
            if ids.is_empty() {
                entries.remove(implementation);
            }
        }
    }

    /// Whether a pair is recorded
    pub fn contains(&self, implementation: &str, cache_id: &str) -> bool {
        self.lock()
            .get(implementation)
            .is_some_and(|ids| ids.iter().any(|id| id == cache_id))
    }

    /// Cache ids recorded for an implementation, in insertion order
    pub fn cache_ids(&self, implementation: &str) -> Vec<String> {
        self.lock().get(implementation).cloned().unwrap_or_default()
    }

    /// Forget everything; used between independent invocations
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of recorded pairs
    pub fn len(&self) -> usize {
        self.lock().values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<String>>> {
        // A panicking rule must not disable caching for the rest of the session
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
