/*!
 * Tracked-Object Registry
 *
 * Non-owning bookkeeping of ephemeral objects. Each entry holds a `Weak`
 * handle, so tracking never extends an object's lifetime; an entry whose
 * handle no longer upgrades is removed by the next sweep.
 *
 * ## Keys
 *
 * The reverse map is keyed by the address of the object's `Arc` allocation.
 * The weak handle held by the entry keeps that allocation reserved, so the
 * address cannot be reused by another object while the entry exists.
 */

use super::types::TrackingStats;
use crate::core::id::TrackingId;
use ahash::HashMap;
use std::any::Any;
use std::sync::{Arc, Weak};
use tracing::{debug, warn};

/// Type-erased object handle
pub type AnyObject = dyn Any + Send + Sync;

struct TrackedEntry {
    category: String,
    key: usize,
    reference: Weak<AnyObject>,
}

impl TrackedEntry {
    #[inline]
    fn is_alive(&self) -> bool {
        self.reference.strong_count() > 0
    }
}

/// Forward map (id → entry), reverse map (object → id), and category counters
#[derive(Default)]
pub struct TrackedObjectRegistry {
    entries: HashMap<TrackingId, TrackedEntry>,
    reverse: HashMap<usize, TrackingId>,
    categories: HashMap<String, usize>,
}

#[inline]
fn object_key<T: ?Sized>(object: &Arc<T>) -> usize {
    Arc::as_ptr(object) as *const () as usize
}

impl TrackedObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking `object` under `category`
    ///
    /// Returns `None` (with a warning) if the instance is already tracked.
    pub fn track<T>(&mut self, object: &Arc<T>, category: &str) -> Option<TrackingId>
    where
        T: Any + Send + Sync,
    {
        let key = object_key(object);
        if let Some(existing) = self.reverse.get(&key) {
            warn!(
                tracking_id = %existing,
                category,
                "object already tracked, ignoring"
            );
            return None;
        }

        let erased: Arc<AnyObject> = Arc::clone(object) as Arc<AnyObject>;
        let reference = Arc::downgrade(&erased);
        drop(erased);

        let id = TrackingId::new();
        self.entries.insert(
            id,
            TrackedEntry {
                category: category.to_string(),
                key,
                reference,
            },
        );
        self.reverse.insert(key, id);
        *self.categories.entry(category.to_string()).or_insert(0) += 1;

        debug!(tracking_id = %id, category, "object tracked");
        Some(id)
    }

    /// Stop tracking `object`. Returns false if it was not tracked
    pub fn untrack<T: ?Sized>(&mut self, object: &Arc<T>) -> bool {
        match self.reverse.get(&object_key(object)).copied() {
            Some(id) => self.untrack_id(id),
            None => false,
        }
    }

    /// Stop tracking by id. Returns false if the id is unknown
    pub fn untrack_id(&mut self, id: TrackingId) -> bool {
        match self.remove_entry(id) {
            Some(category) => {
                debug!(tracking_id = %id, category = %category, "object untracked");
                true
            }
            None => false,
        }
    }

    /// Remove every entry whose object has been dropped
    ///
    /// Returns the number of entries purged.
    pub fn purge_dead(&mut self) -> usize {
        let dead: Vec<TrackingId> = self
            .entries
            .iter()
            .filter(|(_, entry)| !entry.is_alive())
            .map(|(id, _)| *id)
            .collect();

        for id in &dead {
            self.remove_entry(*id);
        }

        if !dead.is_empty() {
            debug!(purged = dead.len(), remaining = self.entries.len(), "dead references purged");
        }
        dead.len()
    }

    fn remove_entry(&mut self, id: TrackingId) -> Option<String> {
        let entry = self.entries.remove(&id)?;
        self.reverse.remove(&entry.key);

        if let Some(count) = self.categories.get_mut(&entry.category) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.categories.remove(&entry.category);
            }
        }
        Some(entry.category)
    }

    /// Tracking id of `object`, if tracked
    pub fn id_of<T: ?Sized>(&self, object: &Arc<T>) -> Option<TrackingId> {
        self.reverse.get(&object_key(object)).copied()
    }

    pub fn contains_id(&self, id: TrackingId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Upgrade a tracked entry, if its object is still alive
    pub fn get(&self, id: TrackingId) -> Option<Arc<AnyObject>> {
        self.entries.get(&id)?.reference.upgrade()
    }

    /// Category of a tracked entry
    pub fn category_of(&self, id: TrackingId) -> Option<&str> {
        self.entries.get(&id).map(|entry| entry.category.as_str())
    }

    /// Number of entries, alive or not yet swept
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn reverse_len(&self) -> usize {
        self.reverse.len()
    }

    pub fn alive_count(&self) -> usize {
        self.entries.values().filter(|entry| entry.is_alive()).count()
    }

    pub fn category_count(&self, category: &str) -> usize {
        self.categories.get(category).copied().unwrap_or(0)
    }

    pub fn stats(&self) -> TrackingStats {
        TrackingStats {
            tracked: self.entries.len(),
            alive: self.alive_count(),
            categories: self
                .categories
                .iter()
                .map(|(category, count)| (category.clone(), *count))
                .collect(),
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.reverse.clear();
        self.categories.clear();
    }
}
