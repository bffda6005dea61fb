// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Metadata cache for path resolution
//!
//! Two maps are kept for the lifetime of one adapter instance:
//! `(parent_id, name) -> [object_id]` resolutions, and `object_id -> object`
//! metadata. A resolution is only served while every object it names is
//! still present, so dropping one object drops it from every parent it is
//! linked under.
//!
//! Invalidation rules:
//! - every mutation through the adapter invalidates the mutated path, which
//!   drops all resolutions recorded at or beneath it (`invalidate_path`)
//! - a created, updated or removed object is dropped by id, together with
//!   the `(parent_id, name)` keys it can now be found under
//!   (`invalidate_objects`)
//! - with a `max_age`, entries older than it are treated as absent, which
//!   bounds staleness caused by other writers to the backend. Expired
//!   entries are swept on insert at most once per `max_age`.
//!
//! The cache is local state only; it never talks to the backend.

use crate::object::{ObjectId, RemoteObject};
use crate::path::is_within;
use diagnostics::*;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Which children a lookup is interested in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildFilter {
    Any,
    Folders,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub inserts: u64,
    pub invalidations: u64,
    pub expirations: u64,
}

struct ChildEntry {
    ids: Vec<ObjectId>,
    filter: ChildFilter,
    path: String,
    inserted_at: Instant,
}

struct State {
    children: HashMap<(ObjectId, String), ChildEntry>,
    objects: HashMap<ObjectId, RemoteObject>,
    swept_at: Instant,
    stats: CacheStats,
}

impl State {
    fn new() -> Self {
        Self {
            children: HashMap::new(),
            objects: HashMap::new(),
            swept_at: Instant::now(),
            stats: CacheStats::default(),
        }
    }

    /// Drop objects no resolution refers to any more
    fn prune(&mut self) {
        let live: HashSet<&ObjectId> = self.children.values().flat_map(|e| e.ids.iter()).collect();
        self.objects.retain(|id, _| live.contains(id));
    }
}

pub struct MetadataCache {
    max_age: Option<Duration>,
    state: Mutex<State>,
}

impl MetadataCache {
    #[must_use]
    pub fn new(max_age: Option<Duration>) -> Self {
        Self {
            max_age,
            state: Mutex::new(State::new()),
        }
    }

    fn expired(&self, inserted_at: Instant) -> bool {
        self.max_age
            .is_some_and(|max_age| inserted_at.elapsed() > max_age)
    }

    /// Children of `parent` named `name`, as last listed.
    ///
    /// An entry recorded for `ChildFilter::Any` also answers folder lookups.
    pub async fn get(
        &self,
        parent: &ObjectId,
        name: &str,
        filter: ChildFilter,
    ) -> Option<Vec<RemoteObject>> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        let key = (parent.clone(), name.to_string());

        let Some(entry) = state.children.get(&key) else {
            state.stats.misses += 1;
            return None;
        };
        if self.expired(entry.inserted_at) {
            _ = state.children.remove(&key);
            state.prune();
            state.stats.expirations += 1;
            state.stats.misses += 1;
            debug!("cache expired for {name} under {parent}", name: name, parent: parent.as_str());
            return None;
        }
        if entry.filter == ChildFilter::Folders && filter == ChildFilter::Any {
            state.stats.misses += 1;
            return None;
        }

        let objects: Option<Vec<RemoteObject>> = entry
            .ids
            .iter()
            .map(|id| state.objects.get(id).cloned())
            .collect();
        let narrow = entry.filter == ChildFilter::Any && filter == ChildFilter::Folders;
        let Some(objects) = objects else {
            // One of the named objects was invalidated
            _ = state.children.remove(&key);
            state.prune();
            state.stats.misses += 1;
            return None;
        };

        state.stats.hits += 1;
        if narrow {
            Some(objects.into_iter().filter(RemoteObject::is_folder).collect())
        } else {
            Some(objects)
        }
    }

    /// Record the result of a child lookup; `path` is the path of the child
    pub async fn put(
        &self,
        parent: &ObjectId,
        name: &str,
        path: &str,
        filter: ChildFilter,
        objects: Vec<RemoteObject>,
    ) {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        let key = (parent.clone(), name.to_string());

        // Keep a fresh any-type entry rather than narrowing it
        if filter == ChildFilter::Folders {
            if let Some(existing) = state.children.get(&key) {
                if existing.filter == ChildFilter::Any && !self.expired(existing.inserted_at) {
                    return;
                }
            }
        }

        self.sweep(state);

        let ids = objects.iter().map(|o| o.id.clone()).collect();
        for object in objects {
            _ = state.objects.insert(object.id.clone(), object);
        }
        _ = state.children.insert(
            key,
            ChildEntry {
                ids,
                filter,
                path: path.to_string(),
                inserted_at: Instant::now(),
            },
        );
        state.stats.inserts += 1;
    }

    /// Remove expired entries, at most once per `max_age`
    fn sweep(&self, state: &mut State) {
        let Some(max_age) = self.max_age else {
            return;
        };
        if state.swept_at.elapsed() < max_age {
            return;
        }
        state.swept_at = Instant::now();

        let before = state.children.len();
        state
            .children
            .retain(|_, entry| entry.inserted_at.elapsed() <= max_age);
        let removed = before - state.children.len();
        if removed > 0 {
            state.prune();
            state.stats.expirations += removed as u64;
            debug!("cache swept {removed} expired entries", removed: removed);
        }
    }

    /// Drop the `(parent, name)` lookup
    pub async fn invalidate(&self, parent: &ObjectId, name: &str) {
        let mut state = self.state.lock().await;
        if state.children.remove(&(parent.clone(), name.to_string())).is_some() {
            state.prune();
            state.stats.invalidations += 1;
            debug!("cache invalidated {name} under {parent}", name: name, parent: parent.as_str());
        }
    }

    /// Drop `objects` and every lookup that named them or could now find them
    ///
    /// Each object's own `(parent, name)` keys are dropped for all of its
    /// parents, which covers lookups that were negative before it was
    /// created, renamed or linked there.
    pub async fn invalidate_objects<'a, I>(&self, objects: I)
    where
        I: IntoIterator<Item = &'a RemoteObject>,
    {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        let mut ids: HashSet<&ObjectId> = HashSet::new();
        let mut keys: HashSet<(ObjectId, String)> = HashSet::new();
        for object in objects {
            _ = ids.insert(&object.id);
            for parent in &object.parent_ids {
                _ = keys.insert((parent.clone(), object.name.clone()));
            }
        }

        let before = state.children.len();
        state.children.retain(|key, entry| {
            !keys.contains(key) && !entry.ids.iter().any(|id| ids.contains(id))
        });
        let removed = before - state.children.len();
        for id in ids {
            _ = state.objects.remove(id);
        }
        state.prune();

        if removed > 0 {
            state.stats.invalidations += removed as u64;
            debug!("cache invalidated {removed} lookups by object", removed: removed);
        }
    }

    /// Drop every lookup recorded at `path` or beneath it. Returns the number removed.
    pub async fn invalidate_path(&self, path: &str) -> usize {
        let mut state = self.state.lock().await;
        let before = state.children.len();
        state.children.retain(|_, entry| !is_within(&entry.path, path));
        let removed = before - state.children.len();

        if removed > 0 {
            state.prune();
            state.stats.invalidations += removed as u64;
            debug!("cache invalidated {removed} entries at {path}", removed: removed, path: path);
        }
        removed
    }

    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        state.children.clear();
        state.objects.clear();
        debug!("cache cleared");
    }

    pub async fn stats(&self) -> CacheStats {
        self.state.lock().await.stats
    }

    /// Number of cached lookups and objects
    pub async fn len(&self) -> usize {
        let state = self.state.lock().await;
        state.children.len() + state.objects.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
