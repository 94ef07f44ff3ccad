//! Read-through query cache with in-flight deduplication and tag invalidation.
//!
//! Each key owns a `OnceCell`. The first caller runs the fetch, every concurrent
//! caller for the same key waits on that same cell instead of issuing its own
//! request. A failed fetch drops the cell again so the next caller tries again and
//! unknown keys never accumulate.

use std::{collections::HashMap, future::Future, sync::Arc};

use parking_lot::Mutex;
use tokio::sync::OnceCell;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    AllRestaurants,
    RestaurantById(String),
    Cuisines,
    RestaurantsByCuisine(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Restaurant,
    Cuisine,
}

impl CacheKey {
    pub fn tag(&self) -> Tag {
        match self {
            Self::AllRestaurants | Self::RestaurantById(_) | Self::RestaurantsByCuisine(_) => {
                Tag::Restaurant
            }
            Self::Cuisines => Tag::Cuisine,
        }
    }
}

pub struct QueryCache<V> {
    entries: Mutex<HashMap<CacheKey, Arc<OnceCell<V>>>>,
}

impl<V> Default for QueryCache<V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<V: Clone> QueryCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `key`, or run `fetch` and cache its result.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: CacheKey, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let cell = self.entries.lock().entry(key.clone()).or_default().clone();

        if let Some(value) = cell.get() {
            debug!(?key, "cache hit");
            return Ok(value.clone());
        }

        let result = cell.get_or_try_init(fetch).await.cloned();
        if result.is_err() {
            self.forget_failed(&key, &cell);
        }
        result
    }

    /// Remove `key` if it still points to `cell` and `cell` never got a value. A caller
    /// that was waiting on the same cell may have installed a fresh one meanwhile.
    fn forget_failed(&self, key: &CacheKey, cell: &Arc<OnceCell<V>>) {
        let mut entries = self.entries.lock();
        let stale = entries
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, cell) && !current.initialized());
        if stale {
            entries.remove(key);
        }
    }

    /// Drop every entry carrying `tag`, returns how many values were dropped.
    pub fn invalidate(&self, tag: Tag) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.values().filter(|c| c.initialized()).count();
        entries.retain(|key, _| key.tag() != tag);
        let after = entries.values().filter(|c| c.initialized()).count();
        debug!(?tag, dropped = before - after, "cache invalidated");
        before - after
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries
            .lock()
            .get(key)
            .is_some_and(|cell| cell.initialized())
    }

    /// Number of cached values. Keys whose fetch is still running or has failed are not counted.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .values()
            .filter(|cell| cell.initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of keys in the map, including those with a fetch in flight.
    #[cfg(test)]
    pub(crate) fn slots(&self) -> usize {
        self.entries.lock().len()
    }
}
