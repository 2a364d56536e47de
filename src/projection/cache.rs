use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use cached::{Cached, SizedCache};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::{debug, trace};

use super::daily::{build_daily_buckets_with_horizon, DailyProjection, ProjectionInputs};
use crate::config::EngineConfig;
use crate::ledger::{DateWindow, Mode};
use crate::time::Clock;

/// Identifies one projection request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectionKey {
    inputs_hash: u64,
    mode: Mode,
    window: DateWindow,
    horizon: Option<NaiveDate>,
}

impl ProjectionKey {
    pub fn new(
        inputs: &ProjectionInputs,
        mode: Mode,
        window: DateWindow,
        horizon: Option<NaiveDate>,
    ) -> Self {
        let mut hasher = DefaultHasher::new();
        inputs.hash(&mut hasher);
        Self {
            inputs_hash: hasher.finish(),
            mode,
            window,
            horizon,
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    stored_at: DateTime<Utc>,
    projection: DailyProjection,
}

/// Time-bounded memo of daily projections, owned by whoever renders them.
///
/// Entries live in a least-recently-used [`SizedCache`], so at most
/// `capacity` projections are held. Freshness is judged against the injected
/// [`Clock`] rather than the wall clock.
#[derive(Debug, Clone)]
pub struct ProjectionCache {
    ttl: Duration,
    store: SizedCache<ProjectionKey, CacheEntry>,
    hits: usize,
    misses: usize,
}

impl ProjectionCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            store: SizedCache::with_size(capacity.max(1)),
            hits: 0,
            misses: 0,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        let seconds = config.cache_ttl_seconds.min(u32::MAX as u64) as i64;
        Self::new(Duration::seconds(seconds), config.cache_capacity)
    }

    /// Returns the cached projection for this request when it is younger than
    /// the TTL, otherwise builds and stores a fresh one. Expired entries are
    /// dropped on every miss.
    pub fn get_or_build(
        &mut self,
        clock: &dyn Clock,
        inputs: &ProjectionInputs,
        mode: Mode,
        window: DateWindow,
        horizon: Option<NaiveDate>,
    ) -> DailyProjection {
        let now = clock.now();
        let key = ProjectionKey::new(inputs, mode, window, horizon);
        let ttl = self.ttl;
        if let Some(entry) = self.store.cache_get(&key) {
            if now - entry.stored_at < ttl {
                self.hits += 1;
                trace!(start = %window.start, end = %window.end, "projection cache hit");
                return entry.projection.clone();
            }
        }
        self.misses += 1;
        self.evict_expired(clock);
        let projection = build_daily_buckets_with_horizon(inputs, mode, window, horizon);
        self.store.cache_set(
            key,
            CacheEntry {
                stored_at: now,
                projection: projection.clone(),
            },
        );
        projection
    }

    /// Drops entries older than the TTL; returns how many were removed.
    pub fn evict_expired(&mut self, clock: &dyn Clock) -> usize {
        let now = clock.now();
        let ttl = self.ttl;
        let expired: Vec<ProjectionKey> = self
            .store
            .key_order()
            .zip(self.store.value_order())
            .filter(|(_, entry)| now - entry.stored_at >= ttl)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            self.store.cache_remove(key);
        }
        if !expired.is_empty() {
            debug!(evicted = expired.len(), "dropped expired projections");
        }
        expired.len()
    }

    pub fn clear(&mut self) {
        self.store.cache_clear();
    }

    pub fn len(&self) -> usize {
        self.store.cache_size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.store.cache_capacity().unwrap_or_default()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }
}
