//! Time-bounded reading cache.
//!
//! Entries are keyed by [`QuantizedCoordinate`], so readings within ~1.1km
//! share a slot. An entry older than the TTL is dropped the next time it is
//! looked up; there is no size-based eviction and no background sweep.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use log::debug;

use crate::config::DEFAULT_CACHE_TTL;
use crate::errors::AirQualityError;
use crate::models::{Coordinate, NormalizedReading, QuantizedCoordinate};

/// Storage seam for the acquisition pipeline.
///
/// Errors from an implementation are never fatal: the pipeline logs them
/// and carries on as if the cache were empty.
pub trait ReadingCache: Send + Sync {
    /// Return a copy of a live entry for the coordinate's slot, if any.
    fn lookup(&self, coordinate: &Coordinate) -> Result<Option<NormalizedReading>, AirQualityError>;

    /// Replace the entry for the coordinate's slot.
    fn store(
        &self,
        coordinate: &Coordinate,
        reading: &NormalizedReading,
    ) -> Result<(), AirQualityError>;
}

/// A cached reading and the instant it was stored.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub reading: NormalizedReading,
    pub stored_at: Instant,
}

impl CacheEntry {
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() >= ttl
    }
}

/// In-memory [`ReadingCache`].
///
/// Each entry is replaced as a whole value, so concurrent stores to the
/// same slot resolve last-writer-wins.
#[derive(Debug)]
pub struct CacheStore {
    entries: DashMap<QuantizedCoordinate, CacheEntry>,
    ttl: Duration,
}

impl CacheStore {
    /// Create a store with the default 10 minute TTL.
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_CACHE_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of stored entries, including expired ones not yet looked up.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop the entry for a coordinate's slot.
    pub fn invalidate(&self, coordinate: &Coordinate) {
        self.entries.remove(&coordinate.quantized());
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadingCache for CacheStore {
    fn lookup(&self, coordinate: &Coordinate) -> Result<Option<NormalizedReading>, AirQualityError> {
        let key = coordinate.quantized();

        // The shard guard must be released before removing from the same map.
        match self.entries.get(&key) {
            None => return Ok(None),
            Some(entry) if !entry.is_expired(self.ttl) => {
                debug!("Cache hit for slot {}", key);
                return Ok(Some(entry.reading.clone()));
            }
            Some(_) => {}
        }

        debug!("Cache entry for slot {} expired, dropping", key);
        self.entries
            .remove_if(&key, |_, entry| entry.is_expired(self.ttl));
        Ok(None)
    }

    fn store(
        &self,
        coordinate: &Coordinate,
        reading: &NormalizedReading,
    ) -> Result<(), AirQualityError> {
        self.entries.insert(
            coordinate.quantized(),
            CacheEntry {
                reading: reading.clone(),
                stored_at: Instant::now(),
            },
        );
        Ok(())
    }
}

/// Thread-safe shared cache handle.
pub type SharedCache = Arc<dyn ReadingCache>;
