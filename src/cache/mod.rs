//! Memoization of top-K results with single-flight population.
//!
//! [`ResultCache`] stores at most `capacity` values, evicting the least
//! recently used one when full, and treats a value older than its TTL as
//! absent. Concurrent callers that miss on the same key share a single
//! computation:
//!
//! ```text
//! caller A ─┐  miss, no flight   ──► computes ──► stores ─┐
//! caller B ─┼─ miss, flight found ──► waits ───────────────┼──► same value
//! caller C ─┘  miss, flight found ──► waits ───────────────┘
//! ```
//!
//! The computing caller runs the closure on its own thread, outside the cache
//! lock. A failed computation is delivered to every waiter and is not stored,
//! so the next caller computes afresh. If the computing caller panics, waiters
//! receive [`ComputationAborted`] converted into the error type.

mod flight;
mod key;
mod stats;

pub use flight::ComputationAborted;
pub use key::CacheKey;
pub use stats::CacheStats;

use crate::config::Config;
use crate::error::NearbyError;
use flight::Flight;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use stats::Counters;
use std::collections::BTreeMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How a lookup was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    /// Served from a stored, unexpired entry.
    Hit,
    /// This caller ran the computation.
    Computed,
    /// This caller waited for another caller's computation.
    Joined,
}

/// A stored value. Entries are replaced wholesale, never updated in place.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub created_at: Instant,
    expires_at: Option<Instant>,
    tick: u64,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }
}

struct CacheState<K, V, E> {
    entries: FxHashMap<K, CacheEntry<V>>,
    /// access tick -> key, oldest first
    recency: BTreeMap<u64, K>,
    tick: u64,
    in_flight: FxHashMap<K, Arc<Flight<V, E>>>,
}

impl<K, V, E> CacheState<K, V, E>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn new() -> Self {
        Self {
            entries: FxHashMap::default(),
            recency: BTreeMap::new(),
            tick: 0,
            in_flight: FxHashMap::default(),
        }
    }

    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    /// Returns a fresh value and marks it most recently used. An expired entry
    /// is removed on the way.
    fn lookup(&mut self, key: &K, now: Instant, counters: &Counters) -> Option<V> {
        let expired = self.entries.get(key)?.is_expired(now);

        if expired {
            if let Some(entry) = self.entries.remove(key) {
                self.recency.remove(&entry.tick);
            }
            Counters::record(&counters.expirations, 1);
            return None;
        }

        let tick = self.next_tick();
        let entry = self.entries.get_mut(key)?;
        self.recency.remove(&entry.tick);
        entry.tick = tick;
        self.recency.insert(tick, key.clone());
        Some(entry.value.clone())
    }

    /// Stores a value, evicting least recently used entries beyond `capacity`.
    /// Returns the number of evicted entries.
    fn insert(&mut self, key: K, value: V, now: Instant, ttl: Duration, capacity: usize) -> u64 {
        let tick = self.next_tick();
        let entry = CacheEntry {
            value,
            created_at: now,
            expires_at: now.checked_add(ttl),
            tick,
        };

        if let Some(previous) = self.entries.insert(key.clone(), entry) {
            self.recency.remove(&previous.tick);
        }
        self.recency.insert(tick, key);

        let mut evicted = 0;
        while self.entries.len() > capacity {
            let Some((_, oldest)) = self.recency.pop_first() else {
                break;
            };
            self.entries.remove(&oldest);
            evicted += 1;
        }
        evicted
    }
}

/// Bounded, expiring, single-flight memoization keyed by `K`.
pub struct ResultCache<K, V, E = NearbyError> {
    state: Mutex<CacheState<K, V, E>>,
    capacity: usize,
    ttl: Duration,
    counters: Counters,
}

impl<K, V, E> ResultCache<K, V, E>
where
    K: Eq + Hash + Clone + std::fmt::Display,
    V: Clone,
    E: Clone + From<ComputationAborted>,
{
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        assert!(capacity > 0, "Cache capacity must be greater than zero");
        Self {
            state: Mutex::new(CacheState::new()),
            capacity,
            ttl,
            counters: Counters::default(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.cache_capacity, config.cache_ttl())
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached value for `key`, or runs `compute` to produce it.
    ///
    /// At most one `compute` runs per key at a time; concurrent callers for
    /// the same key block until it finishes and receive its result.
    pub fn get_or_compute<F>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        self.resolve(key, compute).map(|(value, _)| value)
    }

    /// Like [`get_or_compute`](Self::get_or_compute), also reporting how the
    /// value was obtained.
    pub fn resolve<F>(&self, key: K, compute: F) -> Result<(V, CacheOutcome), E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        let role = {
            let mut state = self.state.lock();

            if let Some(value) = state.lookup(&key, Instant::now(), &self.counters) {
                Counters::record(&self.counters.hits, 1);
                log::debug!("Cache hit for {}", key);
                return Ok((value, CacheOutcome::Hit));
            }

            Counters::record(&self.counters.misses, 1);

            match state.in_flight.get(&key) {
                Some(flight) => Role::Waiter(Arc::clone(flight)),
                None => {
                    let flight = Arc::new(Flight::new());
                    state.in_flight.insert(key.clone(), Arc::clone(&flight));
                    Role::Leader(flight)
                }
            }
        };

        match role {
            Role::Waiter(flight) => {
                Counters::record(&self.counters.joined, 1);
                log::debug!("Cache miss for {}, joining in-flight computation", key);
                flight.wait().map(|value| (value, CacheOutcome::Joined))
            }
            Role::Leader(flight) => {
                log::debug!("Cache miss for {}, computing", key);
                let guard = LeaderGuard {
                    cache: self,
                    key,
                    flight,
                    finished: false,
                };
                let result = compute();
                guard.finish(&result);
                result.map(|value| (value, CacheOutcome::Computed))
            }
        }
    }

    /// Returns a fresh value without touching recency or statistics.
    pub fn peek(&self, key: &K) -> Option<V> {
        let state = self.state.lock();
        let entry = state.entries.get(key)?;
        if entry.is_expired(Instant::now()) {
            return None;
        }
        Some(entry.value.clone())
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn in_flight_count(&self) -> usize {
        self.state.lock().in_flight.len()
    }

    /// Drops every stored entry. Running computations are unaffected and will
    /// store their results when they finish.
    pub fn invalidate_all(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.recency.clear();
    }

    /// Removes every expired entry and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let before = state.entries.len();
        let recency = &mut state.recency;
        state.entries.retain(|_, entry| {
            if entry.is_expired(now) {
                recency.remove(&entry.tick);
                false
            } else {
                true
            }
        });

        let removed = before - state.entries.len();
        Counters::record(&self.counters.expirations, removed as u64);
        removed
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        self.counters
            .snapshot(state.entries.len(), state.in_flight.len())
    }

    /// Records the leader's result: stores successes, always clears the flight.
    fn complete(&self, key: &K, result: &Result<V, E>) {
        let mut state = self.state.lock();
        state.in_flight.remove(key);

        if let Ok(value) = result {
            let evicted = state.insert(
                key.clone(),
                value.clone(),
                Instant::now(),
                self.ttl,
                self.capacity,
            );
            if evicted > 0 {
                Counters::record(&self.counters.evictions, evicted);
                log::debug!("Evicted {} least recently used entries", evicted);
            }
        }
    }

    fn abandon(&self, key: &K) {
        self.state.lock().in_flight.remove(key);
    }
}

impl<K, V, E> std::fmt::Debug for ResultCache<K, V, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCache")
            .field("capacity", &self.capacity)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

enum Role<V, E> {
    Leader(Arc<Flight<V, E>>),
    Waiter(Arc<Flight<V, E>>),
}

/// Owns a key's in-flight slot while the leader computes. Dropping it without
/// [`finish`](Self::finish) (i.e. while unwinding) releases the slot and fails
/// the waiters.
struct LeaderGuard<'a, K, V, E>
where
    K: Eq + Hash + Clone + std::fmt::Display,
    V: Clone,
    E: Clone + From<ComputationAborted>,
{
    cache: &'a ResultCache<K, V, E>,
    key: K,
    flight: Arc<Flight<V, E>>,
    finished: bool,
}

impl<K, V, E> LeaderGuard<'_, K, V, E>
where
    K: Eq + Hash + Clone + std::fmt::Display,
    V: Clone,
    E: Clone + From<ComputationAborted>,
{
    fn finish(mut self, result: &Result<V, E>) {
        // publish after the entry is stored so late arrivals hit the cache
        self.cache.complete(&self.key, result);
        self.flight.publish(result.clone());
        self.finished = true;
    }
}

impl<K, V, E> Drop for LeaderGuard<'_, K, V, E>
where
    K: Eq + Hash + Clone + std::fmt::Display,
    V: Clone,
    E: Clone + From<ComputationAborted>,
{
    fn drop(&mut self) {
        if !self.finished {
            log::warn!("Computation for {} aborted, releasing waiters", self.key);
            self.cache.abandon(&self.key);
            self.flight.publish(Err(E::from(ComputationAborted)));
        }
    }
}
