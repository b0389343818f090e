//! Observations emitted by the search engine.
//!
//! The engine reports to a [`MetricsSink`] passed in at construction. Every
//! method is fire-and-forget and defaults to doing nothing, so a sink only
//! implements what it records. Search correctness never depends on the sink.

use crate::error::NearbyError;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Why a search failed, used to tag error counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorReason {
    InvalidCoordinates,
    InvalidLimit,
    Unavailable,
    Unknown,
}

impl ErrorReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorReason::InvalidCoordinates => "invalid-coordinates",
            ErrorReason::InvalidLimit => "invalid-limit",
            ErrorReason::Unavailable => "unavailable",
            ErrorReason::Unknown => "unknown",
        }
    }
}

impl From<&NearbyError> for ErrorReason {
    fn from(err: &NearbyError) -> Self {
        match err {
            NearbyError::InvalidCoordinates { .. } => ErrorReason::InvalidCoordinates,
            NearbyError::InvalidLimit { .. } => ErrorReason::InvalidLimit,
            NearbyError::Unavailable(_) => ErrorReason::Unavailable,
            _ => ErrorReason::Unknown,
        }
    }
}

/// Receiver for search counters and timings.
pub trait MetricsSink: Send + Sync {
    fn search_requested(&self) {}

    fn search_failed(&self, _reason: ErrorReason) {}

    fn cache_hit(&self) {}

    fn cache_miss(&self) {}

    fn search_duration(&self, _elapsed: Duration) {}
}

/// Discards every observation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {}

/// In-process counters, readable through [`SearchStats::snapshot`].
#[derive(Debug, Default)]
pub struct SearchStats {
    requests: AtomicU64,
    invalid_coordinates: AtomicU64,
    invalid_limit: AtomicU64,
    unavailable: AtomicU64,
    unknown: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    timed: AtomicU64,
    total_nanos: AtomicU64,
}

/// Point-in-time copy of [`SearchStats`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub requests: u64,
    pub invalid_coordinates: u64,
    pub invalid_limit: u64,
    pub unavailable: u64,
    pub unknown: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    /// Number of timed searches
    pub timed: u64,
    /// Sum of all timed durations
    pub total_nanos: u64,
}

impl MetricsSnapshot {
    pub fn errors(&self) -> u64 {
        self.invalid_coordinates + self.invalid_limit + self.unavailable + self.unknown
    }

    pub fn errors_for(&self, reason: ErrorReason) -> u64 {
        match reason {
            ErrorReason::InvalidCoordinates => self.invalid_coordinates,
            ErrorReason::InvalidLimit => self.invalid_limit,
            ErrorReason::Unavailable => self.unavailable,
            ErrorReason::Unknown => self.unknown,
        }
    }

    pub fn mean_duration(&self) -> Option<Duration> {
        (self.timed > 0).then(|| Duration::from_nanos(self.total_nanos / self.timed))
    }
}

impl SearchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            invalid_coordinates: self.invalid_coordinates.load(Ordering::Relaxed),
            invalid_limit: self.invalid_limit.load(Ordering::Relaxed),
            unavailable: self.unavailable.load(Ordering::Relaxed),
            unknown: self.unknown.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            timed: self.timed.load(Ordering::Relaxed),
            total_nanos: self.total_nanos.load(Ordering::Relaxed),
        }
    }
}

impl MetricsSink for SearchStats {
    fn search_requested(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    fn search_failed(&self, reason: ErrorReason) {
        let counter = match reason {
            ErrorReason::InvalidCoordinates => &self.invalid_coordinates,
            ErrorReason::InvalidLimit => &self.invalid_limit,
            ErrorReason::Unavailable => &self.unavailable,
            ErrorReason::Unknown => &self.unknown,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    fn cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    fn search_duration(&self, elapsed: Duration) {
        let nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        self.timed.fetch_add(1, Ordering::Relaxed);
        self.total_nanos.fetch_add(nanos, Ordering::Relaxed);
    }
}
