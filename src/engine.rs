//! The search facade: validation, caching and selection behind one call.

use crate::cache::{CacheKey, CacheOutcome, CacheStats, ResultCache};
use crate::compute::distance::{DistanceFunction, Haversine};
use crate::compute::select::select_with;
use crate::compute::validation::{validate_coordinate, validate_limit};
use crate::config::Config;
use crate::dataset::{Dataset, DatasetSource};
use crate::error::{NearbyError, Result};
use crate::metrics::{ErrorReason, MetricsSink, NoopMetrics};
use nearby_types::coordinate::Coordinate;
use nearby_types::result::{NearestResponse, QueryInfo, RankedResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

type RankedList<T> = Arc<[RankedResult<T>]>;

/// Answers nearest-point queries against a [`DatasetSource`].
///
/// The engine is `Sync` when `T` is, and is meant to be shared across request
/// threads behind an `Arc`. Identical concurrent queries share one computation.
///
/// # Examples
///
/// ```rust
/// use nearby::{Coordinate, Dataset, GeoPoint, SearchEngine};
///
/// let dataset = Dataset::from_points(vec![
///     GeoPoint::new("ams", Coordinate::new(52.3676, 4.9041), "Amsterdam"),
///     GeoPoint::new("rtm", Coordinate::new(51.9244, 4.4777), "Rotterdam"),
/// ]);
/// let engine = SearchEngine::new(dataset);
///
/// let response = engine.search(52.0907, 5.1214, Some(1))?;
/// assert_eq!(response.total_found, 1);
/// assert_eq!(response.results[0].id(), "ams");
/// # Ok::<(), nearby::NearbyError>(())
/// ```
pub struct SearchEngine<T> {
    source: Arc<dyn DatasetSource<T>>,
    distance: Arc<dyn DistanceFunction>,
    metrics: Arc<dyn MetricsSink>,
    cache: ResultCache<CacheKey, RankedList<T>, NearbyError>,
    config: Config,
}

impl<T: Send + Sync + 'static> SearchEngine<T> {
    /// Engine over a loaded dataset with default configuration, haversine
    /// distance and no metrics.
    pub fn new(dataset: Dataset<T>) -> Self {
        Self::assemble(
            Arc::new(dataset),
            Arc::new(Haversine::default()),
            Arc::new(NoopMetrics),
            Config::default(),
        )
    }

    pub fn builder(source: impl DatasetSource<T> + 'static) -> EngineBuilder<T> {
        EngineBuilder::new(source)
    }

    fn assemble(
        source: Arc<dyn DatasetSource<T>>,
        distance: Arc<dyn DistanceFunction>,
        metrics: Arc<dyn MetricsSink>,
        config: Config,
    ) -> Self {
        Self {
            source,
            distance,
            metrics,
            cache: ResultCache::from_config(&config),
            config,
        }
    }

    /// Returns up to `k` points nearest to `query`, closest first.
    ///
    /// Coordinates and `k` are validated before the cache is consulted, so a
    /// rejected query never creates an entry. A failure while computing
    /// surfaces as [`NearbyError::Unavailable`] and is not cached.
    pub fn find_nearest(&self, query: Coordinate, k: usize) -> Result<RankedList<T>> {
        let started = Instant::now();
        self.metrics.search_requested();

        let result = self.lookup(query, k);

        match &result {
            Ok((results, outcome)) => {
                match outcome {
                    CacheOutcome::Hit => self.metrics.cache_hit(),
                    CacheOutcome::Computed | CacheOutcome::Joined => self.metrics.cache_miss(),
                }
                log::debug!(
                    "Found {} points near {} (k={}, {:?})",
                    results.len(),
                    query,
                    k,
                    outcome
                );
            }
            Err(err) => {
                self.metrics.search_failed(ErrorReason::from(err));
                if err.is_client_error() {
                    log::warn!("Rejected search near {} (k={}): {}", query, k, err);
                } else {
                    log::error!("Search near {} (k={}) failed: {}", query, k, err);
                }
            }
        }

        self.metrics.search_duration(started.elapsed());
        result.map(|(results, _)| results)
    }

    /// Caller-facing search: echoes the query and reports the result count.
    ///
    /// `limit` defaults to the configured `default_limit`.
    pub fn search(
        &self,
        latitude: f64,
        longitude: f64,
        limit: Option<usize>,
    ) -> Result<NearestResponse<T>> {
        let limit = limit.unwrap_or(self.config.default_limit);
        log::info!(
            "Finding {} nearest points to lat={}, lon={}",
            limit,
            latitude,
            longitude
        );

        let results = self.find_nearest(Coordinate::new(latitude, longitude), limit)?;
        let query = QueryInfo {
            latitude,
            longitude,
            limit,
        };
        Ok(NearestResponse::new(query, results.to_vec()))
    }

    fn lookup(&self, query: Coordinate, k: usize) -> Result<(RankedList<T>, CacheOutcome)> {
        validate_coordinate(&query)?;
        validate_limit(k, self.config.max_limit)?;

        self.cache
            .resolve(CacheKey::new(&query, k), || self.compute(&query, k))
    }

    fn compute(&self, query: &Coordinate, k: usize) -> Result<RankedList<T>> {
        let dataset = self.source.snapshot().map_err(NearbyError::into_unavailable)?;
        let ranked = select_with(
            dataset.points(),
            query,
            k,
            self.distance.as_ref(),
            self.config.selection,
        )
        .map_err(NearbyError::into_unavailable)?;
        Ok(Arc::from(ranked))
    }

    /// Up while the source yields a non-empty dataset.
    pub fn health(&self) -> Health {
        match self.source.snapshot() {
            Ok(dataset) if !dataset.is_empty() => Health {
                status: HealthStatus::Up,
                total_points: dataset.len(),
                detail: format!("Dataset loaded with {} points", dataset.len()),
            },
            Ok(_) => Health {
                status: HealthStatus::Down,
                total_points: 0,
                detail: "No points loaded".to_string(),
            },
            Err(err) => Health {
                status: HealthStatus::Down,
                total_points: 0,
                detail: err.to_string(),
            },
        }
    }

    pub fn total_points(&self) -> Result<usize> {
        Ok(self.points()?.len())
    }

    /// The dataset searches currently run against.
    pub fn points(&self) -> Result<Dataset<T>> {
        self.source.snapshot()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Drops every cached result, e.g. after the source starts serving new data.
    pub fn clear_cache(&self) {
        self.cache.invalidate_all();
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl<T> std::fmt::Debug for SearchEngine<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Builder for a [`SearchEngine`] with a custom distance, metrics sink or
/// configuration.
pub struct EngineBuilder<T> {
    source: Arc<dyn DatasetSource<T>>,
    distance: Arc<dyn DistanceFunction>,
    metrics: Arc<dyn MetricsSink>,
    config: Config,
}

impl<T: Send + Sync + 'static> EngineBuilder<T> {
    pub fn new(source: impl DatasetSource<T> + 'static) -> Self {
        Self::from_shared(Arc::new(source))
    }

    /// Starts from a source that is also held elsewhere.
    pub fn from_shared(source: Arc<dyn DatasetSource<T>>) -> Self {
        Self {
            source,
            distance: Arc::new(Haversine::default()),
            metrics: Arc::new(NoopMetrics),
            config: Config::default(),
        }
    }

    pub fn distance(mut self, distance: impl DistanceFunction + 'static) -> Self {
        self.distance = Arc::new(distance);
        self
    }

    pub fn metrics(mut self, metrics: Arc<dyn MetricsSink>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Validates the configuration and builds the engine.
    pub fn build(self) -> Result<SearchEngine<T>> {
        self.config.validate().map_err(NearbyError::Config)?;

        log::info!(
            "Search engine ready: cache capacity {}, TTL {:?}, max limit {}, {:?} selection",
            self.config.cache_capacity,
            self.config.cache_ttl(),
            self.config.max_limit,
            self.config.selection
        );

        Ok(SearchEngine::assemble(
            self.source,
            self.distance,
            self.metrics,
            self.config,
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    Up,
    Down,
}

/// Readiness report derived from the dataset source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub status: HealthStatus,
    pub total_points: usize,
    pub detail: String,
}

impl Health {
    pub fn is_up(&self) -> bool {
        self.status == HealthStatus::Up
    }
}
