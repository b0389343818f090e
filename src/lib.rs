//! In-memory nearest-point search with great-circle distances and a
//! single-flight result cache.
//!
//! ```rust
//! use nearby::{Coordinate, Dataset, GeoPoint, SearchEngine};
//!
//! let dataset = Dataset::from_points(vec![
//!     GeoPoint::new("nyc", Coordinate::new(40.7128, -74.0060), "New York"),
//!     GeoPoint::new("bos", Coordinate::new(42.3601, -71.0589), "Boston"),
//!     GeoPoint::new("la", Coordinate::new(34.0522, -118.2437), "Los Angeles"),
//! ]);
//! let engine = SearchEngine::new(dataset);
//!
//! let philadelphia = Coordinate::new(39.9526, -75.1652);
//! let nearest = engine.find_nearest(philadelphia, 2)?;
//! assert_eq!(nearest[0].id(), "nyc");
//! assert_eq!(nearest[1].id(), "bos");
//! # Ok::<(), nearby::NearbyError>(())
//! ```

pub mod cache;
pub mod compute;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod loader;
pub mod metrics;

pub use nearby_types::{Coordinate, GeoPoint, NearestResponse, QueryInfo, RankedResult};

pub use cache::{CacheKey, CacheOutcome, CacheStats, ResultCache};
pub use compute::{DistanceFunction, Haversine};
pub use config::{Config, SelectionStrategy};
pub use dataset::{Dataset, DatasetSource};
pub use engine::{EngineBuilder, Health, HealthStatus, SearchEngine};
pub use error::{NearbyError, Result};
pub use loader::DatasetLoader;
pub use metrics::{ErrorReason, MetricsSink, MetricsSnapshot, NoopMetrics, SearchStats};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{Coordinate, Dataset, GeoPoint, RankedResult};

    pub use crate::{Config, EngineBuilder, NearbyError, Result, SearchEngine};

    pub use crate::{DistanceFunction, Haversine};

    pub use crate::{MetricsSink, SearchStats};

    pub use crate::DatasetLoader;
}
