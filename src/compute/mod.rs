//! Pure computation for nearest-point queries.
//!
//! Nothing in here touches shared state:
//! - Coordinate and limit validation
//! - Great-circle distance
//! - Top-K selection over a dataset snapshot

pub mod distance;
pub mod select;
pub mod validation;

pub use distance::{DistanceFunction, EARTH_RADIUS_KM, Haversine, haversine_km};
pub use select::{round_distance, select, select_with};
