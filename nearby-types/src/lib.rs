//! # nearby-types
//!
//! Value types for the `nearby` search engine.
//!
//! - **Coordinates**: `Coordinate` (latitude/longitude in degrees)
//! - **Points**: `GeoPoint<T>`, an identifier plus an optional location and a payload
//! - **Results**: `RankedResult<T>`, `NearestResponse<T>`, `QueryInfo`
//!
//! All types are serializable with Serde and convert to and from the `geo`
//! crate's `Point<f64>`.
//!
//! ## Examples
//!
//! ```rust
//! use nearby_types::coordinate::Coordinate;
//! use nearby_types::point::GeoPoint;
//!
//! let amsterdam = Coordinate::new(52.3676, 4.9041);
//! let store = GeoPoint::new("ams-01", amsterdam, "Damrak");
//! assert!(store.has_valid_location());
//! ```

pub mod coordinate;
pub mod point;
pub mod result;

pub use coordinate::Coordinate;
pub use point::GeoPoint;
pub use result::{NearestResponse, QueryInfo, RankedResult};
