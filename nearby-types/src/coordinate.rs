use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum and maximum latitude in degrees.
pub const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);

/// Minimum and maximum longitude in degrees.
pub const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);

/// A geographic coordinate in decimal degrees.
///
/// Construction never fails. Range validity is a derived predicate and must be
/// checked with [`Coordinate::is_valid`] before the value is used for a search.
///
/// # Examples
///
/// ```
/// use nearby_types::coordinate::Coordinate;
///
/// let rotterdam = Coordinate::new(51.9244, 4.4777);
/// assert!(rotterdam.is_valid());
///
/// let off_the_map = Coordinate::new(100.0, 4.9041);
/// assert!(!off_the_map.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Both components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Latitude within [-90, 90] and longitude within [-180, 180].
    ///
    /// NaN fails both range checks, so a non-finite coordinate is never valid.
    pub fn is_valid(&self) -> bool {
        (LATITUDE_RANGE.0..=LATITUDE_RANGE.1).contains(&self.latitude)
            && (LONGITUDE_RANGE.0..=LONGITUDE_RANGE.1).contains(&self.longitude)
    }

    /// Returns `(latitude, longitude)` converted to radians.
    pub fn to_radians(&self) -> (f64, f64) {
        (self.latitude.to_radians(), self.longitude.to_radians())
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

// geo stores x = longitude, y = latitude.
impl From<Coordinate> for geo::Point<f64> {
    fn from(coordinate: Coordinate) -> Self {
        geo::Point::new(coordinate.longitude, coordinate.latitude)
    }
}

impl From<geo::Point<f64>> for Coordinate {
    fn from(point: geo::Point<f64>) -> Self {
        Self::new(point.y(), point.x())
    }
}

impl From<(f64, f64)> for Coordinate {
    /// Builds a coordinate from a `(latitude, longitude)` pair.
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self::new(latitude, longitude)
    }
}
