//! Validation for query coordinates and result limits.

use crate::error::{NearbyError, Result};
use nearby_types::coordinate::Coordinate;

/// Validates a query coordinate.
///
/// Latitude: [-90.0, 90.0], Longitude: [-180.0, 180.0]. Non-finite values are
/// rejected as well. The error carries the offending values.
///
/// # Examples
///
/// ```
/// use nearby::compute::validation::validate_coordinate;
/// use nearby::Coordinate;
///
/// assert!(validate_coordinate(&Coordinate::new(52.3676, 4.9041)).is_ok());
/// assert!(validate_coordinate(&Coordinate::new(100.0, 4.9041)).is_err());
/// ```
pub fn validate_coordinate(coordinate: &Coordinate) -> Result<()> {
    if !coordinate.is_valid() {
        return Err(NearbyError::InvalidCoordinates {
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
        });
    }

    Ok(())
}

/// Validates a requested result count against `1..=max`.
///
/// # Examples
///
/// ```
/// use nearby::compute::validation::validate_limit;
///
/// assert!(validate_limit(5, 50).is_ok());
/// assert!(validate_limit(0, 50).is_err());
/// assert!(validate_limit(51, 50).is_err());
/// ```
pub fn validate_limit(limit: usize, max: usize) -> Result<()> {
    if limit == 0 || limit > max {
        return Err(NearbyError::InvalidLimit { limit, max });
    }

    Ok(())
}

/// Rejects coordinates with NaN or infinite components.
pub fn ensure_finite(coordinate: &Coordinate) -> Result<()> {
    if !coordinate.latitude.is_finite() {
        return Err(NearbyError::InvalidInput(format!(
            "Latitude must be finite, got: {}",
            coordinate.latitude
        )));
    }

    if !coordinate.longitude.is_finite() {
        return Err(NearbyError::InvalidInput(format!(
            "Longitude must be finite, got: {}",
            coordinate.longitude
        )));
    }

    Ok(())
}
