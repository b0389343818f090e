//! Great-circle distance between coordinates.
//!
//! The engine depends on the [`DistanceFunction`] trait rather than a concrete
//! formula so a caller can inject a fixed or instrumented function. The
//! production implementation is [`Haversine`] on a sphere of radius
//! [`EARTH_RADIUS_KM`].

use crate::compute::validation::ensure_finite;
use crate::error::Result;
use nearby_types::coordinate::Coordinate;

/// Mean Earth radius used by the haversine formula, in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Distance between two coordinates, in kilometers.
///
/// Implementations must be symmetric, return 0 for identical coordinates and
/// fail with [`NearbyError::InvalidInput`](crate::NearbyError::InvalidInput)
/// when either coordinate is not finite.
///
/// Any `Fn(&Coordinate, &Coordinate) -> Result<f64>` closure is a distance
/// function too.
pub trait DistanceFunction: Send + Sync {
    fn distance(&self, from: &Coordinate, to: &Coordinate) -> Result<f64>;
}

impl<F> DistanceFunction for F
where
    F: Fn(&Coordinate, &Coordinate) -> Result<f64> + Send + Sync,
{
    fn distance(&self, from: &Coordinate, to: &Coordinate) -> Result<f64> {
        self(from, to)
    }
}

/// Haversine great-circle distance on a sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Haversine {
    radius_km: f64,
}

impl Haversine {
    /// Haversine on a sphere with the given radius.
    pub fn with_radius(radius_km: f64) -> Self {
        assert!(
            radius_km.is_finite() && radius_km > 0.0,
            "Sphere radius must be positive and finite"
        );
        Self { radius_km }
    }

    pub fn radius_km(&self) -> f64 {
        self.radius_km
    }
}

impl Default for Haversine {
    fn default() -> Self {
        Self {
            radius_km: EARTH_RADIUS_KM,
        }
    }
}

impl DistanceFunction for Haversine {
    fn distance(&self, from: &Coordinate, to: &Coordinate) -> Result<f64> {
        ensure_finite(from)?;
        ensure_finite(to)?;
        Ok(self.radius_km * central_angle(from, to))
    }
}

/// Haversine distance in kilometers on a sphere of radius [`EARTH_RADIUS_KM`].
///
/// # Examples
///
/// ```rust
/// use nearby::Coordinate;
/// use nearby::compute::haversine_km;
///
/// let amsterdam = Coordinate::new(52.3676, 4.9041);
/// let rotterdam = Coordinate::new(51.9244, 4.4777);
///
/// let km = haversine_km(&amsterdam, &rotterdam)?;
/// assert!((km - 57.6).abs() < 1.0);
/// # Ok::<(), nearby::NearbyError>(())
/// ```
pub fn haversine_km(from: &Coordinate, to: &Coordinate) -> Result<f64> {
    Haversine::default().distance(from, to)
}

// The deltas are taken as absolute values so swapping the arguments yields the
// bit-identical result.
fn central_angle(from: &Coordinate, to: &Coordinate) -> f64 {
    let (lat1, lon1) = from.to_radians();
    let (lat2, lon2) = to.to_radians();

    let half_dlat = ((lat2 - lat1).abs() / 2.0).sin();
    let half_dlon = ((lon2 - lon1).abs() / 2.0).sin();

    let a = half_dlat * half_dlat + lat1.cos() * lat2.cos() * half_dlon * half_dlon;
    // rounding can push `a` a hair outside [0, 1] for antipodal points
    let a = a.clamp(0.0, 1.0);

    2.0 * a.sqrt().atan2((1.0 - a).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NearbyError;
    use geo::{Distance, Haversine as GeoHaversine};

    const AMSTERDAM: Coordinate = Coordinate::new(52.3676, 4.9041);
    const ROTTERDAM: Coordinate = Coordinate::new(51.9244, 4.4777);

    #[test]
    fn test_amsterdam_to_rotterdam() {
        let km = haversine_km(&AMSTERDAM, &ROTTERDAM).unwrap();
        assert!((km - 57.6).abs() < 1.0, "got {}", km);
    }

    #[test]
    fn test_new_york_to_los_angeles() {
        let nyc = Coordinate::new(40.7128, -74.0060);
        let la = Coordinate::new(34.0522, -118.2437);
        let km = haversine_km(&nyc, &la).unwrap();
        assert!((km - 3935.7).abs() < 1.0, "got {}", km);
    }

    #[test]
    fn test_identical_points_are_zero() {
        for coordinate in [AMSTERDAM, ROTTERDAM, Coordinate::new(90.0, 180.0)] {
            assert_eq!(haversine_km(&coordinate, &coordinate).unwrap(), 0.0);
        }
    }

    #[test]
    fn test_symmetry() {
        let samples = [
            AMSTERDAM,
            ROTTERDAM,
            Coordinate::new(-33.8688, 151.2093),
            Coordinate::new(90.0, 0.0),
            Coordinate::new(-90.0, 0.0),
            Coordinate::new(0.0, 180.0),
            Coordinate::new(0.0, -180.0),
            Coordinate::new(12.345678, -98.7654321),
        ];

        for a in &samples {
            for b in &samples {
                let ab = haversine_km(a, b).unwrap();
                let ba = haversine_km(b, a).unwrap();
                assert_eq!(ab, ba, "asymmetric for {} and {}", a, b);
            }
        }
    }

    #[test]
    fn test_antipodal_points() {
        let half_circumference = std::f64::consts::PI * EARTH_RADIUS_KM;
        let km = haversine_km(&Coordinate::new(90.0, 0.0), &Coordinate::new(-90.0, 0.0)).unwrap();
        assert!((km - half_circumference).abs() < 1e-6);

        let km = haversine_km(&Coordinate::new(0.0, 0.0), &Coordinate::new(0.0, 180.0)).unwrap();
        assert!((km - half_circumference).abs() < 1e-6);
    }

    #[test]
    fn test_crosses_date_line() {
        let west = Coordinate::new(0.0, 179.5);
        let east = Coordinate::new(0.0, -179.5);
        let km = haversine_km(&west, &east).unwrap();
        assert!((km - 111.19).abs() < 0.01, "got {}", km);
    }

    #[test]
    fn test_non_finite_is_rejected() {
        let nan = Coordinate::new(f64::NAN, 4.0);
        assert!(matches!(
            haversine_km(&nan, &AMSTERDAM),
            Err(NearbyError::InvalidInput(_))
        ));
        assert!(matches!(
            haversine_km(&AMSTERDAM, &Coordinate::new(52.0, f64::INFINITY)),
            Err(NearbyError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_agrees_with_geo_haversine() {
        // geo uses a slightly larger mean radius (6371.0088 km)
        let ours = haversine_km(&AMSTERDAM, &ROTTERDAM).unwrap();
        let theirs = GeoHaversine.distance(geo::Point::from(AMSTERDAM), geo::Point::from(ROTTERDAM))
            / 1000.0;
        assert!((ours - theirs).abs() < 0.01, "{} vs {}", ours, theirs);
    }

    #[test]
    fn test_custom_radius() {
        let unit = Haversine::with_radius(1.0);
        let angle = unit
            .distance(&Coordinate::new(0.0, 0.0), &Coordinate::new(0.0, 90.0))
            .unwrap();
        assert!((angle - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_closure_is_a_distance_function() {
        let fixed = |_: &Coordinate, _: &Coordinate| -> Result<f64> { Ok(4.2) };
        assert_eq!(fixed.distance(&AMSTERDAM, &ROTTERDAM).unwrap(), 4.2);
    }
}
