use nearby_types::coordinate::Coordinate;
use std::fmt;

/// Cache key for one query: the literal query coordinate plus `k`.
///
/// Coordinates are compared by their exact double value, not bucketed, so two
/// queries that differ in the tenth decimal never share an entry. The only
/// normalisation is `-0.0` to `0.0`, which compare equal as doubles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    latitude_bits: u64,
    longitude_bits: u64,
    limit: usize,
}

impl CacheKey {
    pub fn new(query: &Coordinate, limit: usize) -> Self {
        Self {
            latitude_bits: exact_bits(query.latitude),
            longitude_bits: exact_bits(query.longitude),
            limit,
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(
            f64::from_bits(self.latitude_bits),
            f64::from_bits(self.longitude_bits),
        )
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

fn exact_bits(value: f64) -> u64 {
    if value == 0.0 {
        0.0f64.to_bits()
    } else {
        value.to_bits()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let coordinate = self.coordinate();
        write!(
            f,
            "{}_{}_{}",
            coordinate.latitude, coordinate.longitude, self.limit
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_identical_queries_share_a_key() {
        let a = CacheKey::new(&Coordinate::new(52.3676, 4.9041), 5);
        let b = CacheKey::new(&Coordinate::new(52.3676, 4.9041), 5);
        assert_eq!(a, b);
    }

    #[test]
    fn test_limit_is_part_of_the_key() {
        let query = Coordinate::new(52.3676, 4.9041);
        assert_ne!(CacheKey::new(&query, 5), CacheKey::new(&query, 6));
    }

    #[test]
    fn test_tiny_differences_do_not_share() {
        let a = CacheKey::new(&Coordinate::new(52.3676, 4.9041), 5);
        let b = CacheKey::new(&Coordinate::new(52.3676000001, 4.9041), 5);
        assert_ne!(a, b);

        let keys: HashSet<_> = [a, b].into_iter().collect();
        assert_eq!(keys.len(), 2);
    }

    #[test]
    fn test_negative_zero_is_normalised() {
        let a = CacheKey::new(&Coordinate::new(0.0, -0.0), 1);
        let b = CacheKey::new(&Coordinate::new(-0.0, 0.0), 1);
        assert_eq!(a, b);
    }

    #[test]
    fn test_display_and_coordinate() {
        let key = CacheKey::new(&Coordinate::new(52.5, 4.25), 3);
        assert_eq!(key.to_string(), "52.5_4.25_3");
        assert_eq!(key.coordinate(), Coordinate::new(52.5, 4.25));
        assert_eq!(key.limit(), 3);
    }
}
