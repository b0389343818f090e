//! Immutable in-memory collection of searchable points.
//!
//! A [`Dataset`] is built once from a bulk load and never mutated. Cloning it
//! only bumps a reference count, so every query can hold its own snapshot
//! without locking.

use crate::error::Result;
use nearby_types::point::GeoPoint;
use std::sync::Arc;

/// An ordered, read-only snapshot of points.
///
/// The order of points is the load order; the top-K selector uses it as the
/// tie-break between equidistant points.
pub struct Dataset<T> {
    points: Arc<[Arc<GeoPoint<T>>]>,
}

impl<T> Dataset<T> {
    pub fn from_points(points: impl IntoIterator<Item = GeoPoint<T>>) -> Self {
        points.into_iter().collect()
    }

    pub fn empty() -> Self {
        Self {
            points: Arc::from(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Arc<GeoPoint<T>>] {
        &self.points
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<GeoPoint<T>>> {
        self.points.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Arc<GeoPoint<T>>> {
        self.points.get(index)
    }

    /// Linear lookup by identifier.
    pub fn find(&self, id: &str) -> Option<&Arc<GeoPoint<T>>> {
        self.points.iter().find(|point| point.id() == id)
    }

    /// Number of points that can appear in search results.
    pub fn valid_location_count(&self) -> usize {
        self.points
            .iter()
            .filter(|point| point.has_valid_location())
            .count()
    }
}

impl<T> Clone for Dataset<T> {
    fn clone(&self) -> Self {
        Self {
            points: Arc::clone(&self.points),
        }
    }
}

impl<T> Default for Dataset<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> std::fmt::Debug for Dataset<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dataset")
            .field("len", &self.points.len())
            .finish()
    }
}

impl<T> FromIterator<GeoPoint<T>> for Dataset<T> {
    fn from_iter<I: IntoIterator<Item = GeoPoint<T>>>(iter: I) -> Self {
        let points: Vec<Arc<GeoPoint<T>>> = iter.into_iter().map(Arc::new).collect();
        Self {
            points: Arc::from(points),
        }
    }
}

/// Supplies the dataset a search runs against.
///
/// The engine asks for a snapshot on every computation. A failing source makes
/// the search unavailable; the failure is never cached.
pub trait DatasetSource<T>: Send + Sync {
    fn snapshot(&self) -> Result<Dataset<T>>;
}

impl<T: Send + Sync> DatasetSource<T> for Dataset<T> {
    fn snapshot(&self) -> Result<Dataset<T>> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nearby_types::coordinate::Coordinate;

    fn sample() -> Dataset<&'static str> {
        Dataset::from_points(vec![
            GeoPoint::new("ams", Coordinate::new(52.3676, 4.9041), "Amsterdam"),
            GeoPoint::without_location("nowhere", "Unknown"),
            GeoPoint::new("rtm", Coordinate::new(51.9244, 4.4777), "Rotterdam"),
            GeoPoint::new("bad", Coordinate::new(123.0, 4.0), "Broken"),
        ])
    }

    #[test]
    fn test_preserves_load_order() {
        let dataset = sample();
        let ids: Vec<&str> = dataset.iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec!["ams", "nowhere", "rtm", "bad"]);
        assert_eq!(dataset.get(2).map(|p| p.id()), Some("rtm"));
        assert!(dataset.get(4).is_none());
    }

    #[test]
    fn test_valid_location_count() {
        let dataset = sample();
        assert_eq!(dataset.len(), 4);
        assert_eq!(dataset.valid_location_count(), 2);
    }

    #[test]
    fn test_find() {
        let dataset = sample();
        assert_eq!(dataset.find("rtm").map(|p| *p.payload()), Some("Rotterdam"));
        assert!(dataset.find("missing").is_none());
    }

    #[test]
    fn test_snapshot_shares_storage() {
        let dataset = sample();
        let snapshot = dataset.snapshot().unwrap();
        assert!(Arc::ptr_eq(&dataset.points[0], &snapshot.points[0]));
    }

    #[test]
    fn test_empty() {
        let dataset: Dataset<()> = Dataset::default();
        assert!(dataset.is_empty());
        assert_eq!(dataset.valid_location_count(), 0);
    }
}
