//! Top-K selection of the points nearest to a query.
//!
//! Points without a location, or with one outside the valid coordinate ranges,
//! are skipped silently. Every remaining point is measured with the supplied
//! [`DistanceFunction`], the distance is rounded half-up to two decimals, and
//! the points are ordered ascending by rounded distance. Equal distances keep
//! dataset order, so repeated calls return identical sequences.
//!
//! Two strategies produce the same output:
//!
//! | Strategy   | Time       | Space |
//! |------------|------------|-------|
//! | `FullSort` | O(n log n) | O(n)  |
//! | `Heap`     | O(n log k) | O(k)  |
//!
//! A spatial index (R-tree, k-d tree) would replace the linear candidate scan
//! in [`select_with`] if datasets ever grow far beyond a few thousand points.

use crate::compute::distance::DistanceFunction;
use crate::config::SelectionStrategy;
use crate::error::{NearbyError, Result};
use nearby_types::coordinate::Coordinate;
use nearby_types::point::GeoPoint;
use nearby_types::result::RankedResult;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;

/// Rounds a distance to two decimal places, halves rounding up.
///
/// # Examples
///
/// ```
/// use nearby::compute::round_distance;
///
/// assert_eq!(round_distance(1.2345678), 1.23);
/// assert_eq!(round_distance(0.125), 0.13);
/// ```
pub fn round_distance(km: f64) -> f64 {
    (km * 100.0 + 0.5).floor() / 100.0
}

/// Selects the `k` nearest points with a full sort.
///
/// Returns fewer than `k` results when fewer points have a valid location, and
/// an empty vector when none do.
///
/// # Examples
///
/// ```rust
/// use nearby::{Coordinate, Dataset, GeoPoint};
/// use nearby::compute::{Haversine, select};
///
/// let dataset = Dataset::from_points(vec![
///     GeoPoint::new("rtm", Coordinate::new(51.9244, 4.4777), "Rotterdam"),
///     GeoPoint::new("utr", Coordinate::new(52.0907, 5.1214), "Utrecht"),
/// ]);
///
/// let amsterdam = Coordinate::new(52.3676, 4.9041);
/// let nearest = select(dataset.points(), &amsterdam, 1, &Haversine::default())?;
/// assert_eq!(nearest[0].id(), "utr");
/// # Ok::<(), nearby::NearbyError>(())
/// ```
pub fn select<T, D>(
    points: &[Arc<GeoPoint<T>>],
    query: &Coordinate,
    k: usize,
    distance: &D,
) -> Result<Vec<RankedResult<T>>>
where
    D: DistanceFunction + ?Sized,
{
    select_with(points, query, k, distance, SelectionStrategy::FullSort)
}

/// Selects the `k` nearest points using the given strategy.
pub fn select_with<T, D>(
    points: &[Arc<GeoPoint<T>>],
    query: &Coordinate,
    k: usize,
    distance: &D,
    strategy: SelectionStrategy,
) -> Result<Vec<RankedResult<T>>>
where
    D: DistanceFunction + ?Sized,
{
    if k == 0 {
        return Err(NearbyError::InvalidInput(
            "Number of results must be at least 1".to_string(),
        ));
    }

    let mut measured = 0usize;
    let candidates = points.iter().enumerate().filter_map(|(index, point)| {
        let location = point.location.filter(Coordinate::is_valid)?;
        measured += 1;
        Some(measure(index, query, &location, distance))
    });

    let ranked = match strategy {
        SelectionStrategy::FullSort => full_sort(candidates, k)?,
        SelectionStrategy::Heap => bounded_heap(candidates, k)?,
    };

    log::debug!(
        "Ranked {} of {} points ({} with valid location) for query {}",
        ranked.len(),
        points.len(),
        measured,
        query
    );

    Ok(ranked
        .into_iter()
        .map(|candidate| {
            RankedResult::new(Arc::clone(&points[candidate.index]), candidate.distance_km)
        })
        .collect())
}

/// A measured point, ordered by rounded distance then dataset position.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    distance_km: f64,
    index: usize,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance_km
            .total_cmp(&other.distance_km)
            .then(self.index.cmp(&other.index))
    }
}

fn measure<D>(index: usize, query: &Coordinate, location: &Coordinate, distance: &D) -> Result<Candidate>
where
    D: DistanceFunction + ?Sized,
{
    let km = distance.distance(query, location)?;
    if !km.is_finite() || km < 0.0 {
        return Err(NearbyError::InvalidInput(format!(
            "Distance function returned {} for {} -> {}",
            km, query, location
        )));
    }

    Ok(Candidate {
        distance_km: round_distance(km),
        index,
    })
}

fn full_sort(candidates: impl Iterator<Item = Result<Candidate>>, k: usize) -> Result<Vec<Candidate>> {
    let mut ranked = candidates.collect::<Result<Vec<_>>>()?;
    // stable: equal distances keep dataset order
    ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    ranked.truncate(k);
    Ok(ranked)
}

fn bounded_heap(candidates: impl Iterator<Item = Result<Candidate>>, k: usize) -> Result<Vec<Candidate>> {
    let mut heap = BinaryHeap::with_capacity(k.saturating_add(1).min(1024));

    for candidate in candidates {
        let candidate = candidate?;

        if heap.len() < k {
            heap.push(candidate);
        } else if let Some(mut worst) = heap.peek_mut()
            && candidate < *worst
        {
            *worst = candidate;
        }
    }

    Ok(heap.into_sorted_vec())
}
