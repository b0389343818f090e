use crate::point::GeoPoint;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A point together with its distance from the query, in kilometers.
///
/// The distance is rounded to two decimal places. The point is shared with the
/// dataset, so cloning a result never copies the payload.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct RankedResult<T> {
    pub point: Arc<GeoPoint<T>>,
    pub distance_km: f64,
}

impl<T> RankedResult<T> {
    pub fn new(point: Arc<GeoPoint<T>>, distance_km: f64) -> Self {
        Self { point, distance_km }
    }

    pub fn id(&self) -> &str {
        self.point.id()
    }
}

impl<T> Clone for RankedResult<T> {
    fn clone(&self) -> Self {
        Self {
            point: Arc::clone(&self.point),
            distance_km: self.distance_km,
        }
    }
}

/// Query parameters echoed back with a response.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QueryInfo {
    pub latitude: f64,
    pub longitude: f64,
    pub limit: usize,
}

/// Caller-facing answer to a nearest-points request.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct NearestResponse<T> {
    pub query: QueryInfo,
    pub results: Vec<RankedResult<T>>,
    pub total_found: usize,
}

impl<T> NearestResponse<T> {
    pub fn new(query: QueryInfo, results: Vec<RankedResult<T>>) -> Self {
        let total_found = results.len();
        Self {
            query,
            results,
            total_found,
        }
    }
}

impl<T> Clone for NearestResponse<T> {
    fn clone(&self) -> Self {
        Self {
            query: self.query,
            results: self.results.clone(),
            total_found: self.total_found,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinate::Coordinate;

    #[test]
    fn test_clone_shares_point() {
        let point = Arc::new(GeoPoint::new("a", Coordinate::new(1.0, 2.0), vec![1u8; 64]));
        let result = RankedResult::new(Arc::clone(&point), 1.23);
        let copy = result.clone();
        assert!(Arc::ptr_eq(&result.point, &copy.point));
        assert_eq!(Arc::strong_count(&point), 3);
    }

    #[test]
    fn test_response_counts_results() {
        let point = Arc::new(GeoPoint::new("a", Coordinate::new(1.0, 2.0), ()));
        let query = QueryInfo {
            latitude: 1.0,
            longitude: 2.0,
            limit: 5,
        };
        let response = NearestResponse::new(query, vec![RankedResult::new(point, 0.0)]);
        assert_eq!(response.total_found, 1);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["query"]["limit"], 5);
        assert_eq!(json["total_found"], 1);
        assert_eq!(json["results"][0]["point"]["id"], "a");
        assert_eq!(json["results"][0]["distance_km"], 0.0);
    }
}
