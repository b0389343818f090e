use crate::coordinate::Coordinate;
use serde::{Deserialize, Serialize};

/// A searchable point of interest.
///
/// Each point carries an opaque identifier, an optional location and an
/// arbitrary payload (the domain record, e.g. a store). Points are created once
/// during bulk load and shared read-only afterwards.
///
/// The location is optional because source records may lack coordinates; such
/// points stay in the dataset but never appear in search results.
///
/// # Examples
///
/// ```
/// use nearby_types::coordinate::Coordinate;
/// use nearby_types::point::GeoPoint;
///
/// let located = GeoPoint::new("a", Coordinate::new(51.9244, 4.4777), ());
/// assert!(located.has_valid_location());
///
/// let unlocated = GeoPoint::without_location("b", ());
/// assert!(!unlocated.has_valid_location());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint<T> {
    pub id: String,
    pub location: Option<Coordinate>,
    pub payload: T,
}

impl<T> GeoPoint<T> {
    pub fn new(id: impl Into<String>, location: Coordinate, payload: T) -> Self {
        Self {
            id: id.into(),
            location: Some(location),
            payload,
        }
    }

    pub fn without_location(id: impl Into<String>, payload: T) -> Self {
        Self {
            id: id.into(),
            location: None,
            payload,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn location(&self) -> Option<&Coordinate> {
        self.location.as_ref()
    }

    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// The location is present and within coordinate ranges.
    pub fn has_valid_location(&self) -> bool {
        self.location.is_some_and(|location| location.is_valid())
    }
}
