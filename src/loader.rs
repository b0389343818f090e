//! One-time JSON bulk load into a [`Dataset`].
//!
//! The expected document holds an array of records under a root key:
//!
//! ```json
//! { "points": [
//!     { "id": "ams-01", "latitude": 52.3676, "longitude": "4.9041", "name": "Damrak" },
//!     { "id": "ams-02", "latitude": null, "longitude": null, "name": "Warehouse" }
//! ] }
//! ```
//!
//! The identifier and coordinate fields are pulled out of each record; whatever
//! remains is deserialized into the payload type. Coordinates may be numbers,
//! numeric strings, `null` or empty strings (the last two meaning "no
//! location"). Problems are collected across all records and reported in one
//! error, so a bad file fails once with the full list.

use crate::dataset::Dataset;
use crate::error::{NearbyError, Result};
use nearby_types::coordinate::Coordinate;
use nearby_types::point::GeoPoint;
use rustc_hash::FxHashSet;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Reads point records from JSON.
///
/// # Examples
///
/// ```rust
/// use nearby::DatasetLoader;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Store {
///     name: String,
/// }
///
/// let json = r#"{"stores": [
///     {"uuid": "s-1", "latitude": 52.37, "longitude": 4.90, "name": "Centrum"}
/// ]}"#;
///
/// let dataset = DatasetLoader::new()
///     .root_key("stores")
///     .id_field("uuid")
///     .load_str::<Store>(json)?;
///
/// assert_eq!(dataset.len(), 1);
/// assert_eq!(dataset.points()[0].payload().name, "Centrum");
/// # Ok::<(), nearby::NearbyError>(())
/// ```
#[derive(Debug, Clone)]
pub struct DatasetLoader {
    root_key: Option<String>,
    id_field: String,
    latitude_field: String,
    longitude_field: String,
}

impl DatasetLoader {
    pub fn new() -> Self {
        Self {
            root_key: Some("points".to_string()),
            id_field: "id".to_string(),
            latitude_field: "latitude".to_string(),
            longitude_field: "longitude".to_string(),
        }
    }

    /// Key of the record array in the top-level object.
    pub fn root_key(mut self, key: impl Into<String>) -> Self {
        self.root_key = Some(key.into());
        self
    }

    /// Expect the document itself to be the record array.
    pub fn bare_array(mut self) -> Self {
        self.root_key = None;
        self
    }

    pub fn id_field(mut self, field: impl Into<String>) -> Self {
        self.id_field = field.into();
        self
    }

    pub fn latitude_field(mut self, field: impl Into<String>) -> Self {
        self.latitude_field = field.into();
        self
    }

    pub fn longitude_field(mut self, field: impl Into<String>) -> Self {
        self.longitude_field = field.into();
        self
    }

    pub fn load_path<T: DeserializeOwned>(&self, path: impl AsRef<Path>) -> Result<Dataset<T>> {
        let path = path.as_ref();
        log::info!("Loading points from: {}", path.display());

        let file = File::open(path).map_err(|e| {
            NearbyError::Dataset(format!("Failed to open {}: {}", path.display(), e))
        })?;
        self.load_reader(BufReader::new(file))
    }

    pub fn load_reader<T: DeserializeOwned, R: Read>(&self, reader: R) -> Result<Dataset<T>> {
        let root: Value = serde_json::from_reader(reader)?;
        self.load_value(root)
    }

    pub fn load_str<T: DeserializeOwned>(&self, json: &str) -> Result<Dataset<T>> {
        let root: Value = serde_json::from_str(json)?;
        self.load_value(root)
    }

    pub fn load_value<T: DeserializeOwned>(&self, root: Value) -> Result<Dataset<T>> {
        let records = self.records(root)?;
        let total = records.len();

        let mut points = Vec::with_capacity(total);
        let mut seen = FxHashSet::default();
        let mut problems = Vec::new();

        for (index, record) in records.into_iter().enumerate() {
            match self.parse_record::<T>(record) {
                Ok(point) => {
                    if seen.insert(point.id.clone()) {
                        points.push(point);
                    } else {
                        problems.push(format!("[record #{}] duplicate id '{}'", index + 1, point.id));
                    }
                }
                Err(reason) => problems.push(format!("[record #{}] {}", index + 1, reason)),
            }
        }

        if !problems.is_empty() {
            let message = format!(
                "{} out of {} records are invalid:\n  {}",
                problems.len(),
                total,
                problems.join("\n  ")
            );
            log::error!("Dataset validation failed: {}", message);
            return Err(NearbyError::Dataset(message));
        }

        let dataset = Dataset::from_points(points);
        log::info!("Successfully loaded {} points", dataset.len());
        log::info!("Points with valid location: {}", dataset.valid_location_count());
        Ok(dataset)
    }

    fn records(&self, root: Value) -> Result<Vec<Value>> {
        let records = match &self.root_key {
            Some(key) => match root {
                Value::Object(mut map) => map.remove(key).ok_or_else(|| {
                    NearbyError::Dataset(format!("Invalid JSON structure: '{}' key not found", key))
                })?,
                _ => {
                    return Err(NearbyError::Dataset(format!(
                        "Invalid JSON structure: expected an object holding '{}'",
                        key
                    )));
                }
            },
            None => root,
        };

        match records {
            Value::Array(records) => Ok(records),
            other => Err(NearbyError::Dataset(format!(
                "Invalid JSON structure: expected an array of records, got {}",
                kind(&other)
            ))),
        }
    }

    fn parse_record<T: DeserializeOwned>(&self, record: Value) -> std::result::Result<GeoPoint<T>, String> {
        let mut fields = match record {
            Value::Object(fields) => fields,
            other => return Err(format!("expected an object, got {}", kind(&other))),
        };

        let id = match fields.remove(&self.id_field) {
            Some(Value::String(id)) if !id.trim().is_empty() => id,
            Some(Value::Number(id)) => id.to_string(),
            None | Some(Value::Null) | Some(Value::String(_)) => {
                return Err(format!("'{}' is mandatory and cannot be blank", self.id_field));
            }
            Some(other) => {
                return Err(format!("'{}' must be a string, got {}", self.id_field, kind(&other)));
            }
        };

        let latitude = coordinate_value(&mut fields, &self.latitude_field)?;
        let longitude = coordinate_value(&mut fields, &self.longitude_field)?;

        let payload = serde_json::from_value(Value::Object(fields))
            .map_err(|e| format!("id '{}': invalid payload: {}", id, e))?;

        Ok(match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => {
                GeoPoint::new(id, Coordinate::new(latitude, longitude), payload)
            }
            _ => GeoPoint::without_location(id, payload),
        })
    }
}

impl Default for DatasetLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads a coordinate from a number or numeric string. Null, absent and blank
/// values mean "no coordinate".
fn coordinate_value(fields: &mut Map<String, Value>, field: &str) -> std::result::Result<Option<f64>, String> {
    let value = match fields.remove(field) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(number)) => number
            .as_f64()
            .ok_or_else(|| format!("cannot read '{}' value {} as a double", field, number))?,
        Some(Value::String(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            text.parse::<f64>()
                .map_err(|_| format!("cannot parse '{}' value '{}' as a double", field, text))?
        }
        Some(other) => {
            return Err(format!("cannot read '{}' from {}", field, kind(&other)));
        }
    };

    if !value.is_finite() {
        return Err(format!("'{}' must be finite, got {}", field, value));
    }

    Ok(Some(value))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Write;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Store {
        name: String,
        #[serde(default)]
        city: Option<String>,
    }

    #[test]
    fn test_load_mixed_coordinate_formats() {
        let json = r#"{"points": [
            {"id": "a", "latitude": 52.3676, "longitude": 4.9041, "name": "Numbers"},
            {"id": "b", "latitude": "51.9244", "longitude": " 4.4777 ", "name": "Strings"},
            {"id": "c", "latitude": null, "longitude": "", "name": "Nowhere"}
        ]}"#;

        let dataset = DatasetLoader::new().load_str::<Store>(json).unwrap();
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.valid_location_count(), 2);

        let b = dataset.find("b").unwrap();
        assert_eq!(b.location(), Some(&Coordinate::new(51.9244, 4.4777)));
        assert_eq!(b.payload().name, "Strings");

        let c = dataset.find("c").unwrap();
        assert!(c.location().is_none());
    }

    #[test]
    fn test_preserves_record_order() {
        let json = r#"[{"id": "z", "name": "1"}, {"id": "a", "name": "2"}, {"id": 7, "name": "3"}]"#;
        let dataset = DatasetLoader::new().bare_array().load_str::<Store>(json).unwrap();
        let ids: Vec<&str> = dataset.iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec!["z", "a", "7"]);
    }

    #[test]
    fn test_custom_field_names() {
        let json = r#"{"stores": [{"uuid": "s-1", "lat": 1.0, "lng": 2.0, "name": "x", "city": "Utrecht"}]}"#;
        let dataset = DatasetLoader::new()
            .root_key("stores")
            .id_field("uuid")
            .latitude_field("lat")
            .longitude_field("lng")
            .load_str::<Store>(json)
            .unwrap();

        let point = &dataset.points()[0];
        assert_eq!(point.id(), "s-1");
        assert_eq!(point.location(), Some(&Coordinate::new(1.0, 2.0)));
        assert_eq!(point.payload().city.as_deref(), Some("Utrecht"));
    }

    #[test]
    fn test_missing_root_key() {
        let err = DatasetLoader::new()
            .load_str::<Value>(r#"{"stores": []}"#)
            .unwrap_err();
        assert_eq!(
            err,
            NearbyError::Dataset("Invalid JSON structure: 'points' key not found".into())
        );
    }

    #[test]
    fn test_collects_every_problem() {
        let json = r#"{"points": [
            {"id": "ok", "latitude": 1, "longitude": 2, "name": "fine"},
            {"id": "  ", "name": "blank id"},
            {"id": "bad-lat", "latitude": "north", "longitude": 2, "name": "x"},
            {"id": "ok", "name": "duplicate"},
            {"id": "obj", "latitude": {"deg": 1}, "name": "x"},
            {"id": "nan", "latitude": "NaN", "longitude": 2, "name": "x"},
            {"id": "no-name"}
        ]}"#;

        let err = DatasetLoader::new().load_str::<Store>(json).unwrap_err();
        let NearbyError::Dataset(message) = err else {
            panic!("expected a dataset error");
        };

        assert!(message.starts_with("6 out of 7 records are invalid"), "{}", message);
        assert!(message.contains("[record #2] 'id' is mandatory"));
        assert!(message.contains("[record #3] cannot parse 'latitude' value 'north'"));
        assert!(message.contains("[record #4] duplicate id 'ok'"));
        assert!(message.contains("[record #5] cannot read 'latitude' from an object"));
        assert!(message.contains("[record #6] 'latitude' must be finite"));
        assert!(message.contains("[record #7] id 'no-name': invalid payload"));
    }

    #[test]
    fn test_malformed_json() {
        let err = DatasetLoader::new().load_str::<Value>("{not json").unwrap_err();
        assert!(matches!(err, NearbyError::Serialization(_)));
    }

    #[test]
    fn test_load_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"points": [{{"id": "p", "latitude": 0.5, "longitude": 0.5}}]}}"#
        )
        .unwrap();

        let dataset = DatasetLoader::new().load_path::<Value>(file.path()).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.points()[0].payload(), &Value::Object(Map::new()));
    }

    #[test]
    fn test_load_missing_path() {
        let err = DatasetLoader::new()
            .load_path::<Value>("/no/such/points.json")
            .unwrap_err();
        assert!(matches!(err, NearbyError::Dataset(_)));
    }
}
