//! Vector data: target features and observed event points

use geo_types::{Geometry, Point};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Attribute value types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl AttributeValue {
    /// Numeric view of the attribute, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Int(v) => Some(*v as f64),
            AttributeValue::Float(v) => Some(*v),
            _ => None,
        }
    }
}

/// A geographic feature with geometry and attributes
///
/// Target polylines (distance rasters) and permissive polygons (masks) are
/// both carried as features with lon/lat geometries in degrees.
#[derive(Debug, Clone)]
pub struct Feature {
    /// Feature geometry
    pub geometry: Option<Geometry<f64>>,
    /// Feature attributes
    pub properties: HashMap<String, AttributeValue>,
    /// Optional feature ID
    pub id: Option<String>,
}

impl Feature {
    /// Attribute holding the oldest epoch (Ma) at which a feature exists
    pub const BEGIN_TIME: &'static str = "begin_time";
    /// Attribute holding the youngest epoch (Ma) at which a feature exists
    pub const END_TIME: &'static str = "end_time";

    /// Create a new feature with geometry
    pub fn new(geometry: impl Into<Geometry<f64>>) -> Self {
        Self {
            geometry: Some(geometry.into()),
            properties: HashMap::new(),
            id: None,
        }
    }

    /// Create a feature with no geometry
    pub fn empty() -> Self {
        Self {
            geometry: None,
            properties: HashMap::new(),
            id: None,
        }
    }

    /// Builder-style attribute setter
    pub fn with_property(mut self, key: impl Into<String>, value: AttributeValue) -> Self {
        self.set_property(key, value);
        self
    }

    /// Set an attribute
    pub fn set_property(&mut self, key: impl Into<String>, value: AttributeValue) {
        self.properties.insert(key.into(), value);
    }

    /// Get an attribute
    pub fn get_property(&self, key: &str) -> Option<&AttributeValue> {
        self.properties.get(key)
    }

    /// Whether the feature exists at `time` (Ma, increasing into the past).
    ///
    /// Missing bounds are open: no `begin_time` means "since forever" and no
    /// `end_time` means "until present day".
    pub fn is_valid_at(&self, time: f64) -> bool {
        let begin = self
            .get_property(Self::BEGIN_TIME)
            .and_then(AttributeValue::as_f64)
            .unwrap_or(f64::INFINITY);
        let end = self
            .get_property(Self::END_TIME)
            .and_then(AttributeValue::as_f64)
            .unwrap_or(f64::NEG_INFINITY);
        time <= begin && time >= end
    }
}

/// Collection of features
#[derive(Debug, Clone, Default)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new() -> Self {
        Self { features: Vec::new() }
    }

    pub fn push(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }

    /// Iterate over the geometries of features that have one
    pub fn geometries(&self) -> impl Iterator<Item = &Geometry<f64>> {
        self.features.iter().filter_map(|f| f.geometry.as_ref())
    }
}

impl FromIterator<Feature> for FeatureCollection {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        Self {
            features: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for FeatureCollection {
    type Item = Feature;
    type IntoIter = std::vec::IntoIter<Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.into_iter()
    }
}

/// A location in longitude/latitude degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

impl From<Point<f64>> for GeoPoint {
    fn from(p: Point<f64>) -> Self {
        Self::new(p.x(), p.y())
    }
}

impl From<GeoPoint> for Point<f64> {
    fn from(p: GeoPoint) -> Self {
        Point::new(p.lon, p.lat)
    }
}

/// An observed event: where it sits at its own epoch, and which epoch that is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Optional identifier carried through to results
    pub label: Option<String>,
    /// Epoch of the event (same convention as raster sequence keys)
    pub time: f64,
    /// Coordinate reconstructed to `time`
    pub point: GeoPoint,
}

impl Observation {
    pub fn new(time: f64, point: GeoPoint) -> Self {
        Self {
            label: None,
            time,
            point,
        }
    }

    pub fn labelled(label: impl Into<String>, time: f64, point: GeoPoint) -> Self {
        Self {
            label: Some(label.into()),
            time,
            point,
        }
    }
}
