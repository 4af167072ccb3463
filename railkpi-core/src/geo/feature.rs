//! Minimal GeoJSON model for region boundaries.
//!
//! Only what the join needs: feature properties (in file order) and polygon
//! rings. Other geometry types are accepted and carried as `Unsupported`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

use super::normalize::normalize_name;

/// Property keys checked, in order, for a feature's display name.
pub const NAME_KEYS: [&str; 4] = ["NAME_1", "Propinsi", "provinsi", "name"];

/// A position is `[lon, lat]` with an optional altitude.
pub type Position = Vec<f64>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
    #[serde(other)]
    Unsupported,
}

impl Geometry {
    /// Exterior ring of every polygon.
    pub fn exterior_rings(&self) -> Vec<&[Position]> {
        match self {
            Geometry::Polygon { coordinates } => {
                coordinates.first().map(Vec::as_slice).into_iter().collect()
            }
            Geometry::MultiPolygon { coordinates } => coordinates
                .iter()
                .filter_map(|poly| poly.first().map(Vec::as_slice))
                .collect(),
            Geometry::Unsupported => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub properties: Map<String, Value>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
}

impl Feature {
    /// Join identifier: the normalized value of the first string property.
    ///
    /// The property key does not matter, so boundary files that store the
    /// region name under `NAME_1`, `Propinsi` or anything else all join the
    /// same way. Empty when the feature has no string property.
    pub fn identifier(&self) -> String {
        self.properties
            .values()
            .find_map(Value::as_str)
            .map(normalize_name)
            .unwrap_or_default()
    }

    /// Human-readable name from the first known name key, else the identifier.
    pub fn display_name(&self) -> String {
        NAME_KEYS
            .iter()
            .find_map(|k| self.properties.get(*k))
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .unwrap_or_else(|| self.identifier())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Identifier lookup over a collection. The first feature wins when two
/// features normalize to the same identifier.
#[derive(Debug, Clone)]
pub struct BoundaryIndex {
    ids: Vec<String>,
    by_id: HashMap<String, usize>,
}

impl BoundaryIndex {
    pub fn new(collection: &FeatureCollection) -> Self {
        let ids: Vec<String> = collection.features.iter().map(Feature::identifier).collect();
        let mut by_id = HashMap::with_capacity(ids.len());
        for (i, id) in ids.iter().enumerate() {
            if !id.is_empty() {
                by_id.entry(id.clone()).or_insert(i);
            }
        }
        Self { ids, by_id }
    }

    /// Feature index for a free-text region name.
    pub fn lookup(&self, name: &str) -> Option<usize> {
        self.lookup_id(&normalize_name(name))
    }

    /// Feature index for an already-normalized identifier.
    pub fn lookup_id(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    /// Identifier of feature `index`.
    pub fn id(&self, index: usize) -> Option<&str> {
        self.ids.get(index).map(String::as_str)
    }
}
