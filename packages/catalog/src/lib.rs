#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Immutable catalog of known fire hydrants.
//!
//! The catalog is parsed once at startup from a `GeoJSON`
//! `FeatureCollection` of `Point` features, each carrying a `label`
//! property. Every other property is kept verbatim in
//! [`HydrantRecord::attributes`]. After loading there is no way to mutate
//! the catalog, so a shared reference (or an `Arc`) can be read from any
//! number of concurrent queries without locking.
//!
//! Nearest-neighbor selection over the catalog lives in [`nearest`].

pub mod nearest;

use std::path::Path;

use geojson::{Feature, GeoJson, feature::Id};
use hydrant_map_hydrant_models::{Attributes, Coordinate, HydrantRecord};
use thiserror::Error;

/// Name of the feature property holding the hydrant label.
pub const LABEL_PROPERTY: &str = "label";

/// The dataset could not be turned into a catalog.
///
/// This is fatal at startup: serving with a partially parsed catalog would
/// silently hide hydrants from every answer.
#[derive(Debug, Error)]
pub enum MalformedDatasetError {
    /// Reading the dataset file failed.
    #[error("Failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    /// The source is not valid `GeoJSON`.
    #[error("Invalid GeoJSON: {0}")]
    GeoJson(#[from] Box<geojson::Error>),

    /// The top-level object is not a `FeatureCollection`.
    #[error("Dataset is not a GeoJSON FeatureCollection")]
    NotFeatureCollection,

    /// A single feature is unusable.
    #[error("Feature {index}: {reason}")]
    Feature {
        /// Position of the feature in the collection.
        index: usize,
        /// What is wrong with it.
        reason: String,
    },
}

/// Load-once, read-many collection of hydrant records.
#[derive(Debug, Clone, Default)]
pub struct HydrantCatalog {
    records: Vec<HydrantRecord>,
}

impl HydrantCatalog {
    /// Parses a `GeoJSON` `FeatureCollection` into a catalog.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedDatasetError`] if the source is not a feature
    /// collection, or if any feature lacks a `Point` geometry, has an
    /// out-of-range position, or has no `label` property.
    pub fn load(source: &str) -> Result<Self, MalformedDatasetError> {
        let geojson: GeoJson = source.parse().map_err(Box::new)?;
        let GeoJson::FeatureCollection(collection) = geojson else {
            return Err(MalformedDatasetError::NotFeatureCollection);
        };

        let records = collection
            .features
            .into_iter()
            .enumerate()
            .map(|(index, feature)| parse_feature(index, feature))
            .collect::<Result<Vec<_>, _>>()?;

        log::info!("Loaded {} hydrants into catalog", records.len());

        Ok(Self { records })
    }

    /// Reads and parses a `GeoJSON` file.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedDatasetError`] if the file cannot be read or
    /// [`Self::load`] rejects its contents.
    pub fn load_path(path: &Path) -> Result<Self, MalformedDatasetError> {
        log::info!("Reading hydrant dataset from {}", path.display());
        let source = std::fs::read_to_string(path)?;
        Self::load(&source)
    }

    /// Builds a catalog directly from records, preserving their order.
    #[must_use]
    pub const fn from_records(records: Vec<HydrantRecord>) -> Self {
        Self { records }
    }

    /// Every record, in dataset order.
    #[must_use]
    pub fn all(&self) -> &[HydrantRecord] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the catalog holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn parse_feature(index: usize, feature: Feature) -> Result<HydrantRecord, MalformedDatasetError> {
    let malformed = |reason: String| MalformedDatasetError::Feature { index, reason };

    let geometry = feature
        .geometry
        .ok_or_else(|| malformed("missing geometry".to_string()))?;

    let geojson::Value::Point(position) = geometry.value else {
        return Err(malformed(format!(
            "geometry is {}, expected Point",
            geometry_type(&geometry.value)
        )));
    };

    // GeoJSON positions are [longitude, latitude, (altitude)]
    let (Some(&longitude), Some(&latitude)) = (position.first(), position.get(1)) else {
        return Err(malformed(
            "point has fewer than 2 coordinates".to_string(),
        ));
    };
    let coordinate =
        Coordinate::new(latitude, longitude).map_err(|e| malformed(e.to_string()))?;

    let mut attributes: Attributes = feature.properties.unwrap_or_default().into_iter().collect();

    let label = match attributes.remove(LABEL_PROPERTY) {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        Some(serde_json::Value::Null) | None => {
            return Err(malformed(format!("missing '{LABEL_PROPERTY}' property")));
        }
        Some(other) => {
            return Err(malformed(format!(
                "'{LABEL_PROPERTY}' property must be a string, got {other}"
            )));
        }
    };

    let id = match feature.id {
        Some(Id::String(s)) => s,
        Some(Id::Number(n)) => n.to_string(),
        None => index.to_string(),
    };

    Ok(HydrantRecord {
        id,
        coordinate,
        label,
        attributes,
    })
}

const fn geometry_type(value: &geojson::Value) -> &'static str {
    match value {
        geojson::Value::Point(_) => "Point",
        geojson::Value::MultiPoint(_) => "MultiPoint",
        geojson::Value::LineString(_) => "LineString",
        geojson::Value::MultiLineString(_) => "MultiLineString",
        geojson::Value::Polygon(_) => "Polygon",
        geojson::Value::MultiPolygon(_) => "MultiPolygon",
        geojson::Value::GeometryCollection(_) => "GeometryCollection",
    }
}
