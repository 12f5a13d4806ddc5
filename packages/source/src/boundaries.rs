//! Reads neighborhood boundary polygons from a `GeoJSON` file.
//!
//! Feature order in the file becomes the boundary set's load order, which
//! the spatial join uses as its deterministic first-match tie-break.

use std::path::Path;

use geo::MultiPolygon;
use geojson::GeoJson;
use mke_crime_models::{NeighborhoodBoundary, NeighborhoodSet};

use crate::SourceError;

/// Default feature property holding the neighborhood name.
pub const DEFAULT_NAME_PROPERTY: &str = "NEIGHBORHD";

/// Loads a neighborhood boundary set from a `GeoJSON` `FeatureCollection`
/// file.
///
/// The coordinate reference system tag is declared by the caller (it comes
/// from the boundary source's documentation, not from the file contents).
/// Features missing a name or a usable polygon geometry are skipped with a
/// warning.
///
/// # Errors
///
/// Returns [`SourceError`] if the file cannot be read or does not contain
/// a `FeatureCollection`.
pub fn load_geojson_file(
    path: &Path,
    name_property: &str,
    crs: &str,
) -> Result<NeighborhoodSet, SourceError> {
    let raw = std::fs::read_to_string(path)?;
    let set = parse_feature_collection(&raw, name_property, crs)?;
    log::info!(
        "Loaded {} neighborhood boundaries from {}",
        set.len(),
        path.display()
    );
    Ok(set)
}

/// Parses a `GeoJSON` `FeatureCollection` string into a boundary set,
/// preserving feature order.
///
/// # Errors
///
/// Returns [`SourceError`] if the string is not valid `GeoJSON` or is not
/// a `FeatureCollection`.
pub fn parse_feature_collection(
    raw: &str,
    name_property: &str,
    crs: &str,
) -> Result<NeighborhoodSet, SourceError> {
    let geojson: GeoJson = raw.parse().map_err(|err| SourceError::Conversion {
        message: format!("invalid GeoJSON: {err}"),
    })?;

    let GeoJson::FeatureCollection(collection) = geojson else {
        return Err(SourceError::Conversion {
            message: "boundary file is not a GeoJSON FeatureCollection".to_string(),
        });
    };

    let mut boundaries = Vec::new();

    for feature in collection.features {
        let Some(name) = feature
            .properties
            .as_ref()
            .and_then(|props| props.get(name_property))
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())
        else {
            log::warn!("Skipping boundary feature without a {name_property} property");
            continue;
        };

        let Some(polygon) = feature.geometry.as_ref().and_then(to_multipolygon) else {
            log::warn!("Skipping boundary {name}: no usable polygon geometry");
            continue;
        };

        boundaries.push(NeighborhoodBoundary {
            name: name.to_string(),
            polygon,
        });
    }

    Ok(NeighborhoodSet {
        crs: crs.to_string(),
        boundaries,
    })
}

/// Converts a `GeoJSON` geometry into a [`MultiPolygon`]. Handles both
/// `Polygon` and `MultiPolygon` geometry types.
fn to_multipolygon(geometry: &geojson::Geometry) -> Option<MultiPolygon<f64>> {
    let geo_geom: geo::Geometry<f64> = geometry.clone().try_into().ok()?;
    match geo_geom {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
        _ => None,
    }
}
