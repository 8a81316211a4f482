//! Reading a project's stored boundary back into coordinate sequences

use bioscore_core::error::{BioscoreError, Result};
use geojson::{GeoJson, Geometry, Value};

/// Exterior ring of a project boundary, split into coordinate sequences
#[derive(Debug, Clone, PartialEq)]
pub struct ExteriorRing {
    pub longitudes: Vec<f64>,
    pub latitudes: Vec<f64>,
}

impl ExteriorRing {
    pub fn len(&self) -> usize {
        self.longitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.longitudes.is_empty()
    }
}

/// Parse stored GeoJSON text into a single geometry
///
/// Accepts a FeatureCollection (its first feature is used), a Feature, or a
/// bare geometry. Rows written with single-quoted keys are accepted too.
pub fn parse_project_geometry(text: &str) -> Result<Geometry> {
    let geojson = match text.parse::<GeoJson>() {
        Ok(geojson) => geojson,
        Err(first_error) => text.replace('\'', "\"").parse::<GeoJson>().map_err(|_| {
            BioscoreError::InvalidGeometry { reason: format!("not GeoJSON: {}", first_error) }
        })?,
    };

    let geometry = match geojson {
        GeoJson::FeatureCollection(collection) => {
            collection.features.into_iter().next().and_then(|feature| feature.geometry)
        }
        GeoJson::Feature(feature) => feature.geometry,
        GeoJson::Geometry(geometry) => Some(geometry),
    };

    geometry.ok_or_else(|| BioscoreError::InvalidGeometry {
        reason: "no geometry in stored GeoJSON".to_string(),
    })
}

/// Exterior ring of a Polygon, or of the first polygon of a MultiPolygon
pub fn exterior_ring(geometry: &Geometry) -> Result<ExteriorRing> {
    let ring = match &geometry.value {
        Value::Polygon(rings) => rings.first(),
        Value::MultiPolygon(polygons) => polygons.first().and_then(|rings| rings.first()),
        other => {
            return Err(BioscoreError::InvalidGeometry {
                reason: format!("expected a polygon, got {}", value_kind(other)),
            })
        }
    };

    let ring = ring.ok_or_else(|| BioscoreError::InvalidGeometry {
        reason: "polygon has no exterior ring".to_string(),
    })?;

    let mut longitudes = Vec::with_capacity(ring.len());
    let mut latitudes = Vec::with_capacity(ring.len());
    for position in ring {
        match position.as_slice() {
            [lon, lat, ..] => {
                longitudes.push(*lon);
                latitudes.push(*lat);
            }
            _ => {
                return Err(BioscoreError::InvalidGeometry {
                    reason: format!("position {:?} has fewer than two coordinates", position),
                })
            }
        }
    }

    Ok(ExteriorRing { longitudes, latitudes })
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}
