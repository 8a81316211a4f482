//! Project map figures in the plotly mapbox layout

use bioscore_core::error::{BioscoreError, Result};
use bioscore_core::models::ViewportConfig;
use bioscore_geo::{exterior_ring, fit_viewport, parse_project_geometry};
use bioscore_store::ports::ScoreWarehouse;
use serde::{Deserialize, Serialize};
use serde_json::json;

const MAP_STYLE: &str = "stamen-terrain";
const MARKER_SIZE: u32 = 20;
const MARKER_COLOR: &str = "cyan";
const FILL_COLOR: &str = "royalblue";

/// Serializable map figure: one center marker and the project boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapFigure {
    pub data: Vec<MarkerTrace>,
    pub layout: MapLayout,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerTrace {
    #[serde(rename = "type")]
    pub trace_type: String,
    pub mode: String,
    pub lon: Vec<f64>,
    pub lat: Vec<f64>,
    pub marker: Marker,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub size: u32,
    pub color: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapLayout {
    pub mapbox: Mapbox,
    pub margin: Margin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mapbox {
    pub style: String,
    pub center: LonLat,
    pub zoom: f64,
    pub layers: Vec<MapboxLayer>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

/// Filled polygon layer drawn beneath the traces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapboxLayer {
    /// GeoJSON FeatureCollection
    pub source: serde_json::Value,
    #[serde(rename = "type")]
    pub layer_type: String,
    pub below: String,
    pub color: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub l: u32,
    pub r: u32,
    pub b: u32,
    pub t: u32,
}

impl MapFigure {
    /// Figure framing `geometry` with the given viewport
    pub fn for_geometry(geometry: &geojson::Geometry, viewport: ViewportConfig) -> Result<Self> {
        let geometry = serde_json::to_value(geometry)
            .map_err(|e| BioscoreError::Serialization(format!("Failed to encode geometry: {}", e)))?;

        let center = LonLat { lon: viewport.lon(), lat: viewport.lat() };

        Ok(Self {
            data: vec![MarkerTrace {
                trace_type: "scattermapbox".to_string(),
                mode: "markers".to_string(),
                lon: vec![center.lon],
                lat: vec![center.lat],
                marker: Marker { size: MARKER_SIZE, color: vec![MARKER_COLOR.to_string()] },
            }],
            layout: MapLayout {
                mapbox: Mapbox {
                    style: MAP_STYLE.to_string(),
                    center,
                    zoom: viewport.zoom,
                    layers: vec![MapboxLayer {
                        source: json!({
                            "type": "FeatureCollection",
                            "features": [{"type": "Feature", "geometry": geometry}],
                        }),
                        layer_type: "fill".to_string(),
                        below: "traces".to_string(),
                        color: FILL_COLOR.to_string(),
                    }],
                },
                margin: Margin::default(),
            },
        })
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| BioscoreError::Serialization(format!("Failed to encode figure: {}", e)))
    }
}

/// Renders the stored boundary of a project
pub struct ProjectMapRenderer<W: ScoreWarehouse> {
    warehouse: W,
}

impl<W: ScoreWarehouse> ProjectMapRenderer<W> {
    pub fn new(warehouse: W) -> Self {
        Self { warehouse }
    }

    pub async fn render(&self, project_name: &str) -> Result<MapFigure> {
        let stored = self
            .warehouse
            .project_geometry(project_name)
            .await?
            .ok_or_else(|| BioscoreError::ProjectNotFound { name: project_name.to_string() })?;

        let geometry = parse_project_geometry(&stored)?;
        let ring = exterior_ring(&geometry)?;
        let viewport = fit_viewport(Some(ring.longitudes.as_slice()), Some(ring.latitudes.as_slice()));

        tracing::debug!(project = project_name, zoom = viewport.zoom, "Fitted project viewport");
        MapFigure::for_geometry(&geometry, viewport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_figure_shape() {
        let geometry = geojson::Geometry::new(geojson::Value::Polygon(vec![vec![
            vec![0.0, 0.0],
            vec![0.01, 0.0],
            vec![0.01, 0.01],
            vec![0.0, 0.0],
        ]]));
        let figure = MapFigure::for_geometry(&geometry, ViewportConfig::new(13.5, (0.005, 0.0025)))
            .unwrap();

        let value = serde_json::to_value(&figure).unwrap();
        assert_eq!(value["data"][0]["type"], "scattermapbox");
        assert_eq!(value["data"][0]["marker"]["size"], 20);
        assert_eq!(value["data"][0]["marker"]["color"][0], "cyan");
        assert_eq!(value["layout"]["mapbox"]["style"], "stamen-terrain");
        assert_eq!(value["layout"]["mapbox"]["center"]["lon"], 0.005);
        assert_eq!(value["layout"]["mapbox"]["zoom"], 13.5);
        assert_eq!(value["layout"]["mapbox"]["layers"][0]["type"], "fill");
        assert_eq!(value["layout"]["mapbox"]["layers"][0]["below"], "traces");
        assert_eq!(value["layout"]["mapbox"]["layers"][0]["color"], "royalblue");
        assert_eq!(
            value["layout"]["mapbox"]["layers"][0]["source"]["features"][0]["geometry"]["type"],
            "Polygon"
        );
        assert_eq!(value["layout"]["margin"], json!({"l": 0, "r": 0, "b": 0, "t": 0}));
    }
}
