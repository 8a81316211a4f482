//! Typed builders over [`Expr`] for the server-side objects bioscore uses

use crate::expr::Expr;
use chrono::NaiveDate;
use serde_json::json;

/// Argument name given to the per-image function of `Collection.map`
const MAPPING_VAR: &str = "_MAPPING_VAR_0_0";

/// Server-side geometry
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry(Expr);

impl Geometry {
    pub fn point(lon: f64, lat: f64) -> Self {
        Self(Expr::call(
            "GeometryConstructors.Point",
            [("coordinates", Expr::constant(json!([lon, lat])))],
        ))
    }

    /// Disc of `distance_m` meters around this geometry
    pub fn buffer(&self, distance_m: f64) -> Self {
        Self(Expr::call(
            "Geometry.buffer",
            [("geometry", self.0.clone()), ("distance", Expr::constant(distance_m))],
        ))
    }

    /// Area in square meters, as a number expression
    pub fn area(&self) -> Expr {
        Expr::call("Geometry.area", [("geometry", self.0.clone())])
    }

    pub fn expr(&self) -> &Expr {
        &self.0
    }
}

/// Server-side filter
#[derive(Debug, Clone, PartialEq)]
pub struct Filter(Expr);

impl Filter {
    /// Elements whose footprint intersects `geometry`
    pub fn bounds(geometry: &Geometry) -> Self {
        Self(Expr::call(
            "Filter.intersects",
            [("leftField", Expr::constant(".all")), ("rightValue", geometry.expr().clone())],
        ))
    }

    /// Elements acquired between `start` and `end`
    pub fn date(start: NaiveDate, end: NaiveDate) -> Self {
        let date = |d: NaiveDate| {
            Expr::call("Date", [("value", Expr::constant(d.format("%Y-%m-%d").to_string()))])
        };
        let range = Expr::call("DateRange", [("start", date(start)), ("end", date(end))]);
        Self(Expr::call(
            "Filter.dateRangeContains",
            [("leftValue", range), ("rightField", Expr::constant("system:time_start"))],
        ))
    }

    pub fn expr(&self) -> &Expr {
        &self.0
    }
}

/// Server-side reducer
#[derive(Debug, Clone, PartialEq)]
pub struct Reducer(Expr);

impl Reducer {
    pub fn mean() -> Self {
        Self(Expr::call("Reducer.mean", Vec::<(&str, Expr)>::new()))
    }

    pub fn expr(&self) -> &Expr {
        &self.0
    }
}

/// Server-side image
#[derive(Debug, Clone, PartialEq)]
pub struct Image(Expr);

impl Image {
    pub fn from_expr(expr: Expr) -> Self {
        Self(expr)
    }

    pub fn load(id: &str) -> Self {
        Self(Expr::call("Image.load", [("id", Expr::constant(id))]))
    }

    pub fn constant(value: f64) -> Self {
        Self(Expr::call("Image.constant", [("value", Expr::constant(value))]))
    }

    /// Fully masked single-band image, the starting canvas for `paint`
    pub fn blank() -> Self {
        Self(Expr::call(
            "Image.mask",
            [
                ("image", Image::constant(0.0).into_expr()),
                ("mask", Image::constant(0.0).into_expr()),
            ],
        ))
    }

    pub fn to_float(&self) -> Self {
        Self(Expr::call("Image.toFloat", [("value", self.0.clone())]))
    }

    pub fn clip(&self, geometry: &Geometry) -> Self {
        Self(Expr::call(
            "Image.clip",
            [("input", self.0.clone()), ("geometry", geometry.expr().clone())],
        ))
    }

    pub fn select(&self, bands: &[String]) -> Self {
        Self(Expr::call(
            "Image.select",
            [("input", self.0.clone()), ("bandSelectors", Expr::constant(json!(bands)))],
        ))
    }

    /// Burn the value of `attribute` from each feature into the image
    pub fn paint(&self, features: &FeatureCollection, attribute: &str) -> Self {
        Self(Expr::call(
            "Image.paint",
            [
                ("image", self.0.clone()),
                ("featureCollection", features.expr().clone()),
                ("color", Expr::constant(attribute)),
            ],
        ))
    }

    /// `(first - second) / (first + second)`
    pub fn normalized_difference(&self, bands: &[String; 2]) -> Self {
        Self(Expr::call(
            "Image.normalizedDifference",
            [("input", self.0.clone()), ("bandNames", Expr::constant(json!(bands)))],
        ))
    }

    /// Band → value dictionary of `reducer` over `geometry` at `scale` meters
    pub fn reduce_region(&self, reducer: &Reducer, geometry: &Geometry, scale: f64) -> Expr {
        Expr::call(
            "Image.reduceRegion",
            [
                ("image", self.0.clone()),
                ("reducer", reducer.expr().clone()),
                ("geometry", geometry.expr().clone()),
                ("scale", Expr::constant(scale)),
            ],
        )
    }

    pub fn expr(&self) -> &Expr {
        &self.0
    }

    pub fn into_expr(self) -> Expr {
        self.0
    }
}

/// Server-side image collection
#[derive(Debug, Clone, PartialEq)]
pub struct ImageCollection(Expr);

impl ImageCollection {
    pub fn load(id: &str) -> Self {
        Self(Expr::call("ImageCollection.load", [("id", Expr::constant(id))]))
    }

    pub fn filter(&self, filter: &Filter) -> Self {
        Self(Expr::call(
            "Collection.filter",
            [("collection", self.0.clone()), ("filter", filter.expr().clone())],
        ))
    }

    pub fn filter_bounds(&self, geometry: &Geometry) -> Self {
        self.filter(&Filter::bounds(geometry))
    }

    pub fn filter_date(&self, start: NaiveDate, end: NaiveDate) -> Self {
        self.filter(&Filter::date(start, end))
    }

    /// Clip every member image to `geometry`
    pub fn clip_each(&self, geometry: &Geometry) -> Self {
        let body = Image::from_expr(Expr::ArgumentRef(MAPPING_VAR.to_string())).clip(geometry);
        let algorithm = Expr::Function {
            arguments: vec![MAPPING_VAR.to_string()],
            body: Box::new(body.into_expr()),
        };
        Self(Expr::call(
            "Collection.map",
            [("collection", self.0.clone()), ("baseAlgorithm", algorithm)],
        ))
    }

    /// Per-pixel temporal mean of the collection
    pub fn mean(&self) -> Image {
        Image(Expr::call("reduce.mean", [("collection", self.0.clone())]))
    }

    /// Cloud-score filtered Landsat composite
    pub fn simple_composite(&self, percentile: u32, cloud_score_range: u32) -> Image {
        Image(Expr::call(
            "SimpleLandsatComposite",
            [
                ("collection", self.0.clone()),
                ("percentile", Expr::constant(percentile)),
                ("cloudScoreRange", Expr::constant(cloud_score_range)),
            ],
        ))
    }

    pub fn expr(&self) -> &Expr {
        &self.0
    }
}

/// Server-side vector table
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureCollection(Expr);

impl FeatureCollection {
    pub fn load(table_id: &str) -> Self {
        Self(Expr::call("Collection.loadTable", [("tableId", Expr::constant(table_id))]))
    }

    pub fn expr(&self) -> &Expr {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_is_lon_lat() {
        let point = Geometry::point(115.2, -8.6);
        let coordinates = point.expr().argument("coordinates").unwrap().as_constant().unwrap();
        assert_eq!(coordinates, &json!([115.2, -8.6]));
    }

    #[test]
    fn test_date_filter_formats_iso_dates() {
        let start = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2021, 12, 31).unwrap();
        let filter = Filter::date(start, end);

        let encoded = filter.expr().to_expression().to_string();
        assert!(encoded.contains("\"2021-01-01\""));
        assert!(encoded.contains("\"2021-12-31\""));
        assert!(encoded.contains("system:time_start"));
    }

    #[test]
    fn test_clip_each_maps_a_function() {
        let roi = Geometry::point(0.0, 0.0).buffer(100.0);
        let collection = ImageCollection::load("COPERNICUS/S2").clip_each(&roi);

        assert_eq!(collection.expr().function_name(), Some("Collection.map"));
        match collection.expr().argument("baseAlgorithm") {
            Some(Expr::Function { arguments, body }) => {
                assert_eq!(arguments, &vec![MAPPING_VAR.to_string()]);
                assert_eq!(body.function_name(), Some("Image.clip"));
            }
            other => panic!("Expected function definition, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_canvas() {
        let canvas = Image::blank().to_float();
        assert_eq!(canvas.expr().function_name(), Some("Image.toFloat"));
        assert!(canvas.expr().invokes("Image.mask"));
        assert!(canvas.expr().invokes("Image.constant"));
    }
}
