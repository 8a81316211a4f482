#![allow(dead_code)]

use async_trait::async_trait;
use bioscore_core::catalog::IndexCatalog;
use bioscore_core::error::{BioscoreError, Result};
use bioscore_core::models::{Centroid, RegionOfInterest};
use bioscore_earthengine::{EarthEngine, Expr};
use bioscore_indicators::{GeneratorSettings, IndexGenerator};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const ROI_AREA_M2: f64 = 1_254_695_808.5;

pub const CATALOG: &str = r#"
[ndvi]
name = "NDVI"
gee_type = "algebraic"
gee_path = "LANDSAT/LC08/C02/T1"
bandname = "nd"

[ndwi]
name = "NDWI"
gee_type = "algebraic"
gee_path = "LANDSAT/LC08/C02/T1"
bandname = "nd"
bands = ["B3", "B5"]
"#;

/// Earth Engine stand-in answering the three kinds of calls the pipeline makes
#[derive(Default)]
pub struct FakeEngine {
    reductions: AtomicUsize,
    calls: AtomicUsize,
    reduction_requests: Mutex<Vec<Expr>>,
}

impl FakeEngine {
    pub fn reductions(&self) -> usize {
        self.reductions.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every `Image.reduceRegion` expression received, in arrival order
    pub fn reduction_requests(&self) -> Vec<Expr> {
        self.reduction_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl EarthEngine for FakeEngine {
    async fn compute_value(&self, expr: &Expr) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match expr.function_name() {
            Some("Image.reduceRegion") => {
                self.reductions.fetch_add(1, Ordering::SeqCst);
                self.reduction_requests.lock().unwrap().push(expr.clone());
                let image = expr.argument("image").ok_or_else(|| {
                    BioscoreError::RemoteCall("reduceRegion without image".to_string())
                })?;
                if image.invokes("Image.normalizedDifference") {
                    Ok(json!({"nd": 0.42}))
                } else {
                    Ok(json!({"elevation": 312.5, "slope": null}))
                }
            }
            Some("Geometry.area") => Ok(json!(ROI_AREA_M2)),
            Some("Geometry.buffer") => Ok(json!({
                "type": "Polygon",
                "coordinates": [[[115.0, -8.6], [115.4, -8.6], [115.4, -8.2], [115.0, -8.6]]]
            })),
            other => Err(BioscoreError::RemoteCall(format!("unexpected call {:?}", other))),
        }
    }
}

pub fn roi() -> RegionOfInterest {
    RegionOfInterest::new(Centroid::new(-8.409518, 115.188919).unwrap(), 20_000.0).unwrap()
}

pub fn generator(engine: Arc<FakeEngine>) -> IndexGenerator<Arc<FakeEngine>> {
    let catalog = IndexCatalog::from_toml_str(CATALOG).unwrap();
    IndexGenerator::new(engine, catalog, roi(), GeneratorSettings::default())
}
