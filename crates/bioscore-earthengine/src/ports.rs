//! Earth Engine port definitions

use crate::expr::Expr;
use crate::objects::Image;
use async_trait::async_trait;
use bioscore_core::error::Result;
use std::sync::{Arc, Mutex};

/// Port for evaluating expressions on the remote platform
#[async_trait]
pub trait EarthEngine: Send + Sync {
    /// Evaluate `expr` remotely and return its JSON value
    async fn compute_value(&self, expr: &Expr) -> Result<serde_json::Value>;
}

#[async_trait]
impl<T: EarthEngine + ?Sized> EarthEngine for Arc<T> {
    async fn compute_value(&self, expr: &Expr) -> Result<serde_json::Value> {
        (**self).compute_value(expr).await
    }
}

/// Port for displaying generated layers on an interactive map
pub trait MapSink: Send + Sync {
    fn add_layer(&self, image: &Image, viz: Option<&serde_json::Value>, name: &str);
}

/// A layer pushed to a [`MapSink`]
#[derive(Debug, Clone, PartialEq)]
pub struct MapLayer {
    pub name: String,
    pub viz: Option<serde_json::Value>,
    pub image: Image,
}

/// Map sink that records layers in order
///
/// Uses `Mutex::lock().unwrap()`; poisoning only follows a panic elsewhere.
#[derive(Debug, Default)]
pub struct LayerCollector {
    layers: Mutex<Vec<MapLayer>>,
}

impl LayerCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layers(&self) -> Vec<MapLayer> {
        self.layers.lock().unwrap().clone()
    }
}

impl MapSink for LayerCollector {
    fn add_layer(&self, image: &Image, viz: Option<&serde_json::Value>, name: &str) {
        self.layers.lock().unwrap().push(MapLayer {
            name: name.to_string(),
            viz: viz.cloned(),
            image: image.clone(),
        });
    }
}
