use serde::{Deserialize, Serialize};

/// Map framing derived from a coordinate extent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportConfig {
    pub zoom: f64,
    /// Center as (longitude, latitude)
    pub center: (f64, f64),
}

impl ViewportConfig {
    pub fn new(zoom: f64, center: (f64, f64)) -> Self {
        Self { zoom, center }
    }

    pub fn lon(&self) -> f64 {
        self.center.0
    }

    pub fn lat(&self) -> f64 {
        self.center.1
    }
}

impl Default for ViewportConfig {
    /// Zoom 0 over the coordinate origin
    fn default() -> Self {
        Self { zoom: 0.0, center: (0.0, 0.0) }
    }
}
