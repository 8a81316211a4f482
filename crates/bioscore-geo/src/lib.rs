//! bioscore Geo - Viewport fitting and project geometry helpers

pub mod ring;
pub mod viewport;

pub use ring::{exterior_ring, parse_project_geometry, ExteriorRing};
pub use viewport::{fit_viewport, interpolate, zoom_areas, ZOOM_LEVELS};
