//! bioscore Earth Engine - Remote platform port and REST adapter
//!
//! This crate defines the port through which index images are evaluated,
//! the lazy expression builders used to describe them, and the
//! service-account authenticated REST client.

pub mod auth;
pub mod client;
pub mod expr;
pub mod objects;
pub mod ports;

// Re-export main types
pub use auth::{ServiceAccountCredentials, SERVICE_ACCOUNT_ENV};
pub use client::EarthEngineClient;
pub use expr::Expr;
pub use objects::{FeatureCollection, Filter, Geometry, Image, ImageCollection, Reducer};
pub use ports::{EarthEngine, LayerCollector, MapLayer, MapSink};
