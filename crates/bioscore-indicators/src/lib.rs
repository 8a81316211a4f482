//! bioscore Indicators - Index generation and score orchestration
//!
//! Builds index images on the remote platform, reduces them to zonal means
//! over the region of interest, assembles yearly score tables, persists them
//! through the warehouse port, and renders project maps.

pub mod generator;
pub mod map;
pub mod score;
pub mod table;

pub use generator::{year_range, GeneratorSettings, IndexGenerator};
pub use map::{MapFigure, ProjectMapRenderer};
pub use score::ScoreCalculator;
