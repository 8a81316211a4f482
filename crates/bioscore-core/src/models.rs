//! Domain models

pub mod index;
pub mod region;
pub mod score;
pub mod viewport;

pub use index::{BandSelection, GeeType, IndexDefinition};
pub use region::{Centroid, RegionOfInterest};
pub use score::{MetricValue, ScoreRecord, ScoreTable};
pub use viewport::ViewportConfig;
