//! Index definitions as declared in the index catalog

use serde::{Deserialize, Serialize};
use std::fmt;

/// Band pair used by `algebraic` indices when the definition names none
pub const DEFAULT_NORMALIZED_BANDS: [&str; 2] = ["B4", "B3"];

/// Kind of remote dataset an index is built from
///
/// Unknown tags are kept as `Unrecognized` so the catalog can report them
/// and generation can reject them explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GeeType {
    Image,
    ImageCollection,
    FeatureCollection,
    Algebraic,
    Unrecognized(String),
}

impl GeeType {
    pub fn as_str(&self) -> &str {
        match self {
            GeeType::Image => "image",
            GeeType::ImageCollection => "image_collection",
            GeeType::FeatureCollection => "feature_collection",
            GeeType::Algebraic => "algebraic",
            GeeType::Unrecognized(tag) => tag,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, GeeType::Unrecognized(_))
    }
}

impl From<String> for GeeType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "image" => GeeType::Image,
            "image_collection" => GeeType::ImageCollection,
            "feature_collection" => GeeType::FeatureCollection,
            "algebraic" => GeeType::Algebraic,
            _ => GeeType::Unrecognized(tag),
        }
    }
}

impl From<GeeType> for String {
    fn from(gee_type: GeeType) -> Self {
        gee_type.as_str().to_string()
    }
}

impl fmt::Display for GeeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Band or attribute selector: a single name or a list of band names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BandSelection {
    One(String),
    Many(Vec<String>),
}

impl BandSelection {
    pub fn names(&self) -> Vec<String> {
        match self {
            BandSelection::One(name) => vec![name.clone()],
            BandSelection::Many(names) => names.clone(),
        }
    }

    /// The single attribute name, if this selection names exactly one
    pub fn single(&self) -> Option<&str> {
        match self {
            BandSelection::One(name) => Some(name),
            BandSelection::Many(names) if names.len() == 1 => Some(&names[0]),
            BandSelection::Many(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            BandSelection::One(name) => name.is_empty(),
            BandSelection::Many(names) => names.is_empty(),
        }
    }
}

/// One named index recipe from the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDefinition {
    pub name: String,
    pub gee_type: GeeType,
    pub gee_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select: Option<BandSelection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bandname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viz: Option<serde_json::Value>,
    #[serde(default)]
    pub show: bool,
    /// Band pair for `algebraic` normalized differences
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bands: Option<[String; 2]>,
}

impl IndexDefinition {
    pub fn new(name: impl Into<String>, gee_type: GeeType, gee_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            gee_type,
            gee_path: gee_path.into(),
            select: None,
            bandname: None,
            viz: None,
            show: false,
            bands: None,
        }
    }

    pub fn with_select(mut self, select: BandSelection) -> Self {
        self.select = Some(select);
        self
    }

    pub fn with_bandname(mut self, bandname: impl Into<String>) -> Self {
        self.bandname = Some(bandname.into());
        self
    }

    pub fn with_viz(mut self, viz: serde_json::Value) -> Self {
        self.viz = Some(viz);
        self.show = true;
        self
    }

    /// Bands fed to the normalized difference of an `algebraic` index
    pub fn normalized_bands(&self) -> [String; 2] {
        self.bands.clone().unwrap_or_else(|| DEFAULT_NORMALIZED_BANDS.map(String::from))
    }
}
