//! Index catalog: named index recipes loaded from a TOML or YAML document

use crate::error::{BioscoreError, Result};
use crate::models::{GeeType, IndexDefinition};
use serde::de::{self, Deserialize, Deserializer, MapAccess, Visitor};
use std::fmt;
use std::fs;
use std::path::Path;

/// A problem found while validating catalog entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogIssue {
    pub key: String,
    pub reason: String,
}

impl fmt::Display for CatalogIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "index '{}': {}", self.key, self.reason)
    }
}

/// Ordered mapping of index keys to definitions
///
/// Entries keep document order, which fixes the metric order of score rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexCatalog {
    entries: Vec<(String, IndexDefinition)>,
}

impl IndexCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a catalog from entries; later duplicates replace earlier ones
    pub fn from_entries(entries: impl IntoIterator<Item = (String, IndexDefinition)>) -> Self {
        let mut catalog = Self::empty();
        for (key, definition) in entries {
            match catalog.entries.iter_mut().find(|(k, _)| *k == key) {
                Some(slot) => slot.1 = definition,
                None => catalog.entries.push((key, definition)),
            }
        }
        catalog
    }

    /// Load the catalog, degrading to an empty catalog on failure
    ///
    /// Read and parse errors are logged; index lookups on the resulting
    /// catalog fail with `IndexNotFound`.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        match Self::try_load(path) {
            Ok(catalog) => catalog,
            Err(e) => {
                tracing::error!("{}", e);
                Self::empty()
            }
        }
    }

    /// Load the catalog, surfacing read and parse errors
    pub fn try_load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let parse_error = |reason: String| BioscoreError::ConfigParse {
            path: path.to_path_buf(),
            reason,
        };

        let content = fs::read_to_string(path).map_err(|e| parse_error(e.to_string()))?;

        let is_yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml") | Some("yml")
        );
        let catalog = if is_yaml {
            Self::from_yaml_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
        .map_err(|e| match e {
            BioscoreError::Serialization(reason) => parse_error(reason),
            other => other,
        })?;

        for issue in catalog.validate() {
            tracing::warn!("{}", issue);
        }
        tracing::info!(path = %path.display(), indices = catalog.len(), "Loaded index catalog");

        Ok(catalog)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let document: CatalogDocument =
            toml::from_str(content).map_err(|e| BioscoreError::Serialization(e.to_string()))?;
        Ok(Self { entries: document.0 })
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::empty());
        }
        let document: CatalogDocument = serde_yaml::from_str(content)
            .map_err(|e| BioscoreError::Serialization(e.to_string()))?;
        Ok(Self { entries: document.0 })
    }

    /// Look up an index definition by key
    pub fn get(&self, key: &str) -> Result<&IndexDefinition> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, definition)| definition)
            .ok_or_else(|| BioscoreError::IndexNotFound { key: key.to_string() })
    }

    /// Index keys in document order
    pub fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndexDefinition)> {
        self.entries.iter().map(|(k, d)| (k.as_str(), d))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Report entries that cannot generate a dataset as declared
    pub fn validate(&self) -> Vec<CatalogIssue> {
        let mut issues = Vec::new();
        for (key, definition) in &self.entries {
            let mut issue = |reason: String| {
                issues.push(CatalogIssue { key: key.clone(), reason });
            };

            if let GeeType::Unrecognized(tag) = &definition.gee_type {
                issue(format!("unrecognized gee_type '{}'", tag));
            }
            if definition.gee_path.trim().is_empty() {
                issue("gee_path is empty".to_string());
            }
            if definition.gee_type == GeeType::FeatureCollection
                && definition.select.as_ref().and_then(|s| s.single()).is_none()
            {
                issue("feature_collection requires a single select attribute".to_string());
            }
            if definition.show && definition.viz.is_none() {
                issue("show is set but no viz parameters are given".to_string());
            }
        }
        issues
    }
}

/// Top-level catalog document, read as an ordered map
struct CatalogDocument(Vec<(String, IndexDefinition)>);

impl<'de> Deserialize<'de> for CatalogDocument {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = CatalogDocument;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of index keys to index definitions")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries: Vec<(String, IndexDefinition)> = Vec::new();
                while let Some((key, definition)) = map.next_entry::<String, IndexDefinition>()? {
                    if entries.iter().any(|(k, _)| *k == key) {
                        return Err(de::Error::custom(format!("duplicate index key '{}'", key)));
                    }
                    entries.push((key, definition));
                }
                Ok(CatalogDocument(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"
[ndvi]
name = "NDVI"
gee_type = "algebraic"
gee_path = "LANDSAT/LC08/C02/T1"

[mangrove]
name = "Global mangrove watch"
gee_type = "image_collection"
gee_path = "projects/earthengine-legacy/assets/projects/sat-io/open-datasets/GMW/extent/gmw_v3"
bandname = "b1"

[wdpa]
name = "Protected areas"
gee_type = "feature_collection"
gee_path = "WCMC/WDPA/current/polygons"
select = "REP_AREA"
show = true
viz = { min = 0, max = 1000, palette = ["white", "green"] }
"#;

    #[test]
    fn test_toml_keeps_document_order() {
        let catalog = IndexCatalog::from_toml_str(CATALOG).unwrap();
        assert_eq!(catalog.keys(), vec!["ndvi", "mangrove", "wdpa"]);
        assert_eq!(catalog.get("mangrove").unwrap().bandname.as_deref(), Some("b1"));
        assert!(catalog.get("wdpa").unwrap().show);
        assert!(catalog.validate().is_empty());
    }

    #[test]
    fn test_missing_key() {
        let catalog = IndexCatalog::from_toml_str(CATALOG).unwrap();
        match catalog.get("forest") {
            Err(BioscoreError::IndexNotFound { key }) => assert_eq!(key, "forest"),
            other => panic!("Expected IndexNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_yaml_document() {
        let yaml = r#"
water:
  name: Surface water
  gee_type: image
  gee_path: JRC/GSW1_4/GlobalSurfaceWater
  select: occurrence
forest:
  name: Forest
  gee_type: raster_stack
  gee_path: ""
"#;
        let catalog = IndexCatalog::from_yaml_str(yaml).unwrap();
        assert_eq!(catalog.keys(), vec!["water", "forest"]);

        let issues = catalog.validate();
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| i.key == "forest"));
        assert!(issues[0].reason.contains("raster_stack"));
    }

    #[test]
    fn test_duplicate_yaml_keys_rejected() {
        let yaml = "a:\n  name: A\n  gee_type: image\n  gee_path: x\na:\n  name: B\n  gee_type: image\n  gee_path: y\n";
        assert!(IndexCatalog::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_from_entries_replaces_duplicates() {
        let a = IndexDefinition::new("A", GeeType::Image, "x");
        let b = IndexDefinition::new("B", GeeType::Image, "y");
        let catalog = IndexCatalog::from_entries([
            ("k".to_string(), a),
            ("j".to_string(), b.clone()),
            ("k".to_string(), b.clone()),
        ]);
        assert_eq!(catalog.keys(), vec!["k", "j"]);
        assert_eq!(catalog.get("k").unwrap(), &b);
    }

    #[test]
    fn test_feature_collection_without_select_is_flagged() {
        let catalog = IndexCatalog::from_entries([(
            "wdpa".to_string(),
            IndexDefinition::new("WDPA", GeeType::FeatureCollection, "WCMC/WDPA/current/polygons"),
        )]);
        let issues = catalog.validate();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].to_string().contains("select"));
    }
}
