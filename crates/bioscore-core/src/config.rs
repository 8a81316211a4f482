use crate::error::{BioscoreError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_INDICES_FILE: &str = "indices.toml";
pub const DEFAULT_ROI_RADIUS_M: f64 = 20_000.0;
pub const DEFAULT_REDUCTION_SCALE: f64 = 200.0;
pub const DEFAULT_COMPOSITE_PERCENTILE: u32 = 75;
pub const DEFAULT_CLOUD_SCORE_RANGE: u32 = 5;
pub const DEFAULT_EARTHENGINE_URL: &str = "https://earthengine.googleapis.com/v1";

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered configuration for bioscore
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub indices_file: ConfigValue<PathBuf>,
    pub roi_radius_m: ConfigValue<f64>,
    pub reduction_scale: ConfigValue<f64>,
    pub composite_percentile: ConfigValue<u32>,
    pub cloud_score_range: ConfigValue<u32>,
    pub max_concurrent_requests: ConfigValue<usize>,
    pub earthengine_url: ConfigValue<String>,
    pub earthengine_project: ConfigValue<Option<String>>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            indices_file: ConfigValue::new(
                PathBuf::from(DEFAULT_INDICES_FILE),
                ConfigSource::Default,
            ),
            roi_radius_m: ConfigValue::new(DEFAULT_ROI_RADIUS_M, ConfigSource::Default),
            reduction_scale: ConfigValue::new(DEFAULT_REDUCTION_SCALE, ConfigSource::Default),
            composite_percentile: ConfigValue::new(
                DEFAULT_COMPOSITE_PERCENTILE,
                ConfigSource::Default,
            ),
            cloud_score_range: ConfigValue::new(DEFAULT_CLOUD_SCORE_RANGE, ConfigSource::Default),
            max_concurrent_requests: ConfigValue::new(1, ConfigSource::Default),
            earthengine_url: ConfigValue::new(
                DEFAULT_EARTHENGINE_URL.to_string(),
                ConfigSource::Default,
            ),
            earthengine_project: ConfigValue::new(None, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| BioscoreError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| BioscoreError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(indices_file) = file_config.indices_file {
            self.indices_file.update(indices_file, ConfigSource::File);
        }

        if let Some(radius) = file_config.roi_radius_m {
            self.roi_radius_m.update(validate_positive("roi_radius_m", radius)?, ConfigSource::File);
        }

        if let Some(scale) = file_config.reduction_scale {
            self.reduction_scale
                .update(validate_positive("reduction_scale", scale)?, ConfigSource::File);
        }

        if let Some(percentile) = file_config.composite_percentile {
            self.composite_percentile
                .update(validate_percentile(percentile)?, ConfigSource::File);
        }

        if let Some(range) = file_config.cloud_score_range {
            self.cloud_score_range.update(range, ConfigSource::File);
        }

        if let Some(limit) = file_config.max_concurrent_requests {
            self.max_concurrent_requests
                .update(validate_concurrency(limit)?, ConfigSource::File);
        }

        if let Some(url) = file_config.earthengine_url {
            self.earthengine_url.update(url, ConfigSource::File);
        }

        if let Some(project) = file_config.earthengine_project {
            self.earthengine_project.update(Some(project), ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // BIOSCORE_INDICES_FILE
        if let Ok(path) = env::var("BIOSCORE_INDICES_FILE") {
            self.indices_file.update(PathBuf::from(path), ConfigSource::Environment);
        }

        // BIOSCORE_ROI_RADIUS_M
        if let Some(radius) = env_number::<f64>("BIOSCORE_ROI_RADIUS_M") {
            match validate_positive("roi_radius_m", radius) {
                Ok(radius) => self.roi_radius_m.update(radius, ConfigSource::Environment),
                Err(e) => tracing::warn!("Ignoring BIOSCORE_ROI_RADIUS_M: {}", e),
            }
        }

        // BIOSCORE_REDUCTION_SCALE
        if let Some(scale) = env_number::<f64>("BIOSCORE_REDUCTION_SCALE") {
            match validate_positive("reduction_scale", scale) {
                Ok(scale) => self.reduction_scale.update(scale, ConfigSource::Environment),
                Err(e) => tracing::warn!("Ignoring BIOSCORE_REDUCTION_SCALE: {}", e),
            }
        }

        // BIOSCORE_COMPOSITE_PERCENTILE
        if let Some(percentile) = env_number::<u32>("BIOSCORE_COMPOSITE_PERCENTILE") {
            match validate_percentile(percentile) {
                Ok(p) => self.composite_percentile.update(p, ConfigSource::Environment),
                Err(e) => tracing::warn!("Ignoring BIOSCORE_COMPOSITE_PERCENTILE: {}", e),
            }
        }

        // BIOSCORE_CLOUD_SCORE_RANGE
        if let Some(range) = env_number::<u32>("BIOSCORE_CLOUD_SCORE_RANGE") {
            self.cloud_score_range.update(range, ConfigSource::Environment);
        }

        // BIOSCORE_MAX_CONCURRENT_REQUESTS
        if let Some(limit) = env_number::<usize>("BIOSCORE_MAX_CONCURRENT_REQUESTS") {
            match validate_concurrency(limit) {
                Ok(limit) => self.max_concurrent_requests.update(limit, ConfigSource::Environment),
                Err(e) => tracing::warn!("Ignoring BIOSCORE_MAX_CONCURRENT_REQUESTS: {}", e),
            }
        }

        // BIOSCORE_EARTHENGINE_URL
        if let Ok(url) = env::var("BIOSCORE_EARTHENGINE_URL") {
            self.earthengine_url.update(url, ConfigSource::Environment);
        }

        // BIOSCORE_EARTHENGINE_PROJECT
        if let Ok(project) = env::var("BIOSCORE_EARTHENGINE_PROJECT") {
            self.earthengine_project.update(Some(project), ConfigSource::Environment);
        }

        self
    }

    /// Update configuration from CLI arguments
    ///
    /// Overrides go through the same validation as the file and environment
    /// layers.
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) -> Result<()> {
        if let Some(indices_file) = overrides.indices_file {
            self.indices_file.update(indices_file, ConfigSource::Cli);
        }

        if let Some(radius) = overrides.roi_radius_m {
            let radius = validate_positive("roi_radius_m", radius)?;
            self.roi_radius_m.update(radius, ConfigSource::Cli);
        }

        if let Some(scale) = overrides.reduction_scale {
            let scale = validate_positive("reduction_scale", scale)?;
            self.reduction_scale.update(scale, ConfigSource::Cli);
        }

        if let Some(limit) = overrides.max_concurrent_requests {
            let limit = validate_concurrency(limit)?;
            self.max_concurrent_requests.update(limit, ConfigSource::Cli);
        }

        if let Some(project) = overrides.earthengine_project {
            self.earthengine_project.update(Some(project), ConfigSource::Cli);
        }

        Ok(())
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert(
            "indices_file".to_string(),
            (self.indices_file.value.display().to_string(), self.indices_file.source),
        );

        map.insert(
            "roi_radius_m".to_string(),
            (self.roi_radius_m.value.to_string(), self.roi_radius_m.source),
        );

        map.insert(
            "reduction_scale".to_string(),
            (self.reduction_scale.value.to_string(), self.reduction_scale.source),
        );

        map.insert(
            "composite_percentile".to_string(),
            (self.composite_percentile.value.to_string(), self.composite_percentile.source),
        );

        map.insert(
            "cloud_score_range".to_string(),
            (self.cloud_score_range.value.to_string(), self.cloud_score_range.source),
        );

        map.insert(
            "max_concurrent_requests".to_string(),
            (self.max_concurrent_requests.value.to_string(), self.max_concurrent_requests.source),
        );

        map.insert(
            "earthengine_url".to_string(),
            (self.earthengine_url.value.clone(), self.earthengine_url.source),
        );

        map.insert(
            "earthengine_project".to_string(),
            (
                self.earthengine_project.value.clone().unwrap_or_else(|| "(from credentials)".into()),
                self.earthengine_project.source,
            ),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    indices_file: Option<PathBuf>,
    roi_radius_m: Option<f64>,
    reduction_scale: Option<f64>,
    composite_percentile: Option<u32>,
    cloud_score_range: Option<u32>,
    max_concurrent_requests: Option<usize>,
    earthengine_url: Option<String>,
    earthengine_project: Option<String>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub indices_file: Option<PathBuf>,
    pub roi_radius_m: Option<f64>,
    pub reduction_scale: Option<f64>,
    pub max_concurrent_requests: Option<usize>,
    pub earthengine_project: Option<String>,
}

fn env_number<T: FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Invalid {} value '{}': expected a number", key, raw);
            None
        }
    }
}

fn validate_positive(key: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(BioscoreError::ConfigInvalid {
            key: key.to_string(),
            reason: format!("must be a positive number, got {}", value),
        })
    }
}

fn validate_percentile(value: u32) -> Result<u32> {
    if value <= 100 {
        Ok(value)
    } else {
        Err(BioscoreError::ConfigInvalid {
            key: "composite_percentile".to_string(),
            reason: format!("must be within 0..=100, got {}", value),
        })
    }
}

fn validate_concurrency(value: usize) -> Result<usize> {
    if value > 0 {
        Ok(value)
    } else {
        Err(BioscoreError::ConfigInvalid {
            key: "max_concurrent_requests".to_string(),
            reason: "must be at least 1".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = LayeredConfig::with_defaults();
        assert_eq!(config.indices_file.value, PathBuf::from("indices.toml"));
        assert_eq!(config.roi_radius_m.value, 20_000.0);
        assert_eq!(config.reduction_scale.value, 200.0);
        assert_eq!(config.composite_percentile.value, 75);
        assert_eq!(config.cloud_score_range.value, 5);
        assert_eq!(config.max_concurrent_requests.value, 1);
        assert_eq!(config.roi_radius_m.source, ConfigSource::Default);
        assert!(config.earthengine_project.value.is_none());
    }

    #[test]
    fn test_config_precedence() {
        let mut value = ConfigValue::new(100, ConfigSource::Default);

        // File should override default
        value.update(200, ConfigSource::File);
        assert_eq!(value.value, 200);
        assert_eq!(value.source, ConfigSource::File);

        // Environment should override file
        value.update(300, ConfigSource::Environment);
        assert_eq!(value.value, 300);
        assert_eq!(value.source, ConfigSource::Environment);

        // CLI should override environment
        value.update(400, ConfigSource::Cli);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);

        // Lower precedence should not override
        value.update(500, ConfigSource::File);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
indices_file = "config/indices.yaml"
roi_radius_m = 5000.0
reduction_scale = 30.0
composite_percentile = 50
earthengine_project = "ee-biodiversity"
"#
        )
        .unwrap();

        let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

        assert_eq!(config.indices_file.value, PathBuf::from("config/indices.yaml"));
        assert_eq!(config.indices_file.source, ConfigSource::File);
        assert_eq!(config.roi_radius_m.value, 5000.0);
        assert_eq!(config.reduction_scale.value, 30.0);
        assert_eq!(config.composite_percentile.value, 50);
        assert_eq!(config.cloud_score_range.source, ConfigSource::Default);
        assert_eq!(config.earthengine_project.value.as_deref(), Some("ee-biodiversity"));
    }

    #[test]
    fn test_file_rejects_invalid_values() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "roi_radius_m = -1.0").unwrap();
        assert!(LayeredConfig::with_defaults().load_from_file(file.path()).is_err());

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "composite_percentile = 101").unwrap();
        assert!(LayeredConfig::with_defaults().load_from_file(file.path()).is_err());
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = LayeredConfig::with_defaults();

        let overrides = CliConfigOverrides {
            roi_radius_m: Some(1000.0),
            max_concurrent_requests: Some(4),
            ..Default::default()
        };

        config.update_from_cli(overrides).unwrap();

        assert_eq!(config.roi_radius_m.value, 1000.0);
        assert_eq!(config.roi_radius_m.source, ConfigSource::Cli);
        assert_eq!(config.max_concurrent_requests.value, 4);
        assert_eq!(config.indices_file.source, ConfigSource::Default);
    }

    #[test]
    fn test_cli_rejects_invalid_values() {
        let mut config = LayeredConfig::with_defaults();
        let result = config.update_from_cli(CliConfigOverrides {
            reduction_scale: Some(-5.0),
            ..Default::default()
        });
        assert!(matches!(result, Err(BioscoreError::ConfigInvalid { ref key, .. }) if key == "reduction_scale"));
        assert_eq!(config.reduction_scale.value, 200.0);
        assert_eq!(config.reduction_scale.source, ConfigSource::Default);

        let result = config.update_from_cli(CliConfigOverrides {
            roi_radius_m: Some(f64::NAN),
            ..Default::default()
        });
        assert!(result.is_err());
        assert_eq!(config.roi_radius_m.value, 20_000.0);

        let result = config.update_from_cli(CliConfigOverrides {
            max_concurrent_requests: Some(0),
            ..Default::default()
        });
        assert!(result.is_err());
        assert_eq!(config.max_concurrent_requests.value, 1);
    }

    #[test]
    fn test_inspection_map() {
        let config = LayeredConfig::with_defaults();
        let map = config.to_inspection_map();

        assert!(map.contains_key("indices_file"));
        assert!(map.contains_key("earthengine_url"));

        let (scale, source) = &map["reduction_scale"];
        assert_eq!(scale, "200");
        assert_eq!(*source, ConfigSource::Default);
    }
}
