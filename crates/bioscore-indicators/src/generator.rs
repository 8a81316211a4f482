use bioscore_core::catalog::IndexCatalog;
use bioscore_core::config::{
    LayeredConfig, DEFAULT_CLOUD_SCORE_RANGE, DEFAULT_COMPOSITE_PERCENTILE, DEFAULT_REDUCTION_SCALE,
};
use bioscore_core::error::{BioscoreError, Result};
use bioscore_core::models::{GeeType, IndexDefinition, MetricValue, RegionOfInterest};
use bioscore_earthengine::{
    EarthEngine, FeatureCollection, Geometry, Image, ImageCollection, MapSink, Reducer,
};
use chrono::NaiveDate;
use std::sync::Arc;

/// Tunables of index generation and reduction
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorSettings {
    /// Pixel scale of the zonal mean, in meters
    pub reduction_scale: f64,
    pub composite_percentile: u32,
    pub cloud_score_range: u32,
    /// Zonal means in flight at once while building a row
    pub max_concurrent_requests: usize,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            reduction_scale: DEFAULT_REDUCTION_SCALE,
            composite_percentile: DEFAULT_COMPOSITE_PERCENTILE,
            cloud_score_range: DEFAULT_CLOUD_SCORE_RANGE,
            max_concurrent_requests: 1,
        }
    }
}

impl GeneratorSettings {
    pub fn from_config(config: &LayeredConfig) -> Self {
        Self {
            reduction_scale: config.reduction_scale.value,
            composite_percentile: config.composite_percentile.value,
            cloud_score_range: config.cloud_score_range.value,
            max_concurrent_requests: config.max_concurrent_requests.value.max(1),
        }
    }
}

/// Calendar year as an inclusive `[Jan 1, Dec 31]` date range
pub fn year_range(year: i32) -> Result<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1);
    let end = NaiveDate::from_ymd_opt(year, 12, 31);
    start.zip(end).ok_or_else(|| BioscoreError::ConfigInvalid {
        key: "year".to_string(),
        reason: format!("{} is outside the supported calendar", year),
    })
}

/// Generates index images over a fixed region of interest and reduces them
/// to zonal means
pub struct IndexGenerator<E: EarthEngine> {
    engine: E,
    catalog: IndexCatalog,
    roi: RegionOfInterest,
    region: Geometry,
    settings: GeneratorSettings,
    map: Option<Arc<dyn MapSink>>,
}

impl<E: EarthEngine> IndexGenerator<E> {
    pub fn new(
        engine: E,
        catalog: IndexCatalog,
        roi: RegionOfInterest,
        settings: GeneratorSettings,
    ) -> Self {
        let centroid = roi.centroid();
        let region = Geometry::point(centroid.lon, centroid.lat).buffer(roi.radius_m());

        Self { engine, catalog, roi, region, settings, map: None }
    }

    /// Push generated layers flagged `show` to `sink`
    pub fn with_map(mut self, sink: Arc<dyn MapSink>) -> Self {
        self.map = Some(sink);
        self
    }

    pub fn catalog(&self) -> &IndexCatalog {
        &self.catalog
    }

    pub fn roi(&self) -> &RegionOfInterest {
        &self.roi
    }

    /// Remote buffer geometry of the region of interest
    pub fn region(&self) -> &Geometry {
        &self.region
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    pub(crate) fn engine(&self) -> &E {
        &self.engine
    }

    /// Build the index image described by `definition` for `year`
    pub fn generate(&self, definition: &IndexDefinition, year: i32) -> Result<Image> {
        let (start, end) = year_range(year)?;
        let selection = definition.select.as_ref().filter(|s| !s.is_empty());

        let image = match &definition.gee_type {
            GeeType::Image => {
                let image = Image::load(&definition.gee_path).clip(&self.region);
                match selection {
                    Some(bands) => image.select(&bands.names()),
                    None => image,
                }
            }
            GeeType::ImageCollection => {
                let image = ImageCollection::load(&definition.gee_path)
                    .filter_bounds(&self.region)
                    .clip_each(&self.region)
                    .mean();
                match selection {
                    Some(bands) => image.select(&bands.names()),
                    None => image,
                }
            }
            GeeType::FeatureCollection => {
                let attribute = selection.and_then(|s| s.single()).ok_or_else(|| {
                    BioscoreError::Generation {
                        index: definition.name.clone(),
                        reason: "feature_collection needs a single 'select' attribute to paint"
                            .to_string(),
                    }
                })?;
                Image::blank()
                    .to_float()
                    .paint(&FeatureCollection::load(&definition.gee_path), attribute)
                    .clip(&self.region)
            }
            GeeType::Algebraic => self
                .cloudfree(&definition.gee_path, start, end)
                .normalized_difference(&definition.normalized_bands()),
            GeeType::Unrecognized(tag) => {
                return Err(BioscoreError::Generation {
                    index: definition.name.clone(),
                    reason: format!("unrecognized gee_type '{}'", tag),
                })
            }
        };

        if let Some(map) = &self.map {
            if definition.show {
                map.add_layer(&image, definition.viz.as_ref(), &definition.name);
            }
        }

        tracing::info!("Generated index: {}", definition.name);
        Ok(image)
    }

    /// Cloud-free Landsat composite of `gee_path` between `start` and `end`,
    /// clipped to the region of interest
    pub fn cloudfree(&self, gee_path: &str, start: NaiveDate, end: NaiveDate) -> Image {
        ImageCollection::load(gee_path)
            .filter_date(start, end)
            .filter_bounds(&self.region)
            .simple_composite(self.settings.composite_percentile, self.settings.cloud_score_range)
            .clip(&self.region)
    }

    /// Mean of the index `index_key` over the region of interest for `year`
    ///
    /// With a `bandname` the value of that band is returned, otherwise every
    /// band of the reduction output.
    pub async fn zonal_mean(&self, index_key: &str, year: i32) -> Result<MetricValue> {
        let definition = self.catalog.get(index_key)?;
        let image = self.generate(definition, year)?;

        let reduction =
            image.reduce_region(&Reducer::mean(), &self.region, self.settings.reduction_scale);
        let output = self.engine.compute_value(&reduction).await?;

        let bands = output.as_object().ok_or_else(|| {
            BioscoreError::RemoteCall(format!(
                "reduceRegion for '{}' returned {} instead of a dictionary",
                index_key, output
            ))
        })?;

        let value = match &definition.bandname {
            Some(band) => bands.get(band).ok_or_else(|| BioscoreError::BandMissing {
                index: index_key.to_string(),
                band: band.clone(),
            })?,
            None => &output,
        };

        MetricValue::from_json(value).ok_or_else(|| {
            BioscoreError::RemoteCall(format!(
                "reduceRegion for '{}' returned a non-numeric value: {}",
                index_key, value
            ))
        })
    }
}
