use super::region::Centroid;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Result of a zonal mean reduction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    /// Value of the configured output band
    Scalar(f64),
    /// Every band of the reduction output
    Bands(BTreeMap<String, Option<f64>>),
    /// The reduction produced no value (fully masked region)
    Missing,
}

impl MetricValue {
    /// Build a metric value from a JSON reduction output entry
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => Some(MetricValue::Missing),
            serde_json::Value::Number(n) => n.as_f64().map(MetricValue::Scalar),
            serde_json::Value::Object(map) => Some(MetricValue::Bands(
                map.iter().map(|(band, v)| (band.clone(), v.as_f64())).collect(),
            )),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            MetricValue::Scalar(v) => Some(*v),
            _ => None,
        }
    }
}

/// One score row: a metric of one project for one year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub metric: String,
    pub year: i32,
    pub centroid: Centroid,
    pub project_name: String,
    pub value: MetricValue,
    /// Area of the region of interest in square meters
    pub area_m2: f64,
    /// Region boundary as GeoJSON text
    pub geojson: String,
}

impl ScoreRecord {
    /// Key the warehouse upserts on
    pub fn key(&self) -> (&str, i32, &str) {
        (&self.project_name, self.year, &self.metric)
    }
}

/// Ordered score records for one project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreTable {
    records: Vec<ScoreRecord>,
}

impl ScoreTable {
    pub fn new(records: Vec<ScoreRecord>) -> Self {
        Self { records }
    }

    /// Concatenate tables, preserving their order
    pub fn concat(tables: impl IntoIterator<Item = ScoreTable>) -> Self {
        Self { records: tables.into_iter().flat_map(|t| t.records).collect() }
    }

    pub fn records(&self) -> &[ScoreRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<ScoreRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScoreRecord> {
        self.records.iter()
    }

    /// Distinct years in table order
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = Vec::new();
        for record in &self.records {
            if !years.contains(&record.year) {
                years.push(record.year);
            }
        }
        years
    }

    pub fn for_year(&self, year: i32) -> impl Iterator<Item = &ScoreRecord> {
        self.records.iter().filter(move |r| r.year == year)
    }
}

impl IntoIterator for ScoreTable {
    type Item = ScoreRecord;
    type IntoIter = std::vec::IntoIter<ScoreRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}
