use crate::error::{BioscoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Project centroid in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Centroid {
    pub lat: f64,
    pub lon: f64,
}

impl Centroid {
    /// Create a validated centroid
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(BioscoreError::InvalidRegion {
                reason: format!("centroid ({}, {}) must be finite", lat, lon),
            });
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(BioscoreError::InvalidRegion {
                reason: format!("latitude {} outside [-90, 90]", lat),
            });
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(BioscoreError::InvalidRegion {
                reason: format!("longitude {} outside [-180, 180]", lon),
            });
        }
        Ok(Self { lat, lon })
    }
}

impl fmt::Display for Centroid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lon)
    }
}

impl FromStr for Centroid {
    type Err = BioscoreError;

    /// Parse the `(lat, lon)` form produced by `Display`
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || BioscoreError::InvalidRegion {
            reason: format!("cannot parse centroid from '{}'", s),
        };

        let inner = s.trim().trim_start_matches('(').trim_end_matches(')');
        let (lat, lon) = inner.split_once(',').ok_or_else(invalid)?;
        let lat = lat.trim().parse::<f64>().map_err(|_| invalid())?;
        let lon = lon.trim().parse::<f64>().map_err(|_| invalid())?;

        Self::new(lat, lon)
    }
}

/// Disc-shaped region of interest around a project centroid
///
/// Immutable once built; the generator that owns it derives the remote
/// buffer geometry from these two values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionOfInterest {
    centroid: Centroid,
    radius_m: f64,
}

impl RegionOfInterest {
    pub fn new(centroid: Centroid, radius_m: f64) -> Result<Self> {
        if !radius_m.is_finite() || radius_m <= 0.0 {
            return Err(BioscoreError::InvalidRegion {
                reason: format!("radius must be a positive number of meters, got {}", radius_m),
            });
        }
        Ok(Self { centroid, radius_m })
    }

    pub fn centroid(&self) -> Centroid {
        self.centroid
    }

    pub fn radius_m(&self) -> f64 {
        self.radius_m
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centroid_display_round_trips() {
        let centroid = Centroid::new(-8.5, 115.25).unwrap();
        assert_eq!(centroid.to_string(), "(-8.5, 115.25)");
        assert_eq!("(-8.5, 115.25)".parse::<Centroid>().unwrap(), centroid);
    }

    #[test]
    fn test_centroid_rejects_out_of_range() {
        assert!(Centroid::new(91.0, 0.0).is_err());
        assert!(Centroid::new(0.0, -180.5).is_err());
        assert!(Centroid::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_centroid_parse_garbage() {
        assert!("not a centroid".parse::<Centroid>().is_err());
        assert!("(1.0; 2.0)".parse::<Centroid>().is_err());
    }

    #[test]
    fn test_region_requires_positive_radius() {
        let centroid = Centroid::new(0.0, 0.0).unwrap();
        assert!(RegionOfInterest::new(centroid, 0.0).is_err());
        assert!(RegionOfInterest::new(centroid, -5.0).is_err());

        let roi = RegionOfInterest::new(centroid, 20_000.0).unwrap();
        assert_eq!(roi.radius_m(), 20_000.0);
        assert_eq!(roi.centroid(), centroid);
    }
}
