//! Viewport fitting: frame a map around a set of coordinates
//!
//! Zoom is looked up from the area of the coordinates' bounding box by
//! piecewise-linear interpolation over a fixed breakpoint table. Small areas
//! get high zoom levels; the levels fall as the area grows.

use bioscore_core::models::ViewportConfig;
use geo::{BoundingRect, MultiPoint, Point};

/// Zoom level at each breakpoint of [`zoom_areas`]
pub const ZOOM_LEVELS: [f64; 7] = [20.0, 15.0, 14.0, 13.0, 12.0, 7.0, 5.0];

/// Bounding-box area breakpoints, in squared degrees
///
/// Evaluated literally: `5^-10 < 4^-10 < 3^-10 < 2^-10 < 1`, so the table is
/// ascending, and the last two entries are both `1`.
pub fn zoom_areas() -> [f64; 7] {
    [
        0.0,
        5f64.powi(-10),
        4f64.powi(-10),
        3f64.powi(-10),
        2f64.powi(-10),
        1f64.powi(-10),
        1f64.powi(-5),
    ]
}

/// One-dimensional piecewise-linear interpolation
///
/// Follows numpy's `interp`: `xp` must be ascending; values left of the
/// table clamp to `fp[0]`, values right of it clamp to the last entry, and
/// on repeated breakpoints the last one wins. Returns NaN for NaN input or
/// an empty table.
pub fn interpolate(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    let len = xp.len().min(fp.len());
    if len == 0 || x.is_nan() {
        return f64::NAN;
    }

    let (xp, fp) = (&xp[..len], &fp[..len]);
    if x < xp[0] {
        return fp[0];
    }
    if x >= xp[len - 1] {
        return fp[len - 1];
    }

    // last breakpoint not greater than x
    let j = xp.partition_point(|&v| v <= x) - 1;
    if xp[j] == x {
        return fp[j];
    }

    let slope = (fp[j + 1] - fp[j]) / (xp[j + 1] - xp[j]);
    fp[j] + slope * (x - xp[j])
}

/// Compute zoom and center for the given coordinates
///
/// Missing sequences, sequences of different lengths, or empty sequences
/// give the default viewport: zoom 0 over (0, 0).
pub fn fit_viewport(longitudes: Option<&[f64]>, latitudes: Option<&[f64]>) -> ViewportConfig {
    let (longitudes, latitudes) = match (longitudes, latitudes) {
        (Some(lons), Some(lats)) if lons.len() == lats.len() && !lons.is_empty() => (lons, lats),
        _ => return ViewportConfig::default(),
    };

    let points: MultiPoint<f64> = longitudes
        .iter()
        .zip(latitudes)
        .map(|(&lon, &lat)| Point::new(lon, lat))
        .collect();

    let Some(bbox) = points.bounding_rect() else {
        return ViewportConfig::default();
    };

    let count = longitudes.len() as f64;
    let center = (
        longitudes.iter().sum::<f64>() / count,
        latitudes.iter().sum::<f64>() / count,
    );

    let area = bbox.width() * bbox.height();
    let zoom = interpolate(area, &zoom_areas(), &ZOOM_LEVELS);

    ViewportConfig::new(zoom, center)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_zoom_table_is_ascending() {
        let areas = zoom_areas();
        assert!(areas.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(areas[5], 1.0);
        assert_eq!(areas[6], 1.0);
    }

    #[test]
    fn test_interpolate_clamps() {
        let xp = [1.0, 2.0, 3.0];
        let fp = [10.0, 20.0, 30.0];
        assert_eq!(interpolate(0.0, &xp, &fp), 10.0);
        assert_eq!(interpolate(5.0, &xp, &fp), 30.0);
        assert!(approx(interpolate(2.5, &xp, &fp), 25.0));
        assert_eq!(interpolate(2.0, &xp, &fp), 20.0);
    }

    #[test]
    fn test_interpolate_repeated_breakpoint() {
        let xp = [0.0, 1.0, 1.0];
        let fp = [0.0, 7.0, 5.0];
        assert_eq!(interpolate(1.0, &xp, &fp), 5.0);
        assert!(approx(interpolate(0.5, &xp, &fp), 3.5));
    }

    #[test]
    fn test_interpolate_degenerate_input() {
        assert!(interpolate(1.0, &[], &[]).is_nan());
        assert!(interpolate(f64::NAN, &[0.0], &[1.0]).is_nan());
    }

    #[test]
    fn test_default_viewport_on_bad_input() {
        let lons = [1.0, 2.0];
        let lats = [1.0];
        assert_eq!(fit_viewport(Some(&lons), Some(&lats)), ViewportConfig::default());
        assert_eq!(fit_viewport(None, Some(&lats)), ViewportConfig::default());
        assert_eq!(fit_viewport(Some(&lons), None), ViewportConfig::default());
        assert_eq!(fit_viewport(Some(&[]), Some(&[])), ViewportConfig::default());

        let fallback = fit_viewport(None, None);
        assert_eq!(fallback.zoom, 0.0);
        assert_eq!(fallback.center, (0.0, 0.0));
    }

    #[test]
    fn test_single_point_has_max_zoom() {
        let viewport = fit_viewport(Some(&[115.2]), Some(&[-8.6]));
        assert_eq!(viewport.zoom, 20.0);
        assert_eq!(viewport.center, (115.2, -8.6));
    }

    #[test]
    fn test_unit_area_and_above_clamps_to_five() {
        // 1 x 1 degree box: area equals the repeated last breakpoint
        let viewport = fit_viewport(Some(&[0.0, 1.0, 1.0, 0.0]), Some(&[0.0, 0.0, 1.0, 1.0]));
        assert_eq!(viewport.zoom, 5.0);
        assert_eq!(viewport.center, (0.5, 0.5));

        let wide = fit_viewport(Some(&[-10.0, 10.0]), Some(&[-5.0, 5.0]));
        assert_eq!(wide.zoom, 5.0);
    }

    #[test]
    fn test_breakpoint_areas_map_to_their_zoom() {
        let areas = zoom_areas();
        for (i, &area) in areas.iter().enumerate().take(5) {
            // box of width `area` and height 1
            let viewport = fit_viewport(Some(&[0.0, area]), Some(&[0.0, 1.0]));
            assert!(
                approx(viewport.zoom, ZOOM_LEVELS[i]),
                "area {} gave zoom {}, expected {}",
                area,
                viewport.zoom,
                ZOOM_LEVELS[i]
            );
        }
    }

    #[test]
    fn test_area_between_breakpoints_is_linear() {
        // 1e-5 lies between 4^-10 (zoom 14) and 3^-10 (zoom 13), not past
        // the last breakpoint, so it does not reach zoom 5
        let areas = zoom_areas();
        let area = 1e-5;
        let expected = 14.0 - (area - areas[2]) / (areas[3] - areas[2]);

        let viewport = fit_viewport(Some(&[0.0, area]), Some(&[0.0, 1.0]));
        assert!(approx(viewport.zoom, expected));
        assert!((viewport.zoom - 13.434).abs() < 1e-3);
        assert!(viewport.zoom < 14.0 && viewport.zoom > 13.0);
    }

    #[test]
    fn test_twenty_km_disc_zoom() {
        // roughly the bounding box of a 20 km buffer near the equator
        let d = 20_000.0 / 111_320.0;
        let lons = [115.0 - d, 115.0 + d, 115.0 + d, 115.0 - d, 115.0 - d];
        let lats = [-8.0 - d, -8.0 - d, -8.0 + d, -8.0 + d, -8.0 - d];

        let viewport = fit_viewport(Some(&lons), Some(&lats));
        assert!(viewport.zoom > 7.0 && viewport.zoom < 12.0);
    }
}
