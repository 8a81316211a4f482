//! Property tests for viewport fitting

use bioscore_geo::{fit_viewport, zoom_areas, ZOOM_LEVELS};
use proptest::prelude::*;

fn coordinate_pairs() -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    prop::collection::vec((-180.0f64..180.0, -90.0f64..90.0), 1..64)
        .prop_map(|pairs| pairs.into_iter().unzip())
}

proptest! {
    #[test]
    fn prop_center_is_componentwise_mean((lons, lats) in coordinate_pairs()) {
        let viewport = fit_viewport(Some(&lons), Some(&lats));

        let mean_lon = lons.iter().sum::<f64>() / lons.len() as f64;
        let mean_lat = lats.iter().sum::<f64>() / lats.len() as f64;

        prop_assert!((viewport.center.0 - mean_lon).abs() < 1e-9);
        prop_assert!((viewport.center.1 - mean_lat).abs() < 1e-9);
    }

    #[test]
    fn prop_zoom_stays_within_table(
        (lons, lats) in coordinate_pairs()
    ) {
        let zoom = fit_viewport(Some(&lons), Some(&lats)).zoom;
        prop_assert!((5.0..=20.0).contains(&zoom));
    }

    #[test]
    fn prop_mismatched_lengths_fall_back(
        lons in prop::collection::vec(-180.0f64..180.0, 0..16),
        extra in 1usize..4
    ) {
        let lats = vec![0.0; lons.len() + extra];
        let viewport = fit_viewport(Some(&lons), Some(&lats));
        prop_assert_eq!(viewport.zoom, 0.0);
        prop_assert_eq!(viewport.center, (0.0, 0.0));
    }

    #[test]
    fn prop_zoom_never_increases_with_area(a in 0.0f64..2.0, b in 0.0f64..2.0) {
        let (small, large) = if a <= b { (a, b) } else { (b, a) };
        let zoom_small = fit_viewport(Some(&[0.0, small]), Some(&[0.0, 1.0])).zoom;
        let zoom_large = fit_viewport(Some(&[0.0, large]), Some(&[0.0, 1.0])).zoom;
        prop_assert!(zoom_small >= zoom_large);
    }
}

#[test]
fn test_table_endpoints() {
    let areas = zoom_areas();
    assert_eq!(areas[0], 0.0);
    assert_eq!(ZOOM_LEVELS[0], 20.0);
    assert_eq!(ZOOM_LEVELS[ZOOM_LEVELS.len() - 1], 5.0);
}
