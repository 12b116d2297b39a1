/// Everything but the largest empty arc between neighbouring bearings.
pub fn angle_span(bearings: impl IntoIterator<Item = f64>) -> f64 {
    let mut sorted: Vec<f64> = bearings.into_iter().filter(|b| b.is_finite()).collect();
    if sorted.len() < 2 {
        return 0.0;
    }
    sorted.sort_by(f64::total_cmp);

    let mut largest_gap = sorted
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .fold(0.0, f64::max);
    let wrap_gap = 360.0 - sorted[sorted.len() - 1] + sorted[0];
    if wrap_gap > largest_gap {
        largest_gap = wrap_gap;
    }
    (360.0 - largest_gap).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn single_or_no_bearing_covers_nothing() {
        assert_eq!(angle_span(Vec::<f64>::new()), 0.0);
        assert_eq!(angle_span([42.0]), 0.0);
    }

    #[test]
    fn spans_across_north() {
        assert!((angle_span([350.0, 10.0]) - 20.0).abs() < 1e-9);
        assert!((angle_span([10.0, 350.0, 0.0]) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn uniform_coverage_approaches_full_circle() {
        let span = angle_span((0..36).map(|i| i as f64 * 10.0));
        assert!((span - 350.0).abs() < 1e-9);
        let dense = angle_span((0..3600).map(|i| i as f64 * 0.1));
        assert!(dense > 359.8);
    }

    #[test]
    fn ignores_nan() {
        assert!((angle_span([0.0, f64::NAN, 90.0]) - 90.0).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn order_does_not_matter(mut bearings in proptest::collection::vec(0.0f64..360.0, 0..40)) {
            let forward = angle_span(bearings.clone());
            bearings.reverse();
            let backward = angle_span(bearings.clone());
            bearings.sort_by(f64::total_cmp);
            let sorted = angle_span(bearings);
            prop_assert!((forward - backward).abs() < 1e-9);
            prop_assert!((forward - sorted).abs() < 1e-9);
            prop_assert!((0.0..=360.0).contains(&forward));
        }
    }
}
