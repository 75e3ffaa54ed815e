use chrono::Utc;
use proptest::prelude::*;
use warden_core::config::Thresholds;
use warden_core::models::{HealthMetric, Status};
use warden_healing::{trend_slope, HealthEvaluator, MetricHistory};

proptest! {
    #[test]
    fn history_never_exceeds_capacity(capacity in 1usize..64, inserts in 0usize..300) {
        let mut history = MetricHistory::new(capacity);
        let now = Utc::now();
        for i in 0..inserts {
            history.record(HealthMetric::new("m", i as f64, Status::Healthy, now));
        }
        prop_assert_eq!(history.len("m"), inserts.min(capacity));
        if inserts > 0 {
            prop_assert_eq!(history.latest("m").map(|m| m.value), Some((inserts - 1) as f64));
        }
    }

    #[test]
    fn trend_of_a_line_is_its_slope(
        intercept in -1e3f64..1e3,
        slope in -50f64..50.0,
        n in 2usize..40,
    ) {
        let values: Vec<f64> = (0..n).map(|i| intercept + slope * i as f64).collect();
        prop_assert!((trend_slope(&values) - slope).abs() < 1e-6);
    }

    #[test]
    fn evaluation_is_monotone_in_value(
        a in -1e4f64..1e4,
        b in -1e4f64..1e4,
        v1 in -2e4f64..2e4,
        v2 in -2e4f64..2e4,
    ) {
        let (warning, critical) = if a <= b { (a, b) } else { (b, a) };
        let row = Thresholds::new(warning, critical);
        let (lo, hi) = if v1 <= v2 { (v1, v2) } else { (v2, v1) };
        prop_assert!(HealthEvaluator::classify(lo, row) <= HealthEvaluator::classify(hi, row));
    }
}
