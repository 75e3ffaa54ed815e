use proptest::prelude::*;
use warden_core::config::{ThresholdLevel, Thresholds};
use warden_core::models::{IssueType, Status};

fn arb_status() -> impl Strategy<Value = Status> {
    prop_oneof![
        Just(Status::Healthy),
        Just(Status::Warning),
        Just(Status::Critical),
    ]
}

proptest! {
    #[test]
    fn ordered_finite_thresholds_are_valid(a in -1e6f64..1e6, b in -1e6f64..1e6) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(Thresholds::new(lo, hi).is_valid());
        if lo < hi {
            prop_assert!(!Thresholds::new(hi, lo).is_valid());
        }
    }

    #[test]
    fn level_picks_matching_threshold(w in -1e6f64..1e6, c in -1e6f64..1e6) {
        let t = Thresholds::new(w, c);
        prop_assert_eq!(t.level(ThresholdLevel::Warning), w);
        prop_assert_eq!(t.level(ThresholdLevel::Critical), c);
    }

    #[test]
    fn worst_is_the_maximum(statuses in proptest::collection::vec(arb_status(), 0..20)) {
        let worst = Status::worst(statuses.iter().copied());
        for s in &statuses {
            prop_assert!(*s <= worst);
        }
        if statuses.is_empty() {
            prop_assert_eq!(worst, Status::Healthy);
        }
    }

    #[test]
    fn issue_type_names_survive_string_conversion(name in "[a-z_]{1,24}") {
        let issue_type = IssueType::from(name.as_str());
        prop_assert_eq!(String::from(issue_type), name);
    }
}
