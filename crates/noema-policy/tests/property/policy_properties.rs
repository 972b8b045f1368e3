use std::sync::Arc;

use proptest::prelude::*;

use noema_core::config::PolicyConfig;
use noema_core::models::{PolicyVersion, TraceEntry, WeightTable};
use noema_policy::PolicyUpdater;

fn entry_strategy() -> impl Strategy<Value = TraceEntry> {
    (
        prop::option::of(-2.0_f64..2.0),
        prop::option::of("[abc]"),
        prop::option::of("[abc]"),
        prop::option::of("[abcd]"),
    )
        .prop_map(|(reward, target, actual, top_pred)| TraceEntry {
            reward,
            target,
            actual,
            top_pred,
            ..Default::default()
        })
}

fn parent() -> Arc<PolicyVersion> {
    Arc::new(PolicyVersion::genesis(&WeightTable::uniform(["a", "b", "c"], 0.5), 6).unwrap())
}

proptest! {
    #[test]
    fn delta_norm_is_never_negative(batch in prop::collection::vec(entry_strategy(), 0..20)) {
        let out = PolicyUpdater::default().update(&parent(), &batch).unwrap();
        prop_assert!(out.version.summary.delta_norm >= 0.0);
    }

    #[test]
    fn confidence_stays_in_unit_interval(batch in prop::collection::vec(entry_strategy(), 0..20)) {
        let out = PolicyUpdater::default().update(&parent(), &batch).unwrap();
        let c = out.version.summary.confidence;
        prop_assert!((0.0..=1.0).contains(&c));
    }

    #[test]
    fn weights_stay_within_clamp(
        batch in prop::collection::vec(entry_strategy(), 1..20),
        lr in 0.01_f64..50.0,
    ) {
        let config = PolicyConfig { learning_rate: lr, ..Default::default() };
        let (min, max) = (config.min_weight, config.max_weight);
        let out = PolicyUpdater::new(config).update(&parent(), &batch).unwrap();
        for (_, w) in out.version.weights.iter() {
            prop_assert!(w.is_finite());
            prop_assert!(w >= min && w <= max);
        }
    }

    #[test]
    fn unrated_batches_leave_weights_untouched(texts in prop::collection::vec("[a-z ]{0,12}", 0..10)) {
        let batch: Vec<TraceEntry> = texts.into_iter().map(|t| TraceEntry::default().with_text(t)).collect();
        let p = parent();
        let out = PolicyUpdater::default().update(&p, &batch).unwrap();
        prop_assert!(!out.created);
        prop_assert_eq!(&out.version.weights, &p.weights);
        prop_assert_eq!(out.version.summary.delta_norm, 0.0);
    }
}
