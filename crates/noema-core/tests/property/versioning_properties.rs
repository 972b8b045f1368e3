use proptest::prelude::*;

use noema_core::models::{PolicyVersion, WeightTable};
use noema_core::versioning::VersionId;

fn weights_strategy() -> impl Strategy<Value = Vec<(String, f64)>> {
    prop::collection::vec(("[a-z]{1,6}", -5.0_f64..5.0_f64), 0..8)
}

proptest! {
    #[test]
    fn version_ids_are_deterministic(pairs in weights_strategy(), parent in "[a-f0-9]{8}") {
        let table: WeightTable = pairs.into_iter().collect::<WeightTable>().rounded(6);
        let parent = VersionId::from(parent);
        let a = PolicyVersion::derive_id(&table, Some(&parent)).unwrap();
        let b = PolicyVersion::derive_id(&table, Some(&parent)).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn version_ids_differ_by_parent(pairs in weights_strategy(), p1 in "[a-f0-9]{8}", p2 in "[a-f0-9]{8}") {
        prop_assume!(p1 != p2);
        let table: WeightTable = pairs.into_iter().collect::<WeightTable>().rounded(6);
        let a = PolicyVersion::derive_id(&table, Some(&VersionId::from(p1))).unwrap();
        let b = PolicyVersion::derive_id(&table, Some(&VersionId::from(p2))).unwrap();
        prop_assert_ne!(a, b);
    }

    #[test]
    fn rounding_is_idempotent(pairs in weights_strategy(), precision in 0_u32..10) {
        let table: WeightTable = pairs.into_iter().collect();
        let once = table.rounded(precision);
        prop_assert_eq!(once.rounded(precision), once);
    }
}
