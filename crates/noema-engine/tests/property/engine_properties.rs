use proptest::prelude::*;

use noema_core::models::{TraceEntry, WeightTable};
use noema_core::versioning::VersionId;
use noema_engine::{LearningEngine, PassRequest};

fn entry_strategy() -> impl Strategy<Value = TraceEntry> {
    (
        -1.0_f64..1.0,
        prop::sample::select(&["A", "B", "C"][..]),
        prop::sample::select(&["A", "B", "C"][..]),
        "[a-e ]{0,20}",
    )
        .prop_map(|(reward, target, top, text)| {
            TraceEntry::rated(reward, target, target, top).with_text(text)
        })
}

fn batches() -> impl Strategy<Value = Vec<Vec<TraceEntry>>> {
    prop::collection::vec(prop::collection::vec(entry_strategy(), 0..8), 1..5)
}

proptest! {
    #[test]
    fn parallel_and_sequential_sessions_agree(batches in batches()) {
        let sequential = LearningEngine::default();
        let parallel = LearningEngine::default();
        let weights = WeightTable::uniform(["A", "B"], 0.5);

        let mut requests = Vec::new();
        let mut expected = Vec::new();
        for (i, batch) in batches.iter().enumerate() {
            let id = format!("s{i}");
            sequential.open_session(&id, &weights).unwrap();
            parallel.open_session(&id, &weights).unwrap();
            let out = sequential
                .run_pass(PassRequest::new(id.clone(), batch.clone()).with_batch_key("k"))
                .unwrap();
            expected.push((out.policy.version_id.clone(), out.graph.version_id().clone()));
            requests.push(PassRequest::new(id, batch.clone()).with_batch_key("k"));
        }

        let results = parallel.run_passes_parallel(requests);
        for (result, (policy, graph)) in results.into_iter().zip(expected) {
            let out = result.unwrap();
            prop_assert_eq!(&out.policy.version_id, &policy);
            prop_assert_eq!(out.graph.version_id(), &graph);
        }
    }

    #[test]
    fn rejected_pass_never_moves_heads(
        batch in prop::collection::vec(entry_strategy(), 0..8),
        bogus in "[0-9a-f]{64}",
    ) {
        let engine = LearningEngine::default();
        let before = engine.open_session("s", &WeightTable::uniform(["A"], 0.5)).unwrap();
        let request = PassRequest::new("s", batch)
            .with_parents(VersionId::from(bogus), before.graph_version_id.clone());
        prop_assert!(engine.run_pass(request).is_err());
        prop_assert_eq!(engine.heads("s").unwrap(), before);
    }
}
