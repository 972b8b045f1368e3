use std::collections::{BTreeMap, BTreeSet};

use proptest::prelude::*;

use noema_core::config::{GraphConfig, RuleConfig};
use noema_core::models::{segment_windows, ConceptEdge, ConceptNode, RuleKind, TraceEntry};
use noema_concept::edges::pmi;
use noema_concept::nodes::node_id;
use noema_concept::rules::classify;
use noema_concept::{ConceptGrowth, GraphSnapshot};

const VOCAB: &[&str] = &["refund", "cancel", "invoice", "payment", "account", "password", "late"];

fn text_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(VOCAB), 1..6).prop_map(|words| words.join(" "))
}

fn entry_strategy() -> impl Strategy<Value = TraceEntry> {
    (
        text_strategy(),
        prop::option::of(prop::sample::select(&["cancel", "billing"][..])),
        prop::option::of(-1.0_f64..1.0),
    )
        .prop_map(|(text, intent, reward)| {
            let mut entry = match reward {
                Some(r) => TraceEntry::rated(r, "cancel", "cancel", "billing"),
                None => TraceEntry::default(),
            }
            .with_text(text);
            if let Some(intent) = intent {
                entry = entry.with_intent(intent);
            }
            entry
        })
}

fn node(id: &str, df: u64, quality: f64) -> ConceptNode {
    ConceptNode {
        id: id.into(),
        canonical_term: id.into(),
        ngram: 1,
        surfaces: BTreeSet::new(),
        tf: df,
        df,
        quality,
        entry_count: df,
        windows: BTreeSet::new(),
        reward_affinity: None,
        superseded_by: None,
    }
}

fn edge(source: &str, target: &str, pmi: f64, conditional: f64, weight: f64) -> ConceptEdge {
    ConceptEdge {
        source_node_id: source.into(),
        target_node_id: target.into(),
        pmi,
        co_occurrence: 1,
        conditional,
        reward_correlation: 0.0,
        weight,
    }
}

proptest! {
    #[test]
    fn pmi_strictly_increases_with_joint_count(
        n in 1u64..500,
        a in 0u64..500,
        b in 0u64..500,
        k in 0u64..500,
    ) {
        let (a, b) = (a % (n + 1), b % (n + 1));
        let cap = a.min(b);
        prop_assume!(cap > 0);
        let n_ab = k % cap;
        prop_assert!(pmi(n_ab + 1, a, b, n, 0.5) > pmi(n_ab, a, b, n, 0.5));
    }

    #[test]
    fn node_ids_are_deterministic_hex(key in "[a-z ]{1,20}", n in 1usize..4) {
        let id = node_id(&key, n);
        prop_assert_eq!(id.len(), 16);
        prop_assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        prop_assert_eq!(id, node_id(&key, n));
    }

    #[test]
    fn symmetric_kinds_agree_in_both_directions(
        pmi_bits in -2.0_f64..3.0,
        cond_ab in 0.0_f64..1.0,
        cond_ba in 0.0_f64..1.0,
        weight in 0.0_f64..1.0,
        df_a in 1u64..20,
        df_b in 1u64..20,
        q_a in 0.0_f64..1.0,
        q_b in 0.0_f64..1.0,
    ) {
        let config = RuleConfig::default();
        let (a, b) = (node("a", df_a, q_a), node("b", df_b, q_b));
        let ab = edge("a", "b", pmi_bits, cond_ab, weight);
        let ba = edge("b", "a", pmi_bits, cond_ba, weight);
        let forward = classify(&ab, Some(&ba), &a, &b, &config);
        let backward = classify(&ba, Some(&ab), &b, &a, &config);
        match forward {
            Some(RuleKind::Synonym) => prop_assert_eq!(backward, Some(RuleKind::Synonym)),
            Some(RuleKind::Associative) => prop_assert_eq!(backward, Some(RuleKind::Associative)),
            Some(RuleKind::Subsumption) => prop_assert_ne!(backward, Some(RuleKind::Subsumption)),
            None => {}
        }
    }

    #[test]
    fn replaying_a_batch_key_is_a_no_op(batch in prop::collection::vec(entry_strategy(), 1..12)) {
        let engine = ConceptGrowth::default();
        let root = GraphSnapshot::genesis().unwrap();
        let windows = segment_windows(&batch, "replay", 0);
        let once = engine.grow(&root, &windows, &BTreeMap::new()).unwrap();
        let twice = engine.grow(&once.snapshot, &windows, &BTreeMap::new()).unwrap();
        prop_assert_eq!(&once.snapshot.graph.nodes, &twice.snapshot.graph.nodes);
        prop_assert_eq!(&once.snapshot.graph.pairs, &twice.snapshot.graph.pairs);
        prop_assert_eq!(&once.snapshot.graph.edges, &twice.snapshot.graph.edges);
        prop_assert_eq!(twice.updates.windows_skipped, 1);
    }

    #[test]
    fn surviving_edges_are_bounded(batch in prop::collection::vec(entry_strategy(), 1..12)) {
        let min_weight = GraphConfig::default().min_weight;
        let root = GraphSnapshot::genesis().unwrap();
        let windows = segment_windows(&batch, "w", 3);
        let out = ConceptGrowth::default().grow(&root, &windows, &BTreeMap::new()).unwrap();
        for e in &out.snapshot.graph.edges {
            prop_assert!(e.weight >= min_weight && e.weight <= 1.0);
            prop_assert!((0.0..=1.0).contains(&e.conditional));
            prop_assert!((-1.0..=1.0).contains(&e.reward_correlation));
        }
        for r in &out.snapshot.graph.rules {
            prop_assert!((0.0..=1.0).contains(&r.confidence));
        }
    }
}
