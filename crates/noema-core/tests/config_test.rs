use noema_core::config::*;
use noema_core::errors::ConfigError;

#[test]
fn config_loads_from_empty_toml_with_all_defaults() {
    let config = NoemaConfig::from_toml("").unwrap();

    // Policy defaults
    assert_eq!(config.policy.learning_rate, 0.1);
    assert_eq!(config.policy.uncertainty, UncertaintyEstimator::Disagreement);
    assert_eq!(config.policy.delta_norm, DeltaNorm::L2);
    assert_eq!(config.policy.precision, 6);
    assert!(!config.policy.advance_on_empty);

    // Miner defaults
    assert_eq!(config.miner.ngram_min, 1);
    assert_eq!(config.miner.ngram_max, 3);
    assert_eq!(config.miner.cooc_window, 6);
    assert_eq!(config.miner.window_entries, 0);

    // Graph defaults
    assert_eq!(config.graph.pmi_smoothing, 0.5);
    assert_eq!(config.graph.min_weight, 0.15);
    assert_eq!(config.graph.max_surfaces_per_node, 5);
    assert_eq!(config.graph.max_edges, 1200);

    // Rule defaults
    assert_eq!(config.rules.subsumption_min_conditional, 0.8);
    assert_eq!(config.rules.max_rules, 1200);

    // Session + observability defaults
    assert_eq!(config.session.concurrency, ConcurrencyMode::Reject);
    assert_eq!(config.observability.log_level, "info");
    assert!(!config.observability.json_logs);
}

#[test]
fn config_loads_partial_toml_with_overrides() {
    let toml = r#"
[policy]
learning_rate = 0.25
uncertainty = { fixed = 0.4 }
delta_norm = "l1"
advance_on_empty = true

[miner]
ngram_max = 2
window_entries = 4

[session]
concurrency = "block"
"#;
    let config = NoemaConfig::from_toml(toml).unwrap();
    assert_eq!(config.policy.learning_rate, 0.25);
    assert_eq!(config.policy.uncertainty, UncertaintyEstimator::Fixed(0.4));
    assert_eq!(config.policy.delta_norm, DeltaNorm::L1);
    assert!(config.policy.advance_on_empty);
    assert_eq!(config.miner.ngram_max, 2);
    assert_eq!(config.miner.window_entries, 4);
    assert_eq!(config.session.concurrency, ConcurrencyMode::Block);

    // Untouched sections keep defaults.
    assert_eq!(config.graph.pmi_smoothing, 0.5);
    assert_eq!(config.policy.initial_weight, 0.5);
}

#[test]
fn invalid_toml_is_a_parse_error() {
    let err = NoemaConfig::from_toml("[policy\nlearning_rate = ").unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}

#[test]
fn validation_rejects_inverted_ngram_range() {
    let err = NoemaConfig::from_toml("[miner]\nngram_min = 3\nngram_max = 1\n").unwrap_err();
    match err {
        ConfigError::ValidationFailed { field, .. } => assert_eq!(field, "miner.ngram_min"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn validation_rejects_out_of_range_fixed_uncertainty() {
    let err = NoemaConfig::from_toml("[policy]\nuncertainty = { fixed = 1.5 }\n").unwrap_err();
    assert!(matches!(err, ConfigError::ValidationFailed { .. }));
}

#[test]
fn validation_rejects_inverted_subsumption_thresholds() {
    let toml = "[rules]\nsubsumption_min_conditional = 0.4\nsubsumption_max_reverse = 0.6\n";
    assert!(NoemaConfig::from_toml(toml).is_err());
}

#[test]
fn validation_rejects_associative_band_overlapping_subsumption() {
    // 0.9 - 0.5 leaves a 0.4 gap; an asymmetry allowance of 0.4 would let one
    // pair qualify as both subsumption and associative.
    let toml = "[rules]\nsubsumption_min_conditional = 0.9\nassociative_max_asymmetry = 0.4\n";
    match NoemaConfig::from_toml(toml).unwrap_err() {
        ConfigError::ValidationFailed { field, .. } => {
            assert_eq!(field, "rules.associative_max_asymmetry")
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let ok = "[rules]\nsubsumption_min_conditional = 0.9\nassociative_max_asymmetry = 0.35\n";
    assert!(NoemaConfig::from_toml(ok).is_ok());
}

#[test]
fn validation_rejects_zero_edge_cap() {
    let err = NoemaConfig::from_toml("[graph]\nmax_edges = 0\n").unwrap_err();
    assert!(matches!(err, ConfigError::ValidationFailed { field, .. } if field == "graph.max_edges"));
}

#[test]
fn missing_file_is_reported() {
    let err = NoemaConfig::load(std::path::Path::new("/nonexistent/noema.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::FileNotFound { .. }));
}
