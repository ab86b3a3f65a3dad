use mra_derivative::algs::stats::StatsSnapshot;
use mra_derivative::data::projection::RefineOptions;
use mra_derivative::prelude::*;

#[test]
fn derivative_config_round_trips() {
    let bc = BoundaryConds::<2>::new([
        [BoundaryCode::Dirichlet, BoundaryCode::Neumann],
        [BoundaryCode::Periodic, BoundaryCode::Periodic],
    ])
    .unwrap();
    let config = DerivativeConfig::new(7, 1, bc).allow_reconstruct(true).chunk_size(3);
    let text = serde_json::to_string(&config).unwrap();
    assert!(text.contains("\"dirichlet\""));
    let back: DerivativeConfig<2> = serde_json::from_str(&text).unwrap();
    assert_eq!(back, config);
}

#[test]
fn defaults_fill_missing_fields() {
    let config: DerivativeConfig<1> =
        serde_json::from_str(r#"{"k": 5, "axis": 0, "bc": "periodic"}"#).unwrap();
    assert_eq!(config, DerivativeConfig::new(5, 0, BoundaryPreset::Periodic));
    assert!(config.high_priority);
    assert!(!config.allow_reconstruct);
}

#[test]
fn invalid_boundary_matrices_do_not_deserialize() {
    let half = r#"{"k": 5, "axis": 0, "bc": {"custom": [["periodic", "zero"]]}}"#;
    assert!(serde_json::from_str::<DerivativeConfig<1>>(half).is_err());
    let short = r#"{"k": 5, "axis": 0, "bc": {"custom": [["zero", "zero"]]}}"#;
    assert!(serde_json::from_str::<DerivativeConfig<2>>(short).is_err());
    let bogus = r#"[["zero", "sticky"]]"#;
    assert!(serde_json::from_str::<BoundaryConds<1>>(bogus).is_err());
}

#[test]
fn tree_config_and_options_round_trip() {
    let config = TreeConfig::unit(6, 3)
        .with_cell(vec![(-1.0, 1.0), (0.0, 2.0), (0.0, 0.5)])
        .with_pmap(ProcessMap::Subtree { level: 2 });
    let back: TreeConfig = serde_json::from_str(&serde_json::to_string(&config).unwrap()).unwrap();
    assert_eq!(back, config);

    let opts: RefineOptions =
        serde_json::from_str(r#"{"initial_level": 1, "max_level": 4, "thresh": 1e-3}"#).unwrap();
    assert_eq!(opts.max_level, 4);

    let stats = StatsSnapshot {
        neighbor_requests: 3,
        ..StatsSnapshot::default()
    };
    let json = serde_json::to_value(stats).unwrap();
    assert_eq!(json["neighbor_requests"], 3);
}
