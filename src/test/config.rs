use crate::ctrl::{ConfigError, ControllerConfig, FlowGenConfig};
use crate::flow::AdmissionPolicy;
use crate::net::{CongestionPenalty, TopologyError};
use crate::sim::SimTime;
use crate::topo::reference_wan;

#[test]
fn empty_json_yields_defaults() {
    let cfg = ControllerConfig::from_json("{}").expect("parse");
    assert_eq!(cfg, ControllerConfig::default());
    assert_eq!(cfg.reroute_threshold, 0.75);
    assert_eq!(cfg.tick_interval(), SimTime::from_secs(1));
    assert_eq!(cfg.topology, reference_wan());
    assert_eq!(cfg.admission, AdmissionPolicy::None);
    assert_eq!(cfg.seed, 42);
    cfg.validate().expect("default config is valid");
}

#[test]
fn json_overrides_every_knob() {
    let raw = r#"{
        "topology": {
            "directed": true,
            "links": [
                {"a": "X", "b": "Y", "capacity_mbps": 100, "latency_ms": 5},
                {"a": "Y", "b": "Z", "capacity_mbps": 40}
            ]
        },
        "reroute_threshold": 0.9,
        "tick_interval_ms": 250,
        "penalty": {"kind": "linear", "alpha": 300},
        "admission": {"kind": "max_ratio", "ratio": 1.5},
        "generation": {"arrival_rate_per_sec": 4, "endpoints": ["X", "Z"]},
        "seed": 9
    }"#;
    let cfg = ControllerConfig::from_json(raw).expect("parse");
    assert!(cfg.topology.directed);
    assert!(cfg.topology.nodes.is_empty());
    assert_eq!(cfg.topology.links[1].latency_ms, 0.0);
    assert_eq!(cfg.reroute_threshold, 0.9);
    assert_eq!(cfg.tick_interval(), SimTime::from_millis(250));
    assert_eq!(cfg.penalty, CongestionPenalty::Linear { alpha: 300.0 });
    assert_eq!(cfg.admission, AdmissionPolicy::MaxRatio { ratio: 1.5 });
    assert_eq!(cfg.generation.arrival_rate_per_sec, 4.0);
    assert_eq!(cfg.generation.max_demand_mbps, 10.0);
    assert_eq!(cfg.seed, 9);
    cfg.validate().expect("valid");
}

#[test]
fn config_round_trips_through_json() {
    let cfg = ControllerConfig {
        generation: FlowGenConfig::disabled(),
        ..ControllerConfig::default()
    };
    let raw = serde_json::to_string(&cfg).unwrap();
    assert_eq!(ControllerConfig::from_json(&raw).unwrap(), cfg);
}

#[test]
fn malformed_json_is_a_parse_error() {
    assert!(matches!(
        ControllerConfig::from_json("{\"reroute_threshold\": \"high\"}"),
        Err(ConfigError::Parse(_))
    ));
    assert!(matches!(
        ControllerConfig::from_json("{\"penalty\": {\"kind\": \"cubic\"}}"),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn invalid_knobs_are_rejected() {
    let base = ControllerConfig::default;

    let cfg = ControllerConfig {
        reroute_threshold: f64::NAN,
        ..base()
    };
    assert!(matches!(cfg.validate(), Err(ConfigError::InvalidThreshold(_))));

    let cfg = ControllerConfig {
        tick_interval_ms: 0,
        ..base()
    };
    assert!(matches!(cfg.validate(), Err(ConfigError::ZeroTickInterval)));

    let cfg = ControllerConfig {
        admission: AdmissionPolicy::MaxRatio { ratio: 0.0 },
        ..base()
    };
    assert!(matches!(cfg.validate(), Err(ConfigError::InvalidAdmission(_))));

    let cfg = ControllerConfig {
        penalty: CongestionPenalty::Knee {
            knee: 1.0,
            scale: 1.0,
            exponent: 2.0,
        },
        ..base()
    };
    assert!(matches!(
        cfg.validate(),
        Err(ConfigError::Topology(TopologyError::InvalidPenalty(_)))
    ));
}

#[test]
fn invalid_generation_is_rejected() {
    let with_gen = |generation: FlowGenConfig| ControllerConfig {
        generation,
        ..ControllerConfig::default()
    };

    for generation in [
        FlowGenConfig {
            arrival_rate_per_sec: -1.0,
            ..FlowGenConfig::default()
        },
        FlowGenConfig {
            min_demand_mbps: 0.0,
            ..FlowGenConfig::default()
        },
        FlowGenConfig {
            min_demand_mbps: 5.0,
            max_demand_mbps: 2.0,
            ..FlowGenConfig::default()
        },
        FlowGenConfig {
            min_lifetime_ms: 10,
            max_lifetime_ms: 5,
            ..FlowGenConfig::default()
        },
    ] {
        assert!(
            matches!(with_gen(generation.clone()).validate(), Err(ConfigError::InvalidGeneration(_))),
            "{generation:?}"
        );
    }
}

#[test]
fn endpoints_must_exist_and_be_at_least_two() {
    let cfg = ControllerConfig {
        generation: FlowGenConfig {
            endpoints: Some(vec!["A".into(), "Q".into()]),
            ..FlowGenConfig::default()
        },
        ..ControllerConfig::default()
    };
    match cfg.validate() {
        Err(ConfigError::UnknownEndpoint(name)) => assert_eq!(name, "Q"),
        other => panic!("expected UnknownEndpoint, got {other:?}"),
    }

    let cfg = ControllerConfig {
        generation: FlowGenConfig {
            endpoints: Some(vec!["A".into(), "A".into()]),
            ..FlowGenConfig::default()
        },
        ..ControllerConfig::default()
    };
    assert!(matches!(cfg.validate(), Err(ConfigError::TooFewEndpoints(1))));

    // 不生成流量时端点数不受限制
    let cfg = ControllerConfig {
        generation: FlowGenConfig {
            endpoints: Some(vec!["A".into()]),
            ..FlowGenConfig::disabled()
        },
        ..ControllerConfig::default()
    };
    cfg.validate().expect("disabled generation");
}

#[test]
fn malformed_topology_is_rejected_at_load() {
    let raw = r#"{"topology": {"links": [{"a": "A", "b": "A", "capacity_mbps": 10}]}}"#;
    let cfg = ControllerConfig::from_json(raw).expect("parse");
    assert!(matches!(
        cfg.validate(),
        Err(ConfigError::Topology(TopologyError::SelfLoop(_)))
    ));

    let raw = r#"{"topology": {"links": [{"a": "A", "b": "B", "capacity_mbps": 0}]}}"#;
    let cfg = ControllerConfig::from_json(raw).expect("parse");
    assert!(matches!(
        cfg.validate(),
        Err(ConfigError::Topology(TopologyError::NonPositiveCapacity { .. }))
    ));
}
