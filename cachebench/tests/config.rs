use std::time::Duration;

use cachebench::config::DEFAULT_GENERATION;
use cachebench::{Config, ConfigError, GenerationId, NetworkCondition, Strategy, TimeoutPolicy};

#[test]
fn empty_document_yields_defaults() {
    let config = Config::from_yaml("{}").unwrap();

    assert_eq!(config, Config::default());
    assert_eq!(config.generation.as_str(), DEFAULT_GENERATION);
    assert_eq!(config.default_strategy, Strategy::NetworkFirst);
    assert_eq!(config.initial_strategy(), "network-first");
    assert_eq!(config.offload.timeout, TimeoutPolicy::None);
    assert_eq!(config.network, None);
}

#[test]
fn full_document() {
    let yaml = r#"
generation: cachebench-v2
default_strategy: cache-first
strategy: stale-while-revalidate
offload:
  timeout:
    warn: 5s
network:
  slow:
    latency: 300ms
"#;
    let config = Config::from_yaml(yaml).unwrap();

    assert_eq!(config.generation, GenerationId::new("cachebench-v2"));
    assert_eq!(config.default_strategy, Strategy::CacheFirst);
    assert_eq!(config.initial_strategy(), "stale-while-revalidate");
    assert_eq!(
        config.offload.timeout,
        TimeoutPolicy::Warn(Duration::from_secs(5))
    );
    assert_eq!(
        config.network,
        Some(NetworkCondition::Slow {
            latency: Duration::from_millis(300)
        })
    );
}

#[test]
fn network_conditions() {
    for (yaml, expected) in [
        ("network: good", NetworkCondition::Good),
        ("network: offline", NetworkCondition::Offline),
        (
            "network:\n  flaky:\n    fail_every: 3",
            NetworkCondition::Flaky { fail_every: 3 },
        ),
    ] {
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.network, Some(expected), "{yaml}");
    }
}

#[test]
fn cancel_timeout() {
    let config = Config::from_yaml("offload:\n  timeout:\n    cancel: 30s").unwrap();

    assert_eq!(
        config.offload.timeout,
        TimeoutPolicy::Cancel(Duration::from_secs(30))
    );
}

#[test]
fn unknown_strategy_name_is_accepted() {
    let config = Config::from_yaml("strategy: made-up").unwrap();

    assert_eq!(config.initial_strategy(), "made-up");
}

#[test]
fn rejects_invalid_documents() {
    for yaml in [
        "default_strategy: made-up",
        "unknown_field: 1",
        "offload:\n  timeout:\n    warn: soon",
    ] {
        assert!(
            matches!(Config::from_yaml(yaml), Err(ConfigError::Yaml(_))),
            "{yaml}"
        );
    }
}

#[test]
fn rejects_empty_generation() {
    assert!(matches!(
        Config::from_yaml("generation: ''"),
        Err(ConfigError::EmptyGeneration)
    ));
    assert!(matches!(
        Config::builder().generation("  ").build(),
        Err(ConfigError::EmptyGeneration)
    ));
}
