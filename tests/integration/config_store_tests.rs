//! Integration tests for configuration loading, key updates and storage.

use skyguard::adapters::memory_config::MemoryConfigStore;
use skyguard::app::ports::ConfigPort;
use skyguard::config::ConfigKey;
use skyguard::error::ConfigError;
use skyguard::MonitorConfig;

#[test]
fn json_uses_camel_case_keys_and_fills_defaults() {
    let cfg: MonitorConfig =
        serde_json::from_str(r#"{ "humidityMax": 80.0, "portIdentifier": "/dev/ttyS0" }"#)
            .unwrap();
    assert!((cfg.humidity_max - 80.0).abs() < f32::EPSILON);
    assert_eq!(cfg.port_identifier, "/dev/ttyS0");
    assert_eq!(cfg.baud_rate, 9600);
    assert!(cfg.validate().is_ok());
}

#[test]
fn apply_then_save_then_load() {
    let store = MemoryConfigStore::new();
    let mut cfg = store.load().unwrap();

    assert_eq!(cfg.apply("rainRatioMax", "0.8"), Ok(ConfigKey::RainRatioMax));
    assert_eq!(cfg.apply("traceEnabled", "true"), Ok(ConfigKey::TraceEnabled));
    store.save(&cfg).unwrap();

    let loaded = store.load().unwrap();
    assert!((loaded.rain_ratio_max - 0.8).abs() < f32::EPSILON);
    assert!(loaded.trace_enabled);
    assert!(loaded.thresholds().rain_ratio_max < 1.0);
}

#[test]
fn bad_updates_leave_config_untouched() {
    let mut cfg = MonitorConfig::default();
    assert_eq!(cfg.apply("colour", "blue"), Err(ConfigError::UnknownKey));
    assert_eq!(
        cfg.apply("humidityMax", "wet"),
        Err(ConfigError::InvalidValue("humidityMax"))
    );
    assert!(matches!(
        cfg.apply("humidityMax", "1e9"),
        Err(ConfigError::ValidationFailed(_))
    ));
    assert_eq!(cfg, MonitorConfig::default());
}
