//! Configuration layering tests: defaults → file → environment


use log_pattern_analyzer::domain::WindowGranularity;
use config::Map;
use log_pattern_analyzer::{load_config, load_config_with_env, AppError, ConfigError, LogAnalyzer};
use test_config::create_log_file;

#[test]
fn test_defaults_without_file() {
    let config = load_config(None).unwrap();
    assert_eq!(config.window_granularity, WindowGranularity::Hour);
    assert_eq!(config.burst_multiplier, 2.0);
    assert!(!config.signature_normalization_rules.is_empty());
}

#[test]
fn test_toml_file_overrides_defaults() {
    let toml = r#"
window_granularity = "15m"
burst_multiplier = 3.5

[clusters]
enabled = false
gap_seconds = 120
min_errors = 3
"#;
    let (_dir, path) = create_log_file("analyzer.toml", toml.as_bytes());

    let config = load_config(Some(&path)).unwrap();
    assert_eq!(config.window_granularity, WindowGranularity::Seconds(900));
    assert_eq!(config.burst_multiplier, 3.5);
    assert!(!config.clusters.enabled);
    // 未出现在文件中的键保持默认值
    assert_eq!(config.recommendations.max_listed, 3);
}

#[test]
fn test_json_file_with_custom_rules() {
    let json = r#"{
  "window_granularity": "minute",
  "signature_normalization_rules": [
    { "name": "order", "pattern": "ORD-\\d+", "replacement": "<ORDER>" }
  ]
}"#;
    let (_dir, path) = create_log_file("analyzer.json", json.as_bytes());

    let config = load_config(Some(&path)).unwrap();
    assert_eq!(config.window_granularity, WindowGranularity::Minute);
    assert_eq!(config.signature_normalization_rules.len(), 1);

    let report = LogAnalyzer::new(config)
        .unwrap()
        .analyze_lines(["2024-01-01T10:00:00Z ERROR payment failed for ORD-991"]);
    assert_eq!(report.top_signatures[0].pattern, "payment failed for <ORDER>");
}

#[test]
fn test_zero_window_is_rejected() {
    let (_dir, path) = create_log_file("analyzer.toml", b"window_granularity = \"0s\"\n");
    assert!(load_config(Some(&path)).is_err());
}

#[test]
fn test_negative_multiplier_is_config_error() {
    let (_dir, path) = create_log_file("analyzer.toml", b"burst_multiplier = -1.0\n");

    let error: AppError = load_config(Some(&path)).unwrap_err().into();
    assert!(error.is_config_error());
    assert_eq!(error.exit_code(), 2);
}

#[test]
fn test_invalid_line_pattern_fails_before_processing() {
    let (_dir, path) = create_log_file("analyzer.toml", b"line_pattern = \"(?P<timestamp>\"\n");

    let config = load_config(Some(&path)).unwrap();
    assert!(matches!(
        LogAnalyzer::new(config),
        Err(ConfigError::InvalidPattern { .. })
    ));
}

#[test]
fn test_effective_config_round_trips_through_toml() {
    let config = load_config_with_env(None, Some(Map::new())).unwrap();
    let toml = config.to_toml().unwrap();
    let (_dir, path) = create_log_file("effective.toml", toml.as_bytes());

    assert_eq!(
        load_config_with_env(Some(&path), Some(Map::new())).unwrap(),
        config
    );
}

#[test]
fn test_environment_overrides_file() {
    let (_dir, path) = create_log_file("analyzer.toml", b"top_signatures = 3\nburst_multiplier = 2.5\n");

    let env = Map::from([
        ("LOG_ANALYZER_TOP_SIGNATURES".to_string(), "7".to_string()),
        ("LOG_ANALYZER_CLUSTERS__MIN_ERRORS".to_string(), "9".to_string()),
        ("UNRELATED_VARIABLE".to_string(), "1".to_string()),
    ]);
    let config = load_config_with_env(Some(&path), Some(env)).unwrap();

    assert_eq!(config.top_signatures, 7);
    assert_eq!(config.clusters.min_errors, 9);
    assert_eq!(config.burst_multiplier, 2.5);
}

#[test]
fn test_invalid_environment_value_is_config_error() {
    let env = Map::from([(
        "LOG_ANALYZER_BURST_MULTIPLIER".to_string(),
        "-3".to_string(),
    )]);
    let error: AppError = load_config_with_env(None, Some(env)).unwrap_err().into();
    assert_eq!(error.exit_code(), 2);
}
