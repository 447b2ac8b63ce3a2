//! Integration tests for logging setup
//!
//! The global subscriber can be installed once per process, so a single test
//! covers installation and the second attempt.

#![allow(clippy::unwrap_used)]

use kronika_observability::{
    init_tracing_with_config, LogConfig, LogError, LogFormat, LogOutput,
};

#[test]
fn test_config_builder_chaining() {
    let config = LogConfig::new()
        .with_format(LogFormat::Json)
        .with_level("debug")
        .with_timestamps(false)
        .with_color(false)
        .with_targets(false)
        .with_span_timings(true)
        .with_output(LogOutput::Stdout);

    assert_eq!(config.format, LogFormat::Json);
    assert_eq!(config.level.as_deref(), Some("debug"));
    assert!(!config.use_timestamps);
    assert!(!config.use_color);
    assert!(!config.include_targets);
    assert!(config.span_timings);
    assert_eq!(config.output, LogOutput::Stdout);
}

#[test]
fn test_format_deserializes_from_config_text() {
    let format: LogFormat = serde_json::from_str("\"compact\"").unwrap();
    assert_eq!(format, LogFormat::Compact);
    assert!(serde_json::from_str::<LogFormat>("\"xml\"").is_err());
}

#[test]
fn test_second_initialization_is_an_error() {
    let config = LogConfig::new()
        .with_format(LogFormat::Compact)
        .with_level("warn")
        .with_color(false);
    init_tracing_with_config(config.clone()).unwrap();

    let err = init_tracing_with_config(config).unwrap_err();
    assert!(matches!(err, LogError::AlreadyInitialized(_)));
}

#[test]
fn test_bad_filter_fails_before_install() {
    let err = init_tracing_with_config(LogConfig::new().with_level("x=notalevel")).unwrap_err();
    assert!(matches!(err, LogError::InvalidFilter { .. }));
}
