//! Integration tests for the logging system

use bridge_traits::time::{ConsoleLogger, LogLevel, LoggerSink};
use core_runtime::logging::{init_logging, strip_path, LogFormat, LoggingConfig};
use std::sync::Arc;

#[test]
fn test_format_selection() {
    #[cfg(debug_assertions)]
    assert_eq!(LoggingConfig::default().format, LogFormat::Pretty);

    #[cfg(not(debug_assertions))]
    assert_eq!(LoggingConfig::default().format, LogFormat::Json);
}

#[test]
fn test_config_chaining() {
    let sink: Arc<dyn LoggerSink> = Arc::new(ConsoleLogger::default());
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Warn)
        .with_spans(false)
        .with_logger_sink(sink);

    assert_eq!(config.format, LogFormat::Compact);
    assert_eq!(config.level, LogLevel::Warn);
    assert!(!config.enable_spans);
    assert!(config.logger_sink.is_some());
    assert!(format!("{:?}", config).contains("has_logger_sink: true"));
}

#[test]
fn test_path_stripping_for_cache_files() {
    assert_eq!(
        strip_path("/Users/ana/Library/Caches/hymnal-core/sheet-music/PianoSheet_NewHymnal_en_001.png"),
        "PianoSheet_NewHymnal_en_001.png"
    );
    assert_eq!(strip_path("D:\\cache\\audio_cache\\1941_703.mp3"), "1941_703.mp3");
    assert_eq!(strip_path(""), "");
}

// Only one global subscriber may exist per process; this file holds the only
// test that installs one.
#[test]
fn test_global_init_only_once() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Error);

    assert!(init_logging(config.clone()).is_ok());
    tracing::error!(target: "core_runtime", "logging initialised");
    assert!(init_logging(config).is_err());
}

#[test]
fn test_invalid_filter_rejected_before_install() {
    let err = init_logging(LoggingConfig::default().with_filter("core_assets=loud")).unwrap_err();
    assert!(err.to_string().contains("Invalid log filter"));
}
