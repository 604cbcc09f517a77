//! Integration tests for logging setup.

use warden::config::LoggingConfig;
use warden::error::ErrorKind;
use warden::telemetry::init_logging;

#[test]
fn test_second_init_is_an_error() {
    let config = LoggingConfig {
        level: "warn".to_string(),
        format: "pretty".to_string(),
    };
    // Only one global subscriber can ever be installed.
    let _ = init_logging(&config);
    let err = init_logging(&LoggingConfig::default()).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Internal);
}
