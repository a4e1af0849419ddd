use std::collections::HashMap;

use read_along_lib::{EngineConfig, HighlightConfig, ReadAlongError};

#[test]
fn test_defaults() {
    let config = EngineConfig::default();
    assert_eq!(config.playback.seek_suppression_ms, 120.0);
    assert_eq!(config.playback.end_grace_ms, 1500.0);
    assert_eq!(config.playback.seek_end_epsilon_sec, 0.1);
    assert_eq!(config.playback.max_forward_scan, 8);
    assert_eq!(config.highlight.mutation_debounce_ms, 150.0);
    assert_eq!(config.highlight.click_resume_delay_ms, 60.0);
    assert!(config.compose.hide_tags);
}

#[test]
fn test_partial_json_keeps_defaults() {
    let config = EngineConfig::from_json(r#"{"playback": {"end_grace_ms": 900}}"#).unwrap();

    assert_eq!(config.playback.end_grace_ms, 900.0);
    assert_eq!(config.playback.seek_suppression_ms, 120.0);
    assert_eq!(config.highlight, HighlightConfig::default());
}

#[test]
fn test_invalid_json_is_config_error() {
    let err = EngineConfig::from_json("{not json").unwrap_err();
    assert!(matches!(err, ReadAlongError::Config(_)));
}

#[test]
fn test_end_grace_raised_to_suppression_window() {
    let config = EngineConfig::from_json(
        r#"{"playback": {"seek_suppression_ms": 400, "end_grace_ms": 100}}"#,
    )
    .unwrap();
    assert_eq!(config.playback.end_grace_ms, 400.0);
}

#[test]
fn test_overrides() {
    let vars: HashMap<&str, &str> = [
        ("APP_SEEK_SUPPRESSION_MS", "200"),
        ("APP_MAX_FORWARD_SCAN", " 4 "),
        ("APP_CLICK_RESUME_DELAY_MS", "abc"),
        ("APP_END_GRACE_MS", "-5"),
        ("APP_HIDE_TAGS", "off"),
    ]
    .into_iter()
    .collect();

    let mut config = EngineConfig::default();
    config.apply_overrides("APP_", |key| vars.get(key).map(|v| v.to_string()));

    assert_eq!(config.playback.seek_suppression_ms, 200.0);
    assert_eq!(config.playback.max_forward_scan, 4);
    assert_eq!(config.highlight.click_resume_delay_ms, 60.0);
    assert_eq!(config.playback.end_grace_ms, 1500.0);
    assert!(!config.compose.hide_tags);
}

#[test]
fn test_unknown_bool_override_ignored() {
    let mut config = EngineConfig::default();
    config.apply_overrides("X_", |key| (key == "X_HIDE_TAGS").then(|| "maybe".to_string()));
    assert!(config.compose.hide_tags);
}

#[test]
fn test_error_user_messages() {
    use read_along_lib::{MediaError, MediaErrorKind};

    let network = MediaError::new(Some(2), "MEDIA_ERR_NETWORK");
    assert_eq!(network.kind(), MediaErrorKind::Network);
    assert_eq!(MediaError::new(None, "x").kind(), MediaErrorKind::Unknown);

    let err = ReadAlongError::from(network);
    assert_eq!(err.user_message(), "The narration audio could not be loaded. Check your connection.");
    assert_eq!(
        serde_json::to_string(&err).unwrap(),
        "\"Media: MEDIA_ERR_NETWORK (code Some(2))\""
    );
}
