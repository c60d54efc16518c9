//! Config Validation Tests
//!
//! Typo detection and range validation of the board config, exercised through
//! the public loading API.

use std::io::Write;

use balance_walker::config::validation::{
    known_config_keys, suggest_correction, validate_ranges, validate_unknown_keys,
};
use balance_walker::config::{BoardConfig, ConfigError, JumpButton, OutputKind};

// ============================================================================
// Typo Detection
// ============================================================================

#[test]
fn typo_in_detection_key_warns_with_suggestion() {
    let toml_str = r#"
[detection]
flamingo_hold_tme = 0.6
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1, "Expected exactly 1 warning");
    assert!(warnings[0].field.contains("flamingo_hold_tme"));
    assert_eq!(
        warnings[0].suggestion.as_deref(),
        Some("detection.flamingo_hold_time")
    );
}

#[test]
fn typo_in_section_name_warns() {
    let toml_str = r#"
[outptu]
kind = "keyboard"
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert!(warnings.iter().any(|w| w.field == "outptu"));
    assert!(warnings
        .iter()
        .any(|w| w.suggestion.as_deref() == Some("output")));
}

#[test]
fn valid_config_produces_zero_warnings() {
    let toml_str = r#"
[detection]
walking_hold_time = 0.4
flamingo_hold_time = 0.6
jump_display_time = 1.0
user_absent_time = 1.5
jump_absence_threshold_percent = 0.05

[device]
path = "/dev/input/js1"
axis_count = 4
poll_interval_ms = 5

[output]
kind = "virtual_joystick"
jump_button = "B"
jump_hold_ms = 80
"#;
    assert!(validate_unknown_keys(toml_str).is_empty());
    let config = BoardConfig::from_toml_str(toml_str).expect("valid config");
    assert_eq!(config.output.kind, OutputKind::VirtualJoystick);
    assert_eq!(config.output.jump_button, JumpButton::B);
    assert_eq!(config.device.path.as_deref(), Some(std::path::Path::new("/dev/input/js1")));
}

#[test]
fn unknown_keys_do_not_block_loading() {
    let config = BoardConfig::from_toml_str("[detection]\nwalkng_hold_time = 9.0\n")
        .expect("unknown keys only warn");
    // the misspelt key is ignored, the default stays
    assert_eq!(config.detection.walking_hold_time, 0.5);
}

#[test]
fn far_off_key_gets_no_suggestion() {
    let known = known_config_keys();
    assert!(suggest_correction("telemetry.endpoint", &known).is_none());
}

// ============================================================================
// Range Validation
// ============================================================================

#[test]
fn negative_duration_is_rejected() {
    let err = BoardConfig::from_toml_str("[detection]\nwalking_hold_time = -0.5\n").unwrap_err();
    match err {
        ConfigError::Validation(errors) => {
            assert!(errors.iter().any(|e| e.contains("walking_hold_time")));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn threshold_percent_must_be_a_fraction() {
    for bad in ["0.0", "1.0", "5.0"] {
        let toml_str = format!("[detection]\njump_absence_threshold_percent = {bad}\n");
        assert!(
            matches!(BoardConfig::from_toml_str(&toml_str), Err(ConfigError::Validation(_))),
            "{bad} should be rejected"
        );
    }
}

#[test]
fn wrong_axis_count_is_rejected() {
    let err = BoardConfig::from_toml_str("[device]\naxis_count = 6\n").unwrap_err();
    assert!(err.to_string().contains("axis_count"));
}

#[test]
fn suspicious_values_only_warn() {
    let mut config = BoardConfig::default();
    config.detection.user_absent_time = 30.0;
    config.output.jump_hold_ms = 2000;
    let (errors, warnings) = validate_ranges(&config);
    assert!(errors.is_empty(), "{errors:?}");
    assert!(warnings.iter().any(|w| w.field == "detection.user_absent_time"));
    assert!(warnings.iter().any(|w| w.field == "output.jump_hold_ms"));
}

#[test]
fn absent_time_shorter_than_jump_display_warns() {
    let mut config = BoardConfig::default();
    config.detection.jump_display_time = 1.0;
    config.detection.user_absent_time = 0.8;
    let (errors, warnings) = validate_ranges(&config);
    assert!(errors.is_empty(), "{errors:?}");
    assert!(warnings
        .iter()
        .any(|w| w.field == "detection.user_absent_time" && w.message.contains("jump_display_time")));

    // the defaults are equal, which is fine
    let (_, warnings) = validate_ranges(&BoardConfig::default());
    assert!(!warnings.iter().any(|w| w.field == "detection.user_absent_time"));
}

#[test]
fn unknown_output_kind_is_a_parse_error() {
    let err = BoardConfig::from_toml_str("[output]\nkind = \"mouse\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_, _)));
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn explicit_file_is_loaded() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[output]\njump_button = \"X\"").unwrap();
    let config = BoardConfig::load(Some(file.path())).expect("explicit config");
    assert_eq!(config.output.jump_button, JumpButton::X);
    assert_eq!(config.output.kind, OutputKind::Keyboard);
}

#[test]
fn invalid_explicit_file_is_an_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[detection]\nuser_absent_time = 0.0").unwrap();
    assert!(matches!(
        BoardConfig::load(Some(file.path())),
        Err(ConfigError::Validation(_))
    ));
}
