//! Config validation: unknown-key detection with "did you mean" suggestions
//! and range checks on detection timings.
//!
//! The raw TOML is first walked as a `toml::Value` tree so typos can be
//! reported against the known key set; serde deserialization runs afterwards.
//! Unknown keys only ever warn.

use std::collections::HashSet;

use super::BoardConfig;
use super::defaults::AXIS_COUNT;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Every valid dotted key path of [`BoardConfig`].
///
/// Kept in step with the structs in `board_config.rs` by hand.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [detection]
        "detection",
        "detection.walking_hold_time",
        "detection.flamingo_hold_time",
        "detection.jump_display_time",
        "detection.user_absent_time",
        "detection.jump_absence_threshold_percent",
        // [device]
        "device",
        "device.path",
        "device.axis_count",
        "device.poll_interval_ms",
        // [output]
        "output",
        "output.kind",
        "output.jump_button",
        "output.jump_hold_ms",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Collect all dotted key paths of a `toml::Value` tree.
///
/// `{ a = { b = 1, c = 2 } }` yields `["a", "a.b", "a.c"]`.
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Suggestions
// ============================================================================

/// Edit distance between two keys (insert, delete, substitute).
fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a.chars().count();
    }

    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_chars.len()]
}

/// Closest known key within edit distance 3, if any.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|&k| (k, levenshtein(unknown, k)))
        .filter(|&(_, dist)| dist <= 3)
        .min_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)))
        .map(|(k, _)| k.to_string())
}

/// Warn about every key in `raw_toml` that the config does not know.
///
/// Parse errors are left for serde to report.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let Ok(value) = raw_toml.parse::<toml::Value>() else {
        return Vec::new();
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Range Validation
// ============================================================================

/// Check timings and thresholds on a parsed config.
///
/// Returns `(errors, warnings)`: errors must prevent startup, warnings are
/// logged and ignored.
pub fn validate_ranges(config: &BoardConfig) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let d = &config.detection;
    let durations = [
        ("detection.walking_hold_time", d.walking_hold_time),
        ("detection.flamingo_hold_time", d.flamingo_hold_time),
        ("detection.jump_display_time", d.jump_display_time),
        ("detection.user_absent_time", d.user_absent_time),
    ];
    for (name, secs) in durations {
        if !secs.is_finite() || secs <= 0.0 {
            errors.push(format!("{name} = {secs} must be a positive number of seconds"));
        } else if secs > 10.0 {
            warnings.push(ValidationWarning {
                field: name.to_string(),
                message: format!("{name} = {secs:.2}s is unusually long (typical 0.2-2s)"),
                suggestion: None,
            });
        }
    }

    let pct = d.jump_absence_threshold_percent;
    if !pct.is_finite() || pct <= 0.0 || pct >= 1.0 {
        errors.push(format!(
            "detection.jump_absence_threshold_percent = {pct} must be within (0, 1)"
        ));
    } else if pct >= 0.5 {
        // at 50% the near-minimum band reaches the midpoint used for stance detection
        warnings.push(ValidationWarning {
            field: "detection.jump_absence_threshold_percent".to_string(),
            message: format!(
                "detection.jump_absence_threshold_percent = {pct:.2} overlaps the one-foot midpoint"
            ),
            suggestion: None,
        });
    }

    if config.device.axis_count != AXIS_COUNT {
        errors.push(format!(
            "device.axis_count = {} is not supported (the board has {AXIS_COUNT} sensors)",
            config.device.axis_count
        ));
    }
    if config.device.poll_interval_ms == 0 {
        errors.push("device.poll_interval_ms must be > 0".to_string());
    }

    if d.user_absent_time.is_finite()
        && d.jump_display_time.is_finite()
        && d.user_absent_time > 0.0
        && d.user_absent_time < d.jump_display_time
    {
        // a new off-board episode can then reach User Absent while Jump is shown
        warnings.push(ValidationWarning {
            field: "detection.user_absent_time".to_string(),
            message: format!(
                "detection.user_absent_time = {:.2}s is shorter than detection.jump_display_time ({:.2}s); \
                 User Absent can cut a jump display short",
                d.user_absent_time, d.jump_display_time
            ),
            suggestion: None,
        });
    }

    let hold_secs = config.output.jump_hold_ms as f64 / 1000.0;
    if d.jump_display_time.is_finite() && hold_secs >= d.jump_display_time {
        warnings.push(ValidationWarning {
            field: "output.jump_hold_ms".to_string(),
            message: format!(
                "output.jump_hold_ms = {} outlasts detection.jump_display_time ({:.2}s)",
                config.output.jump_hold_ms, d.jump_display_time
            ),
            suggestion: None,
        });
    }

    (errors, warnings)
}
