//! Global settings loaded from TOML.
//!
//! - `init_custom(toml_content)` sets a custom TOML before first `settings()` call
//! - `settings()` returns `&'static Settings` (lazy-init singleton)
//! - Default values are embedded via `include_str!("default_settings.toml")`

use std::sync::OnceLock;

use serde::Deserialize;

use crate::suggest::CorrectionMode;

pub const DEFAULT_SETTINGS_TOML: &str = include_str!("default_settings.toml");

/// Upper bound accepted for `suggest.max_suggestions`.
pub const MAX_SUGGESTIONS_LIMIT: usize = 100;

static CUSTOM_TOML: OnceLock<String> = OnceLock::new();

/// Set custom TOML before first `settings()` call.
pub fn init_custom(toml_content: String) -> Result<(), SettingsError> {
    parse_settings_toml(&toml_content)?;
    CUSTOM_TOML
        .set(toml_content)
        .map_err(|_| SettingsError::AlreadyInitialized)
}

/// Get or initialize the global settings singleton.
pub fn settings() -> &'static Settings {
    static INSTANCE: OnceLock<Settings> = OnceLock::new();
    INSTANCE.get_or_init(|| {
        let toml_str = CUSTOM_TOML
            .get()
            .map(|s| s.as_str())
            .unwrap_or(DEFAULT_SETTINGS_TOML);
        parse_settings_toml(toml_str).expect("settings TOML must be valid")
    })
}

/// Returns the embedded default settings TOML content.
pub fn default_toml() -> &'static str {
    DEFAULT_SETTINGS_TOML
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("settings already initialized")]
    AlreadyInitialized,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub suggest: SuggestSettings,
    pub scoring: ScoringSettings,
    pub learning: LearningSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SuggestSettings {
    pub max_suggestions: usize,
    pub max_bigram_suggestions: usize,
    pub correction_mode: CorrectionMode,
    /// How many leading suggestions are checked for auto-text expansions.
    pub autotext_max: usize,
}

/// Empirically tuned scoring constants of the fuzzy search and the collector.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringSettings {
    /// Search depth limit as a multiple of the number of keystrokes.
    pub depth_factor: usize,
    pub primary_attenuation: i64,
    pub alternate_attenuation: i64,
    pub full_word_multiplier: i64,
    pub bigram_multiplier_min: f64,
    pub bigram_multiplier_max: f64,
    pub maximum_bigram_frequency: i64,
    /// Minimum accumulated bigram frequency returned by reverse lookup.
    pub bigram_suggest_threshold: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LearningSettings {
    /// Row cap of the persisted learning stores.
    pub max_rows: usize,
    /// Rows dropped (oldest first) once `max_rows` is exceeded.
    pub prune_rows: usize,
}

pub fn parse_settings_toml(toml_str: &str) -> Result<Settings, SettingsError> {
    let s: Settings = toml::from_str(toml_str).map_err(|e| SettingsError::Parse(e.to_string()))?;
    validate(&s)?;
    Ok(s)
}

fn validate(s: &Settings) -> Result<(), SettingsError> {
    macro_rules! check_positive {
        ($section:ident . $field:ident) => {
            if s.$section.$field <= Default::default() {
                return Err(SettingsError::InvalidValue {
                    field: concat!(stringify!($section), ".", stringify!($field)).to_string(),
                    reason: "must be positive".to_string(),
                });
            }
        };
    }

    check_positive!(suggest.max_suggestions);
    check_positive!(suggest.max_bigram_suggestions);
    if s.suggest.max_suggestions > MAX_SUGGESTIONS_LIMIT {
        return Err(SettingsError::InvalidValue {
            field: "suggest.max_suggestions".to_string(),
            reason: format!("must be at most {MAX_SUGGESTIONS_LIMIT}"),
        });
    }

    check_positive!(scoring.depth_factor);
    check_positive!(scoring.primary_attenuation);
    check_positive!(scoring.alternate_attenuation);
    check_positive!(scoring.full_word_multiplier);
    check_positive!(scoring.maximum_bigram_frequency);
    check_positive!(scoring.bigram_suggest_threshold);
    if s.scoring.bigram_multiplier_min < 1.0
        || s.scoring.bigram_multiplier_max < s.scoring.bigram_multiplier_min
    {
        return Err(SettingsError::InvalidValue {
            field: "scoring.bigram_multiplier_min".to_string(),
            reason: "must satisfy 1.0 <= min <= max".to_string(),
        });
    }

    check_positive!(learning.max_rows);
    if s.learning.prune_rows == 0 || s.learning.prune_rows > s.learning.max_rows {
        return Err(SettingsError::InvalidValue {
            field: "learning.prune_rows".to_string(),
            reason: "must be in 1..=max_rows".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_section(section: &str, replacement: &str) -> String {
        DEFAULT_SETTINGS_TOML.replace(section, replacement)
    }

    #[test]
    fn parse_default_toml() {
        let s = parse_settings_toml(DEFAULT_SETTINGS_TOML).unwrap();
        assert_eq!(s.suggest.max_suggestions, 12);
        assert_eq!(s.suggest.max_bigram_suggestions, 60);
        assert_eq!(s.suggest.correction_mode, CorrectionMode::FullBigram);
        assert_eq!(s.suggest.autotext_max, 6);
        assert_eq!(s.scoring.depth_factor, 3);
        assert_eq!(s.scoring.primary_attenuation, 2);
        assert_eq!(s.scoring.alternate_attenuation, 1);
        assert_eq!(s.scoring.full_word_multiplier, 2);
        assert!((s.scoring.bigram_multiplier_min - 1.2).abs() < f64::EPSILON);
        assert!((s.scoring.bigram_multiplier_max - 1.5).abs() < f64::EPSILON);
        assert_eq!(s.scoring.maximum_bigram_frequency, 127);
        assert_eq!(s.scoring.bigram_suggest_threshold, 12);
        assert_eq!(s.learning.max_rows, 10_000);
        assert_eq!(s.learning.prune_rows, 1_000);
    }

    #[test]
    fn default_toml_matches_embedded() {
        assert_eq!(default_toml(), DEFAULT_SETTINGS_TOML);
    }

    #[test]
    fn parse_correction_modes() {
        for (name, mode) in [
            ("none", CorrectionMode::None),
            ("basic", CorrectionMode::Basic),
            ("full", CorrectionMode::Full),
        ] {
            let toml = with_section(
                "correction_mode = \"full_bigram\"",
                &format!("correction_mode = \"{name}\""),
            );
            let s = parse_settings_toml(&toml).unwrap();
            assert_eq!(s.suggest.correction_mode, mode);
        }
    }

    #[test]
    fn error_zero_max_suggestions() {
        let toml = with_section("max_suggestions = 12", "max_suggestions = 0");
        let err = parse_settings_toml(&toml).unwrap_err();
        assert!(matches!(err, SettingsError::InvalidValue { .. }));
        assert!(err.to_string().contains("suggest.max_suggestions"));
    }

    #[test]
    fn error_too_many_suggestions() {
        let toml = with_section("max_suggestions = 12", "max_suggestions = 101");
        let err = parse_settings_toml(&toml).unwrap_err();
        assert!(err.to_string().contains("at most 100"));
    }

    #[test]
    fn error_inverted_bigram_multipliers() {
        let toml = with_section("bigram_multiplier_max = 1.5", "bigram_multiplier_max = 1.1");
        let err = parse_settings_toml(&toml).unwrap_err();
        assert!(err.to_string().contains("scoring.bigram_multiplier_min"));
    }

    #[test]
    fn error_prune_larger_than_cap() {
        let toml = with_section("prune_rows = 1000", "prune_rows = 20000");
        let err = parse_settings_toml(&toml).unwrap_err();
        assert!(err.to_string().contains("learning.prune_rows"));
    }

    #[test]
    fn error_unknown_correction_mode() {
        let toml = with_section(
            "correction_mode = \"full_bigram\"",
            "correction_mode = \"aggressive\"",
        );
        let err = parse_settings_toml(&toml).unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn error_invalid_toml() {
        let err = parse_settings_toml("not valid toml {{{").unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn error_missing_section() {
        let toml = r#"
[suggest]
max_suggestions = 12
max_bigram_suggestions = 60
correction_mode = "full"
autotext_max = 6
"#;
        let err = parse_settings_toml(toml).unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }
}
