#![forbid(unsafe_code)]

//! Engine configuration as data.
//!
//! One [`EngineConfig`] groups every tunable of the engine and can be loaded
//! from TOML or JSON at startup.
//!
//! # Loading
//!
//! ```toml
//! # chartnav.toml
//! [audio]
//! volume = 70
//! min_frequency = 200.0
//!
//! [text]
//! mode = "terse"
//!
//! [autoplay]
//! default_interval_ms = 200
//! ```
//!
//! ```rust,ignore
//! let config = EngineConfig::from_toml_file("chartnav.toml")?;
//! let config = EngineConfig::from_json_str(json)?;
//! ```
//!
//! # Defaults
//!
//! Every field defaults to the value the engine uses without configuration,
//! so `EngineConfig::default()` and an empty document behave the same.

use std::path::Path;

use serde::{Deserialize, Serialize};

use chartnav_audio::AudioSettings;
use chartnav_modality::TextMode;

use crate::error::{EngineError, Result};

// ---------------------------------------------------------------------------
// Top-level EngineConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub audio: AudioSettings,
    pub text: TextConfig,
    pub braille: BrailleConfig,
    pub autoplay: AutoplayConfig,
    pub marks: MarksConfig,
}

impl EngineConfig {
    /// Parse a TOML document.
    ///
    /// # Errors
    ///
    /// [`EngineError::Toml`] on malformed input.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(EngineError::Toml)
    }

    /// Read and parse a TOML file.
    ///
    /// # Errors
    ///
    /// [`EngineError::Io`] when the file cannot be read, otherwise as
    /// [`EngineConfig::from_toml_str`].
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Parse a JSON document.
    ///
    /// # Errors
    ///
    /// [`EngineError::Json`] on malformed input.
    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(EngineError::Json)
    }

    /// Read and parse a JSON file.
    ///
    /// # Errors
    ///
    /// [`EngineError::Io`] when the file cannot be read, otherwise as
    /// [`EngineConfig::from_json_str`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Validation messages for every section; empty when usable.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = self.audio.validate();
        errors.extend(self.autoplay.validate());
        errors.extend(self.marks.validate());
        errors
    }

    /// `self` if valid.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidConfig`] listing every problem.
    pub fn validated(self) -> Result<Self> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(EngineError::InvalidConfig(errors))
        }
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Initial text mode.
    pub mode: TextMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BrailleConfig {
    /// Start with braille output on.
    pub enabled: bool,
}

/// Autoplay pacing. Intervals are per step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoplayConfig {
    /// Interval used when the trace gives no better estimate.
    pub default_interval_ms: u64,
    /// Fastest interval reachable with speed-up.
    pub min_interval_ms: u64,
    /// Slowest interval reachable with speed-down.
    pub max_interval_ms: u64,
    /// Change applied by one speed-up or speed-down.
    pub step_ms: u64,
    /// Target time for a whole run; the interval is this over the step count.
    pub total_duration_ms: u64,
}

impl Default for AutoplayConfig {
    fn default() -> Self {
        Self {
            default_interval_ms: 250,
            min_interval_ms: 50,
            max_interval_ms: 500,
            step_ms: 20,
            total_duration_ms: 4000,
        }
    }
}

impl AutoplayConfig {
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.min_interval_ms == 0 || self.min_interval_ms > self.max_interval_ms {
            errors.push(format!(
                "autoplay.min_interval_ms must be in 1..=max_interval_ms, got {} / {}",
                self.min_interval_ms, self.max_interval_ms
            ));
        }
        if self.step_ms == 0 {
            errors.push("autoplay.step_ms must be > 0".to_owned());
        }
        if self.total_duration_ms == 0 {
            errors.push("autoplay.total_duration_ms must be > 0".to_owned());
        }
        errors
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarksConfig {
    /// Whether marks are written to storage.
    pub persist: bool,
    /// Storage key prefix; the figure id is appended.
    pub key_prefix: String,
}

impl Default for MarksConfig {
    fn default() -> Self {
        Self {
            persist: true,
            key_prefix: "chartnav.marks".to_owned(),
        }
    }
}

impl MarksConfig {
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        if self.persist && self.key_prefix.trim().is_empty() {
            vec!["marks.key_prefix must not be empty when persist is on".to_owned()]
        } else {
            Vec::new()
        }
    }

    /// Storage key of the marks of `figure_id`.
    #[must_use]
    pub fn key(&self, figure_id: &str) -> String {
        format!("{}.{figure_id}", self.key_prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(EngineConfig::default().validate().is_empty());
    }

    #[test]
    fn empty_documents_are_defaults() {
        assert_eq!(EngineConfig::from_toml_str("").unwrap(), EngineConfig::default());
        assert_eq!(EngineConfig::from_json_str("{}").unwrap(), EngineConfig::default());
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let config = EngineConfig::from_toml_str(
            r#"
            [audio]
            volume = 80

            [text]
            mode = "terse"

            [autoplay]
            step_ms = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.audio.volume, 80);
        assert_eq!(config.audio.max_frequency, 1000.0);
        assert_eq!(config.text.mode, TextMode::Terse);
        assert_eq!(config.autoplay.step_ms, 10);
        assert_eq!(config.autoplay.default_interval_ms, 250);
    }

    #[test]
    fn json_file_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chartnav.json");
        std::fs::write(&path, r#"{"braille": {"enabled": true}}"#).unwrap();
        let config = EngineConfig::from_json_file(&path).unwrap();
        assert!(config.braille.enabled);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = EngineConfig::from_toml_file("/nonexistent/chartnav.toml").unwrap_err();
        assert!(matches!(err, EngineError::Io(_)));
    }

    #[test]
    fn malformed_toml_is_toml_error() {
        assert!(matches!(
            EngineConfig::from_toml_str("[audio"),
            Err(EngineError::Toml(_))
        ));
    }

    #[test]
    fn validate_catches_inverted_band() {
        let mut config = EngineConfig::default();
        config.audio.min_frequency = 2000.0;
        config.autoplay.min_interval_ms = 900;
        let errors = config.validate();
        assert_eq!(errors.len(), 2, "{errors:?}");
        assert!(matches!(config.validated(), Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn marks_key_appends_figure() {
        assert_eq!(MarksConfig::default().key("fig-1"), "chartnav.marks.fig-1");
    }
}
