//! Highlighting configuration.
//!
//! ## Learning: Serde for Serialization
//!
//! `#[derive(Serialize, Deserialize)]` generates the TOML mapping, and
//! `#[serde(default)]` fills missing fields from `Default::default()`, so a
//! config file only needs the keys the user actually changed:
//!
//! ```toml
//! excluded_file_types = ["markdown"]
//!
//! [pairs]
//! angle = false
//!
//! [colors]
//! theme = "light"
//! ```

use prism_match::{ActivePairs, BracketMatcher, MatchOptions, NestingScope, PairKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::color::{ColorRamp, DEFAULT_DARK, DEFAULT_LIGHT};

/// Main configuration. Read fresh on every highlight pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Global on/off switch
    pub enabled: bool,

    /// Which bracket families are matched
    pub pairs: PairToggles,

    /// Per-level colors
    pub colors: ColorConfig,

    /// File types that are never highlighted (case-insensitive)
    pub excluded_file_types: Vec<String>,

    /// Ignore brackets inside comments and strings
    pub skip_non_structural: bool,

    /// How nesting levels are counted
    pub nesting: NestingScope,
}

impl Config {
    /// Loads config from the default location, falling back to defaults.
    pub fn load() -> Self {
        match Self::load_from_default_path() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Using default config: {}", e);
                Self::default()
            }
        }
    }

    /// Loads config from a file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Loads from the default config path.
    fn load_from_default_path() -> Result<Self, ConfigError> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Returns the default config file path.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("prism").join("config.toml"))
    }

    /// Saves the config to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(Self::default_path()?)
    }

    /// Saves the config to a specific file.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Enabled pairs in scan order.
    pub fn active_pairs(&self) -> ActivePairs {
        self.pairs.active()
    }

    /// Matcher options derived from this config.
    pub fn match_options(&self) -> MatchOptions {
        MatchOptions {
            skip_non_structural: self.skip_non_structural,
            nesting: self.nesting,
        }
    }

    /// A matcher set up with the enabled pairs and options.
    pub fn matcher(&self) -> BracketMatcher {
        BracketMatcher::new(self.active_pairs(), self.match_options())
    }

    /// Color ramp for the configured theme.
    pub fn ramp(&self) -> ColorRamp {
        self.colors.ramp()
    }

    /// Returns true if `file_type` is in the exclusion list.
    pub fn is_excluded(&self, file_type: &str) -> bool {
        let file_type = file_type.trim();
        self.excluded_file_types
            .iter()
            .any(|excluded| excluded.trim().eq_ignore_ascii_case(file_type))
    }

    /// Replaces the exclusion list from a comma-separated string such as
    /// `"Markdown, txt"`.
    pub fn set_excluded_from_str(&mut self, list: &str) {
        self.excluded_file_types = list
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: true,
            pairs: PairToggles::default(),
            colors: ColorConfig::default(),
            excluded_file_types: Vec::new(),
            skip_non_structural: true,
            nesting: NestingScope::default(),
        }
    }
}

/// Independent toggles for each bracket family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairToggles {
    pub round: bool,
    pub curly: bool,
    pub angle: bool,
    pub square: bool,
}

impl PairToggles {
    pub fn is_enabled(&self, kind: PairKind) -> bool {
        match kind {
            PairKind::Round => self.round,
            PairKind::Curly => self.curly,
            PairKind::Angle => self.angle,
            PairKind::Square => self.square,
        }
    }

    pub fn active(&self) -> ActivePairs {
        ActivePairs::from_kinds(PairKind::ALL.into_iter().filter(|&k| self.is_enabled(k)))
    }
}

impl Default for PairToggles {
    fn default() -> Self {
        Self {
            round: true,
            curly: true,
            angle: true,
            square: true,
        }
    }
}

/// Light/dark theme selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

/// Color configuration. Ramps are stored as hex strings so that one bad
/// entry in a hand-edited file doesn't reject the whole config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    /// Which ramp is active
    pub theme: Theme,

    /// Light theme colors, one per nesting level
    pub light: Vec<String>,

    /// Dark theme colors, one per nesting level
    pub dark: Vec<String>,
}

impl ColorConfig {
    pub fn ramp(&self) -> ColorRamp {
        self.ramp_for(self.theme)
    }

    pub fn ramp_for(&self, theme: Theme) -> ColorRamp {
        match theme {
            Theme::Light => ColorRamp::from_hex(&self.light, &DEFAULT_LIGHT),
            Theme::Dark => ColorRamp::from_hex(&self.dark, &DEFAULT_DARK),
        }
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            light: DEFAULT_LIGHT.iter().map(ToString::to_string).collect(),
            dark: DEFAULT_DARK.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config directory not found")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.enabled);
        assert!(config.skip_non_structural);
        assert_eq!(config.nesting, NestingScope::PerFamily);
        assert_eq!(config.active_pairs().len(), 4);
        assert_eq!(config.colors.light[0], "#FF69B4");
        assert_eq!(config.colors.dark[5], "#1978D2");
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            excluded_file_types = ["Markdown"]
            nesting = "shared"

            [pairs]
            angle = false

            [colors]
            theme = "light"
            "#,
        )
        .unwrap();

        assert!(config.enabled);
        assert!(!config.pairs.angle);
        assert!(config.pairs.round);
        assert_eq!(config.nesting, NestingScope::Shared);
        assert!(!config.active_pairs().contains(PairKind::Angle));
        let matcher = config.matcher();
        assert!(!matcher.pairs().contains(PairKind::Angle));
        assert_eq!(matcher.options().nesting, NestingScope::Shared);
        assert_eq!(config.ramp().color_for(0), Color::rgb(0xFF, 0x69, 0xB4));
    }

    #[test]
    fn test_exclusion_is_case_insensitive() {
        let mut config = Config::default();
        config.set_excluded_from_str(" Markdown, TXT ,, ");
        assert_eq!(config.excluded_file_types, vec!["markdown", "txt"]);
        assert!(config.is_excluded("markdown"));
        assert!(config.is_excluded("MARKDOWN"));
        assert!(config.is_excluded("txt"));
        assert!(!config.is_excluded("rust"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.enabled = false;
        config.colors.theme = Theme::Light;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = Config::load_from(dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "enabled = \"yes\"").unwrap();
        assert!(matches!(Config::load_from(&bad), Err(ConfigError::Parse(_))));
    }
}
