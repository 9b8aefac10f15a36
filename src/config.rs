//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/outliner/outliner.toml`
//! 3. Local config: file passed with `--config`
//! 4. Environment variables: `OUTLINER_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::format::{ExportOptions, FormatKind};
use crate::application::ApplicationError;

/// Default width of the adoption zone at the left edge of a drop target.
pub const DEFAULT_ZONE_WIDTH: f64 = 50.0;

/// Raw export options; `None` means "not specified, inherit".
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawExportOptions {
    pub json_pretty: Option<bool>,
    pub markdown_indent: Option<usize>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub format: Option<FormatKind>,
    pub zone_width: Option<f64>,
    pub export: RawExportOptions,
}

/// Unified configuration for outliner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Format used when a file extension says nothing
    pub format: FormatKind,
    /// Adoption zone width for drop classification
    pub zone_width: f64,
    /// Codec output options
    pub export: ExportOptions,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            format: FormatKind::default(),
            zone_width: DEFAULT_ZONE_WIDTH,
            export: ExportOptions::default(),
        }
    }
}

/// Get the XDG config directory for outliner.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "outliner").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("outliner.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            format: overlay.format.unwrap_or(self.format),
            zone_width: overlay.zone_width.unwrap_or(self.zone_width),
            export: ExportOptions {
                json_pretty: overlay
                    .export
                    .json_pretty
                    .unwrap_or(self.export.json_pretty),
                markdown_indent: overlay
                    .export
                    .markdown_indent
                    .unwrap_or(self.export.markdown_indent),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local` - Optional config file given on the command line; it must exist
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/outliner/outliner.toml`
    /// 3. Local config file
    /// 4. Environment variables: `OUTLINER_*` prefix
    pub fn load(local: Option<&Path>) -> Result<Self, ApplicationError> {
        let global = global_config_path().filter(|path| path.exists());
        Self::load_from(global.as_deref(), local)
    }

    /// Layered loading with an explicit global file (None skips that layer).
    pub fn load_from(global: Option<&Path>, local: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global {
            debug!("Loading global config: {}", global_path.display());
            current = current.merge_with(&load_raw_settings(global_path)?);
        }

        if let Some(local_path) = local {
            debug!("Loading local config: {}", local_path.display());
            current = current.merge_with(&load_raw_settings(local_path)?);
        }

        current = Self::apply_env_overrides(current)?;
        current.validate()?;
        Ok(current)
    }

    /// Apply OUTLINER_* environment variables as explicit overrides.
    fn apply_env_overrides(settings: Self) -> Result<Self, ApplicationError> {
        Self::apply_env(settings, environment())
    }

    fn apply_env(mut settings: Self, env: Environment) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(env)
            .build()
            .map_err(config_err)?;

        if let Some(val) = env_value(config.get_string("format"), "OUTLINER_FORMAT")? {
            settings.format = val.parse().map_err(|e: String| ApplicationError::Config {
                message: format!("OUTLINER_FORMAT: {e}"),
            })?;
        }
        if let Some(val) = env_value(config.get_float("zone_width"), "OUTLINER_ZONE_WIDTH")? {
            settings.zone_width = val;
        }
        if let Some(val) = env_value(
            config.get_bool("export.json_pretty"),
            "OUTLINER_EXPORT__JSON_PRETTY",
        )? {
            settings.export.json_pretty = val;
        }
        if let Some(val) = env_value(
            config.get_int("export.markdown_indent"),
            "OUTLINER_EXPORT__MARKDOWN_INDENT",
        )? {
            settings.export.markdown_indent =
                usize::try_from(val).map_err(|_| ApplicationError::Config {
                    message: format!("OUTLINER_EXPORT__MARKDOWN_INDENT: invalid value {val}"),
                })?;
        }

        Ok(settings)
    }

    fn validate(&self) -> Result<(), ApplicationError> {
        if !self.zone_width.is_finite() || self.zone_width < 0.0 {
            return Err(ApplicationError::Config {
                message: format!("zone_width must be a non-negative number, got {}", self.zone_width),
            });
        }
        Ok(())
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# outliner configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/outliner/outliner.toml
#   Local:  file passed with --config
#   Env:    OUTLINER_* environment variables (OUTLINER_EXPORT__JSON_PRETTY=false)

# Format used when the file extension does not decide it: "json", "markdown" or "opml"
# format = "json"

# Width of the adoption zone at the left edge of a drop target
# zone_width = 50.0

[export]
# Pretty-print JSON output
# json_pretty = true

# Spaces per nesting level in Markdown output (2 to 4)
# markdown_indent = 2
"#
        .to_string()
    }
}

fn environment() -> Environment {
    Environment::with_prefix("OUTLINER")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

/// An absent key is `None`; a present key of the wrong type is an error.
fn env_value<T>(result: Result<T, ConfigError>, var: &str) -> Result<Option<T>, ApplicationError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(ApplicationError::Config {
            message: format!("{var}: {e}"),
        }),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let source: config::Map<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        environment().source(Some(source))
    }

    #[test]
    fn given_no_files_when_loading_then_uses_defaults() {
        let settings = Settings::load_from(None, None).expect("load defaults");
        assert_eq!(settings.format, FormatKind::Json);
        assert_eq!(settings.zone_width, DEFAULT_ZONE_WIDTH);
        assert!(settings.export.json_pretty);
        assert_eq!(settings.export.markdown_indent, 2);
    }

    #[test]
    fn given_partial_overlay_when_merging_then_unspecified_fields_are_kept() {
        let base = Settings::default();
        let overlay = RawSettings {
            format: Some(FormatKind::Markdown),
            zone_width: None,
            export: RawExportOptions {
                json_pretty: Some(false),
                markdown_indent: None,
            },
        };

        let merged = base.merge_with(&overlay);

        assert_eq!(merged.format, FormatKind::Markdown);
        assert_eq!(merged.zone_width, DEFAULT_ZONE_WIDTH);
        assert!(!merged.export.json_pretty);
        assert_eq!(merged.export.markdown_indent, 2);
    }

    #[test]
    fn given_negative_zone_width_when_validating_then_config_error() {
        let settings = Settings {
            zone_width: -1.0,
            ..Settings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ApplicationError::Config { .. })
        ));
    }

    #[test]
    fn given_template_when_parsed_then_is_valid_toml() {
        let raw: RawSettings = toml::from_str(&Settings::template()).expect("parse template");
        assert!(raw.format.is_none());
        assert!(raw.export.json_pretty.is_none());
    }

    #[test]
    fn given_well_formed_env_when_applying_then_overrides_win() {
        let vars = env(&[
            ("OUTLINER_FORMAT", "markdown"),
            ("OUTLINER_ZONE_WIDTH", "30.5"),
            ("OUTLINER_EXPORT__JSON_PRETTY", "false"),
            ("OUTLINER_EXPORT__MARKDOWN_INDENT", "4"),
        ]);

        let settings = Settings::apply_env(Settings::default(), vars).expect("apply env");

        assert_eq!(settings.format, FormatKind::Markdown);
        assert_eq!(settings.zone_width, 30.5);
        assert!(!settings.export.json_pretty);
        assert_eq!(settings.export.markdown_indent, 4);
    }

    #[test]
    fn given_no_matching_env_when_applying_then_settings_unchanged() {
        let vars = env(&[("OTHER_ZONE_WIDTH", "abc")]);
        let settings = Settings::apply_env(Settings::default(), vars).expect("apply env");
        assert_eq!(settings, Settings::default());
    }

    #[rstest]
    #[case("OUTLINER_ZONE_WIDTH", "wide")]
    #[case("OUTLINER_EXPORT__JSON_PRETTY", "maybe")]
    #[case("OUTLINER_EXPORT__MARKDOWN_INDENT", "deep")]
    #[case("OUTLINER_FORMAT", "yaml")]
    fn given_malformed_env_value_when_applying_then_config_error(
        #[case] key: &str,
        #[case] value: &str,
    ) {
        let result = Settings::apply_env(Settings::default(), env(&[(key, value)]));
        match result {
            Err(ApplicationError::Config { message }) => assert!(message.contains(key), "{message}"),
            other => panic!("expected config error for {key}={value}, got {other:?}"),
        }
    }
}
