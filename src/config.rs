//! Bridge configuration
//!
//! Loaded once at startup from an optional JSON file. Everything has a
//! default so an empty object (or no file at all) is a valid configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::context::KnownValues;

/// Default timeout for individual language-server requests (10 seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

// ============================================================================
// Hover setting
// ============================================================================

/// Value of the hover setting. Only `Disabled` turns the assistant hover off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HoverSetting {
    #[default]
    Default,
    Enabled,
    Disabled,
}

/// Hover setting with per workspace folder overrides.
///
/// Folder keys are folder URIs; a document belongs to the folder with the
/// longest URI that is a path prefix of the document URI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoverSettings {
    pub default: HoverSetting,
    pub folders: BTreeMap<String, HoverSetting>,
}

impl HoverSettings {
    /// Effective setting for the document at `document_uri`
    pub fn resolve(&self, document_uri: &str) -> HoverSetting {
        self.folders
            .iter()
            .filter(|(folder, _)| is_within_folder(document_uri, folder))
            .max_by_key(|(folder, _)| folder.len())
            .map(|(_, setting)| *setting)
            .unwrap_or(self.default)
    }

    pub fn is_enabled_for(&self, document_uri: &str) -> bool {
        self.resolve(document_uri) != HoverSetting::Disabled
    }
}

fn is_within_folder(document_uri: &str, folder_uri: &str) -> bool {
    let folder = folder_uri.trim_end_matches('/');
    document_uri
        .strip_prefix(folder)
        .is_some_and(|rest| rest.starts_with('/'))
}

// ============================================================================
// Experiment flags
// ============================================================================

/// Flags delivered by the experimentation service. Values are arbitrary JSON;
/// accessors only surface the shapes the bridge understands.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExperimentFlags(serde_json::Map<String, serde_json::Value>);

impl ExperimentFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter for a string flag
    pub fn with_string(mut self, name: &str, value: &str) -> Self {
        self.0.insert(
            name.to_string(),
            serde_json::Value::String(value.to_string()),
        );
        self
    }

    /// Non-empty string value of the flag, if present
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0
            .get(name)
            .and_then(serde_json::Value::as_str)
            .filter(|value| !value.is_empty())
    }
}

// ============================================================================
// Bridge configuration
// ============================================================================

/// Complete bridge configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BridgeConfig {
    /// `C_Cpp.hover` equivalent
    pub hover: HoverSettings,

    /// Experiment flags, including the per-compiler argument filters
    pub flags: ExperimentFlags,

    /// Raw-token to display-label tables used by normalization
    pub known_values: KnownValues,

    /// Built-in compiler argument filters keyed by compiler label
    /// (`MSVC`, `Clang`, `GCC`). Empty by default.
    pub default_compiler_argument_filters: BTreeMap<String, String>,

    /// Timeout for language-server requests, in seconds
    pub request_timeout_secs: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            hover: HoverSettings::default(),
            flags: ExperimentFlags::default(),
            known_values: KnownValues::default(),
            default_compiler_argument_filters: BTreeMap::new(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl BridgeConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from `path` when given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file
    }

    #[test]
    fn test_hover_setting_defaults_to_enabled_behavior() {
        let settings = HoverSettings::default();
        assert_eq!(settings.resolve("file:///work/a.cpp"), HoverSetting::Default);
        assert!(settings.is_enabled_for("file:///work/a.cpp"));
    }

    #[test]
    fn test_hover_setting_folder_override() {
        let mut settings = HoverSettings::default();
        settings
            .folders
            .insert("file:///work/legacy".to_string(), HoverSetting::Disabled);

        assert!(!settings.is_enabled_for("file:///work/legacy/src/a.cpp"));
        assert!(settings.is_enabled_for("file:///work/modern/a.cpp"));
        // Sibling folder sharing a name prefix is not inside the folder
        assert!(settings.is_enabled_for("file:///work/legacy2/a.cpp"));
    }

    #[test]
    fn test_hover_setting_longest_folder_wins() {
        let mut settings = HoverSettings {
            default: HoverSetting::Disabled,
            folders: BTreeMap::new(),
        };
        settings
            .folders
            .insert("file:///work/".to_string(), HoverSetting::Disabled);
        settings
            .folders
            .insert("file:///work/app".to_string(), HoverSetting::Enabled);

        assert_eq!(
            settings.resolve("file:///work/app/main.cpp"),
            HoverSetting::Enabled
        );
        assert_eq!(
            settings.resolve("file:///work/lib/util.cpp"),
            HoverSetting::Disabled
        );
        assert_eq!(settings.resolve("file:///other/x.cpp"), HoverSetting::Disabled);
    }

    #[test]
    fn test_experiment_flags_ignore_non_strings() {
        let flags: ExperimentFlags = serde_json::from_str(
            r#"{"copilotcppGccCompilerArgumentFilter": "^-O2$", "other": 3, "empty": ""}"#,
        )
        .unwrap();

        assert_eq!(
            flags.get_str("copilotcppGccCompilerArgumentFilter"),
            Some("^-O2$")
        );
        assert_eq!(flags.get_str("other"), None);
        assert_eq!(flags.get_str("empty"), None);
        assert_eq!(flags.get_str("missing"), None);
    }

    #[test]
    fn test_load_partial_config() {
        let file = write_config(
            r#"{
                "hover": { "default": "disabled" },
                "flags": { "copilotcppMsvcCompilerArgumentFilter": "^/std:.*$" },
                "requestTimeoutSecs": 3
            }"#,
        );

        let config = BridgeConfig::load(file.path()).unwrap();
        assert_eq!(config.hover.default, HoverSetting::Disabled);
        assert_eq!(
            config.flags.get_str("copilotcppMsvcCompilerArgumentFilter"),
            Some("^/std:.*$")
        );
        assert_eq!(config.request_timeout(), Duration::from_secs(3));
        assert_eq!(config.known_values, KnownValues::default());
        assert!(config.default_compiler_argument_filters.is_empty());
    }

    #[test]
    fn test_load_invalid_config() {
        let file = write_config("{ not json");
        match BridgeConfig::load(file.path()) {
            Err(ConfigError::Parse { path, .. }) => assert_eq!(path, file.path()),
            other => panic!("Expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_missing_config() {
        let result = BridgeConfig::load(Path::new("/nonexistent/bridge.json"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_load_or_default_without_path() {
        let config = BridgeConfig::load_or_default(None).unwrap();
        assert_eq!(config, BridgeConfig::default());
        assert_eq!(
            config.request_timeout(),
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
        );
    }
}
