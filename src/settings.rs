use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse settings file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Connective applied when several tag terms are combined under the `all`
/// operator. Historically the two query paths disagreed on this (one read
/// a UI setting, the other hard-coded the connective); it is an explicit
/// policy here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagJoinPolicy {
    #[default]
    And,
    Or,
}

/// Operator-tunable behavior shared by every section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// Free-form label for the loaded profile.
    pub profile_name: String,
    pub tag_join: TagJoinPolicy,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            profile_name: "base".to_string(),
            tag_join: TagJoinPolicy::default(),
        }
    }
}

pub fn load_settings(path: Option<&Path>) -> Result<UiSettings, SettingsError> {
    if let Some(path) = path {
        load_settings_from_path(path)
    } else {
        Ok(default_settings().clone())
    }
}

pub fn load_settings_from_path(path: &Path) -> Result<UiSettings, SettingsError> {
    let path_display = path.display().to_string();
    let raw = fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path_display.clone(),
        source,
    })?;

    toml::from_str::<UiSettings>(&raw).map_err(|source| SettingsError::Parse {
        path: path_display,
        source,
    })
}

pub fn default_settings() -> &'static UiSettings {
    static DEFAULT_SETTINGS: LazyLock<UiSettings> = LazyLock::new(UiSettings::default);
    &DEFAULT_SETTINGS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = UiSettings::default();
        assert_eq!(settings.profile_name, "base");
        assert_eq!(settings.tag_join, TagJoinPolicy::And);
    }

    #[test]
    fn test_partial_profile_fills_defaults() {
        let settings: UiSettings = toml::from_str("tag_join = \"or\"").expect("parseable profile");
        assert_eq!(settings.tag_join, TagJoinPolicy::Or);
        assert_eq!(settings.profile_name, "base");
    }
}
