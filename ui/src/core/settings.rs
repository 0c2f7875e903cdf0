//! Page settings: built-in defaults, then the settings file, then environment overrides.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::error::{ProgressError, Result};
use super::progress::{DEFAULT_ACTIVITY_TYPE, DEFAULT_HISTORY_START_YEAR};

pub const ENV_LOGIN_REQUIRED: &str = "TRAILMARK_LOGIN_REQUIRED";
pub const ENV_ACCESS_CODE: &str = "TRAILMARK_ACCESS_CODE";
pub const ENV_DATA_FILE: &str = "TRAILMARK_DATA_FILE";
pub const ENV_HISTORY_START_YEAR: &str = "TRAILMARK_HISTORY_START_YEAR";

#[cfg(target_arch = "wasm32")]
const SETTINGS_STORAGE_KEY: &str = "trailmark.settings";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Gate the progress page behind the login prompt.
    pub login_required: bool,
    /// Code the login prompt accepts. With none configured any submission logs in.
    pub access_code: Option<String>,
    /// Activity file read by the native data source.
    pub data_file: Option<PathBuf>,
    pub history_start_year: i32,
    pub default_activity_types: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            login_required: false,
            access_code: None,
            data_file: None,
            history_start_year: DEFAULT_HISTORY_START_YEAR,
            default_activity_types: vec![DEFAULT_ACTIVITY_TYPE.to_string()],
        }
    }
}

impl Settings {
    /// Load settings for the current platform. Problems are logged and defaults kept.
    pub fn load() -> Self {
        let mut settings = match Self::read_stored() {
            Ok(Some(settings)) => settings,
            Ok(None) => Self::default(),
            Err(err) => {
                warn!("{err}; falling back to default settings");
                Self::default()
            }
        };

        #[cfg(not(target_arch = "wasm32"))]
        settings.apply_overrides(|key| std::env::var(key).ok());

        info!(
            platform = super::platform::Platform::current().label(),
            login_required = settings.login_required,
            history_start_year = settings.history_start_year,
            "settings loaded"
        );
        settings
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|err| ProgressError::Settings(err.to_string()))
    }

    /// Apply `TRAILMARK_*` overrides from `lookup`. Unparseable values are ignored with a warning.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_LOGIN_REQUIRED) {
            match parse_flag(&raw) {
                Some(flag) => self.login_required = flag,
                None => warn!("ignoring {ENV_LOGIN_REQUIRED}={raw:?}: expected a boolean"),
            }
        }

        if let Some(code) = lookup(ENV_ACCESS_CODE) {
            let code = code.trim().to_string();
            self.access_code = (!code.is_empty()).then_some(code);
        }

        if let Some(path) = lookup(ENV_DATA_FILE) {
            if !path.trim().is_empty() {
                self.data_file = Some(PathBuf::from(path.trim()));
            }
        }

        if let Some(raw) = lookup(ENV_HISTORY_START_YEAR) {
            match raw.trim().parse::<i32>() {
                Ok(year) => self.history_start_year = year,
                Err(_) => warn!("ignoring {ENV_HISTORY_START_YEAR}={raw:?}: expected a year"),
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn read_stored() -> Result<Option<Self>> {
        let Some(dirs) = directories::ProjectDirs::from("com", "Trailmark", "Trailmark") else {
            return Ok(None);
        };
        let path = dirs.config_dir().join("settings.json");
        match std::fs::read_to_string(&path) {
            Ok(raw) => Self::from_json(&raw).map(Some).map_err(|err| {
                ProgressError::Settings(format!("{}: {err}", path.display()))
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn read_stored() -> Result<Option<Self>> {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .ok_or_else(|| ProgressError::Storage("localStorage unavailable".into()))?;
        match storage.get_item(SETTINGS_STORAGE_KEY) {
            Ok(Some(raw)) => Self::from_json(&raw).map(Some),
            Ok(None) => Ok(None),
            Err(_) => Err(ProgressError::Storage("settings read failed".into())),
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn partial_file_keeps_defaults() {
        let settings = Settings::from_json(r#"{ "login_required": true }"#).unwrap();
        assert!(settings.login_required);
        assert_eq!(settings.history_start_year, 2016);
        assert_eq!(settings.default_activity_types, vec!["Run".to_string()]);
    }

    #[test]
    fn malformed_file_is_a_settings_error() {
        let err = Settings::from_json("{ login_required: ").unwrap_err();
        assert!(matches!(err, ProgressError::Settings(_)));
    }

    #[test]
    fn environment_overrides_apply() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_LOGIN_REQUIRED, "yes"),
            (ENV_ACCESS_CODE, " hunter2 "),
            (ENV_DATA_FILE, "/tmp/activities.json"),
            (ENV_HISTORY_START_YEAR, "2019"),
        ]);
        let mut settings = Settings::default();
        settings.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert!(settings.login_required);
        assert_eq!(settings.access_code.as_deref(), Some("hunter2"));
        assert_eq!(settings.data_file, Some(PathBuf::from("/tmp/activities.json")));
        assert_eq!(settings.history_start_year, 2019);
    }

    #[test]
    fn invalid_overrides_are_ignored() {
        let env: HashMap<&str, &str> =
            HashMap::from([(ENV_LOGIN_REQUIRED, "maybe"), (ENV_HISTORY_START_YEAR, "soon")]);
        let mut settings = Settings::default();
        settings.apply_overrides(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(settings, Settings::default());
    }
}
