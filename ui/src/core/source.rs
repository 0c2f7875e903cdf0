//! Where activity records come from.
//!
//! Sources return records exactly as stored (meters); unit conversion happens
//! in the page after every fetch. Read failures are returned untouched so the
//! page can surface them as a failed render.

use super::activity::ActivityRecord;
use super::error::Result;
use super::settings::Settings;

#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;

pub trait ActivitySource {
    fn read_activity_data(&self) -> Result<Vec<ActivityRecord>>;
}

/// Records held in memory; used for demos and tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemorySource {
    pub records: Vec<ActivityRecord>,
}

impl MemorySource {
    pub fn new(records: Vec<ActivityRecord>) -> Self {
        Self { records }
    }
}

impl ActivitySource for MemorySource {
    fn read_activity_data(&self) -> Result<Vec<ActivityRecord>> {
        Ok(self.records.clone())
    }
}

/// A JSON array of activities on disk.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone, PartialEq)]
pub struct JsonFileSource {
    pub path: PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The configured file, else `activities.json` in the per-user data directory.
    pub fn from_settings(settings: &Settings) -> Self {
        if let Some(path) = settings.data_file.clone() {
            return Self::new(path);
        }
        let path = directories::ProjectDirs::from("com", "Trailmark", "Trailmark")
            .map(|dirs| dirs.data_dir().join("activities.json"))
            .unwrap_or_else(|| PathBuf::from("activities.json"));
        Self::new(path)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl ActivitySource for JsonFileSource {
    fn read_activity_data(&self) -> Result<Vec<ActivityRecord>> {
        let raw = std::fs::read_to_string(&self.path)?;
        let records: Vec<ActivityRecord> = serde_json::from_str(&raw)?;
        tracing::info!(path = %self.path.display(), count = records.len(), "activity data read");
        Ok(records)
    }
}

/// A JSON array of activities in `localStorage`.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, PartialEq)]
pub struct BrowserStorageSource {
    pub key: String,
}

#[cfg(target_arch = "wasm32")]
pub const ACTIVITY_STORAGE_KEY: &str = "trailmark.activities";

#[cfg(target_arch = "wasm32")]
impl Default for BrowserStorageSource {
    fn default() -> Self {
        Self {
            key: ACTIVITY_STORAGE_KEY.to_string(),
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl ActivitySource for BrowserStorageSource {
    fn read_activity_data(&self) -> Result<Vec<ActivityRecord>> {
        use super::error::ProgressError;

        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .ok_or_else(|| ProgressError::Storage("localStorage unavailable".into()))?;
        let raw = storage
            .get_item(&self.key)
            .map_err(|_| ProgressError::Storage(format!("couldn't read `{}`", self.key)))?
            .ok_or_else(|| ProgressError::Storage(format!("no activities stored under `{}`", self.key)))?;
        let records: Vec<ActivityRecord> = serde_json::from_str(&raw)?;
        tracing::info!(key = %self.key, count = records.len(), "activity data read");
        Ok(records)
    }
}

/// The platform's default source for the given settings.
pub fn default_source(settings: &Settings) -> Box<dyn ActivitySource> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        Box::new(JsonFileSource::from_settings(settings))
    }

    #[cfg(target_arch = "wasm32")]
    {
        let _ = settings;
        Box::new(BrowserStorageSource::default())
    }
}
