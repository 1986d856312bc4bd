use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::SystemTime;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{app_config_path, config_env_dirs, ConfigPathError, APP_DIR};
use crate::window::DarkWindow;

mod form;

pub use form::{parse_time_field, FormError, FormResult, SettingsForm, TimeField};

const SETTINGS_FILE: &str = "settings.json";

pub const DEFAULT_START_HOUR: i64 = 18;
pub const DEFAULT_START_MINUTE: i64 = 18;
pub const DEFAULT_END_HOUR: i64 = 5;
pub const DEFAULT_END_MINUTE: i64 = 5;

pub type SettingsResult<T> = std::result::Result<T, SettingsError>;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("missing HOME environment variable")]
    MissingHomeDirectory,
    #[error("failed to read settings: {path}")]
    ReadConfig { path: PathBuf, source: io::Error },
    #[error("failed to write settings: {path}")]
    WriteConfig { path: PathBuf, source: io::Error },
    #[error("failed to parse settings")]
    ParseConfig(#[from] serde_json::Error),
}

/// The switcher configuration. Field names on disk match the legacy plugin
/// state file so existing records load unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "startDarkHour")]
    pub start_hour: i64,
    #[serde(rename = "startDarkMinutes")]
    pub start_minute: i64,
    #[serde(rename = "endDarkHour")]
    pub end_hour: i64,
    #[serde(rename = "endDarkMinutes")]
    pub end_minute: i64,
    #[serde(rename = "lightColorScheme")]
    pub light_scheme: String,
    #[serde(rename = "darkColorScheme")]
    pub dark_scheme: String,
    #[serde(rename = "followMacOsDarkMode")]
    pub follow_os_dark_mode: bool,
}

impl Settings {
    pub fn with_schemes(light_scheme: impl Into<String>, dark_scheme: impl Into<String>) -> Self {
        Self {
            start_hour: DEFAULT_START_HOUR,
            start_minute: DEFAULT_START_MINUTE,
            end_hour: DEFAULT_END_HOUR,
            end_minute: DEFAULT_END_MINUTE,
            light_scheme: light_scheme.into(),
            dark_scheme: dark_scheme.into(),
            follow_os_dark_mode: false,
        }
    }

    pub fn start_time(&self) -> NaiveTime {
        time_of_day(self.start_hour, self.start_minute)
    }

    pub fn end_time(&self) -> NaiveTime {
        time_of_day(self.end_hour, self.end_minute)
    }

    pub fn dark_window(&self) -> DarkWindow {
        DarkWindow::new(self.start_time(), self.end_time())
    }

    /// Overwrites every field present in `stored`, leaving the rest as-is.
    pub fn merge(&mut self, stored: StoredSettings) {
        if let Some(v) = stored.start_hour {
            self.start_hour = v;
        }
        if let Some(v) = stored.start_minute {
            self.start_minute = v;
        }
        if let Some(v) = stored.end_hour {
            self.end_hour = v;
        }
        if let Some(v) = stored.end_minute {
            self.end_minute = v;
        }
        if let Some(v) = stored.light_scheme {
            self.light_scheme = v;
        }
        if let Some(v) = stored.dark_scheme {
            self.dark_scheme = v;
        }
        if let Some(v) = stored.follow_os_dark_mode {
            self.follow_os_dark_mode = v;
        }
    }
}

// Persisted values are not validated; out-of-range parts are clamped.
fn time_of_day(hour: i64, minute: i64) -> NaiveTime {
    let hour = u32::try_from(hour.clamp(0, 23)).unwrap_or(0);
    let minute = u32::try_from(minute.clamp(0, 59)).unwrap_or(0);
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

/// On-disk shape with every field optional, so absent keys keep defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoredSettings {
    #[serde(default, rename = "startDarkHour")]
    pub start_hour: Option<i64>,
    #[serde(default, rename = "startDarkMinutes")]
    pub start_minute: Option<i64>,
    #[serde(default, rename = "endDarkHour")]
    pub end_hour: Option<i64>,
    #[serde(default, rename = "endDarkMinutes")]
    pub end_minute: Option<i64>,
    #[serde(default, rename = "lightColorScheme")]
    pub light_scheme: Option<String>,
    #[serde(default, rename = "darkColorScheme")]
    pub dark_scheme: Option<String>,
    #[serde(default, rename = "followMacOsDarkMode")]
    pub follow_os_dark_mode: Option<bool>,
}

/// Settings instance shared by the periodic driver and the settings form.
#[derive(Debug, Clone)]
pub struct SharedSettings {
    inner: Arc<RwLock<Settings>>,
}

impl SharedSettings {
    pub fn new(settings: Settings) -> Self {
        Self {
            inner: Arc::new(RwLock::new(settings)),
        }
    }

    pub fn snapshot(&self) -> Settings {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut Settings) -> R) -> R {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

pub fn settings_path() -> SettingsResult<PathBuf> {
    let (xdg_config_home, home) = config_env_dirs();
    settings_path_with(xdg_config_home.as_deref(), home.as_deref())
}

fn settings_path_with(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> SettingsResult<PathBuf> {
    app_config_path(APP_DIR, SETTINGS_FILE, xdg_config_home, home).map_err(|error| match error {
        ConfigPathError::MissingHomeDirectory => SettingsError::MissingHomeDirectory,
    })
}

/// Loads persisted settings on top of `defaults`.
pub fn load_settings(defaults: Settings) -> SettingsResult<Settings> {
    let (xdg_config_home, home) = config_env_dirs();
    load_settings_with(defaults, xdg_config_home.as_deref(), home.as_deref())
}

fn load_settings_with(
    mut defaults: Settings,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> SettingsResult<Settings> {
    let path = settings_path_with(xdg_config_home, home)?;
    if !path.exists() {
        tracing::debug!(?path, "no stored settings; using defaults");
        return Ok(defaults);
    }

    defaults.merge(read_stored(&path)?);
    Ok(defaults)
}

fn read_stored(path: &Path) -> SettingsResult<StoredSettings> {
    let serialized = fs::read_to_string(path).map_err(|source| SettingsError::ReadConfig {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&serialized)?)
}

pub fn save_settings(settings: &Settings) -> SettingsResult<()> {
    let (xdg_config_home, home) = config_env_dirs();
    save_settings_with(settings, xdg_config_home.as_deref(), home.as_deref())
}

fn save_settings_with(
    settings: &Settings,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> SettingsResult<()> {
    let path = settings_path_with(xdg_config_home, home)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| SettingsError::WriteConfig {
            path: path.clone(),
            source,
        })?;
    }

    let serialized = serde_json::to_string_pretty(settings)?;
    fs::write(&path, serialized).map_err(|source| SettingsError::WriteConfig {
        path: path.clone(),
        source,
    })?;
    tracing::debug!(?path, "settings saved");
    Ok(())
}

/// The settings file as seen by a long-running switcher. Edits written by
/// another process are merged into the shared settings on [`refresh`].
///
/// [`refresh`]: SettingsFile::refresh
#[derive(Debug)]
pub struct SettingsFile {
    path: PathBuf,
    seen: Mutex<Option<SystemTime>>,
}

impl SettingsFile {
    /// Watches `path`; its current contents count as already loaded.
    pub fn new(path: PathBuf) -> Self {
        let seen = modified_at(&path);
        Self {
            path,
            seen: Mutex::new(seen),
        }
    }

    pub fn locate() -> SettingsResult<Self> {
        Ok(Self::new(settings_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-reads the file when its modification time changed and merges it
    /// into `shared`. Returns whether anything was merged. A removed file
    /// keeps the current values.
    pub fn refresh(&self, shared: &SharedSettings) -> SettingsResult<bool> {
        let modified = modified_at(&self.path);
        {
            let mut seen = self.seen.lock().unwrap_or_else(PoisonError::into_inner);
            if *seen == modified {
                return Ok(false);
            }
            *seen = modified;
        }
        if modified.is_none() {
            return Ok(false);
        }

        let stored = read_stored(&self.path)?;
        shared.update(|settings| settings.merge(stored));
        tracing::info!(path = ?self.path, "settings reloaded");
        Ok(true)
    }
}

fn modified_at(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|meta| meta.modified()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_root() -> PathBuf {
        let mut path = std::env::temp_dir();
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::SystemTime::UNIX_EPOCH)
            .map_or(0, |d| d.as_nanos());
        let pid = std::process::id();
        path.push(format!("themeswitch-settings-{pid}-{nanos}"));
        path
    }

    fn with_temp_root<F: FnOnce(&Path)>(f: F) {
        let root = fixture_root();
        fs::create_dir_all(&root).unwrap();
        f(&root);
        let _ = fs::remove_dir_all(&root);
    }

    fn defaults() -> Settings {
        Settings::with_schemes("Default", "Darcula")
    }

    fn write_raw(root: &Path, contents: &str) {
        let path = settings_path_with(Some(root), None).unwrap();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
    }

    #[test]
    fn defaults_describe_the_evening_window() {
        let settings = defaults();
        assert_eq!(settings.start_time(), NaiveTime::from_hms_opt(18, 18, 0).unwrap());
        assert_eq!(settings.end_time(), NaiveTime::from_hms_opt(5, 5, 0).unwrap());
        assert_eq!(settings.light_scheme, "Default");
        assert_eq!(settings.dark_scheme, "Darcula");
        assert!(!settings.follow_os_dark_mode);
    }

    #[test]
    fn load_returns_defaults_when_file_missing() {
        with_temp_root(|root| {
            let settings = load_settings_with(defaults(), Some(root), None).unwrap();
            assert_eq!(settings, defaults());
        });
    }

    #[test]
    fn save_and_load_round_trip() {
        with_temp_root(|root| {
            let settings = Settings {
                start_hour: 20,
                start_minute: 45,
                end_hour: 7,
                end_minute: 30,
                light_scheme: "Solarized Light".to_string(),
                dark_scheme: "Monokai".to_string(),
                follow_os_dark_mode: true,
            };
            save_settings_with(&settings, Some(root), None).unwrap();
            let loaded = load_settings_with(defaults(), Some(root), None).unwrap();
            assert_eq!(loaded, settings);

            save_settings_with(&loaded, Some(root), None).unwrap();
            let reloaded = load_settings_with(defaults(), Some(root), None).unwrap();
            assert_eq!(reloaded, settings);
        });
    }

    #[test]
    fn stored_record_uses_plugin_field_names() {
        let json = serde_json::to_value(defaults()).unwrap();
        let object = json.as_object().unwrap();
        for key in [
            "startDarkHour",
            "startDarkMinutes",
            "endDarkHour",
            "endDarkMinutes",
            "lightColorScheme",
            "darkColorScheme",
            "followMacOsDarkMode",
        ] {
            assert!(object.contains_key(key), "missing {key}");
        }
        assert_eq!(object.len(), 7);
    }

    #[test]
    fn partial_record_overwrites_only_present_fields() {
        with_temp_root(|root| {
            write_raw(root, r#"{"startDarkHour": 21, "darkColorScheme": "High contrast"}"#);
            let settings = load_settings_with(defaults(), Some(root), None).unwrap();
            assert_eq!(settings.start_hour, 21);
            assert_eq!(settings.start_minute, DEFAULT_START_MINUTE);
            assert_eq!(settings.end_hour, DEFAULT_END_HOUR);
            assert_eq!(settings.light_scheme, "Default");
            assert_eq!(settings.dark_scheme, "High contrast");
        });
    }

    #[test]
    fn load_rejects_invalid_payload() {
        with_temp_root(|root| {
            write_raw(root, "{ invalid ");
            let err = load_settings_with(defaults(), Some(root), None).unwrap_err();
            assert!(matches!(err, SettingsError::ParseConfig(_)));
        });
    }

    #[test]
    fn path_requires_home_or_xdg() {
        let err = settings_path_with(None, None).unwrap_err();
        assert!(matches!(err, SettingsError::MissingHomeDirectory));
    }

    #[test]
    fn out_of_range_parts_saturate() {
        let settings = Settings {
            start_hour: 42,
            start_minute: 99,
            ..defaults()
        };
        assert_eq!(settings.start_time(), NaiveTime::from_hms_opt(23, 59, 0).unwrap());
    }

    #[test]
    fn negative_parts_clamp_without_dropping_the_record() {
        with_temp_root(|root| {
            write_raw(
                root,
                r#"{"startDarkHour": -3, "startDarkMinutes": 15, "darkColorScheme": "Monokai"}"#,
            );
            let settings = load_settings_with(defaults(), Some(root), None).unwrap();
            assert_eq!(settings.start_hour, -3);
            assert_eq!(settings.start_time(), NaiveTime::from_hms_opt(0, 15, 0).unwrap());
            assert_eq!(settings.dark_scheme, "Monokai");
        });
    }

    #[test]
    fn settings_file_merges_external_edits_once() {
        with_temp_root(|root| {
            let path = settings_path_with(Some(root), None).unwrap();
            let file = SettingsFile::new(path);
            let shared = SharedSettings::new(defaults());
            assert!(!file.refresh(&shared).unwrap());

            let edited = Settings {
                dark_scheme: "Monokai".to_string(),
                ..defaults()
            };
            save_settings_with(&edited, Some(root), None).unwrap();

            assert!(file.refresh(&shared).unwrap());
            assert_eq!(shared.snapshot(), edited);
            assert!(!file.refresh(&shared).unwrap());
        });
    }

    #[test]
    fn settings_file_keeps_values_when_edit_is_malformed() {
        with_temp_root(|root| {
            let path = settings_path_with(Some(root), None).unwrap();
            let file = SettingsFile::new(path);
            let shared = SharedSettings::new(defaults());
            write_raw(root, "{ broken");

            let err = file.refresh(&shared).unwrap_err();
            assert!(matches!(err, SettingsError::ParseConfig(_)));
            assert_eq!(shared.snapshot(), defaults());
            // A bad file is reported once, not on every tick.
            assert!(!file.refresh(&shared).unwrap());
        });
    }

    #[test]
    fn shared_settings_observe_updates() {
        let shared = SharedSettings::new(defaults());
        let reader = shared.clone();
        shared.update(|settings| settings.follow_os_dark_mode = true);
        assert!(reader.snapshot().follow_os_dark_mode);
    }
}
