use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConfigPathError {
    MissingHomeDirectory,
}

pub(crate) const APP_DIR: &str = "themeswitch";
const HOST_CONFIG_FILE: &str = "host.json";
const APPLIED_STATE_FILE: &str = "applied.json";

pub const DEFAULT_LIGHT_SCHEME: &str = "Default";
pub const DEFAULT_DARK_SCHEME: &str = "Darcula";

/// Desktop hook host settings from `host.json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HostConfig {
    #[serde(default = "default_schemes")]
    pub color_schemes: Vec<String>,
    #[serde(default = "default_light_scheme")]
    pub default_light_scheme: String,
    #[serde(default = "default_dark_scheme")]
    pub default_dark_scheme: String,
    /// Shell command run on look-and-feel changes.
    #[serde(default)]
    pub look_and_feel_command: Option<String>,
    /// Shell command run on color scheme changes.
    #[serde(default)]
    pub color_scheme_command: Option<String>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            color_schemes: default_schemes(),
            default_light_scheme: default_light_scheme(),
            default_dark_scheme: default_dark_scheme(),
            look_and_feel_command: None,
            color_scheme_command: None,
        }
    }
}

fn default_schemes() -> Vec<String> {
    vec![DEFAULT_LIGHT_SCHEME.to_string(), DEFAULT_DARK_SCHEME.to_string()]
}

fn default_light_scheme() -> String {
    DEFAULT_LIGHT_SCHEME.to_string()
}

fn default_dark_scheme() -> String {
    DEFAULT_DARK_SCHEME.to_string()
}

pub fn load_host_config() -> HostConfig {
    let (xdg_config_home, home) = config_env_dirs();
    load_host_config_with(xdg_config_home.as_deref(), home.as_deref())
}

fn load_host_config_with(xdg_config_home: Option<&Path>, home: Option<&Path>) -> HostConfig {
    let path = match app_config_path(APP_DIR, HOST_CONFIG_FILE, xdg_config_home, home) {
        Ok(p) => p,
        Err(_) => return HostConfig::default(),
    };
    if !path.exists() {
        return HostConfig::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
            tracing::warn!(?err, ?path, "failed to parse host.json; using defaults");
            HostConfig::default()
        }),
        Err(err) => {
            tracing::warn!(?err, ?path, "failed to read host.json; using defaults");
            HostConfig::default()
        }
    }
}

/// Where the hook host records what it last applied.
pub(crate) fn applied_state_path() -> Result<PathBuf, ConfigPathError> {
    let (xdg_config_home, home) = config_env_dirs();
    app_config_path(
        APP_DIR,
        APPLIED_STATE_FILE,
        xdg_config_home.as_deref(),
        home.as_deref(),
    )
}

pub(crate) fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub(crate) fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    let root = match xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        Some(xdg) => xdg.to_path_buf(),
        None => home
            .ok_or(ConfigPathError::MissingHomeDirectory)?
            .join(".config"),
    };
    Ok(root.join(app_dir).join(file_name))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn fixture_root() -> PathBuf {
        let mut path = std::env::temp_dir();
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::SystemTime::UNIX_EPOCH)
            .map_or(0, |d| d.as_nanos());
        path.push(format!("themeswitch-config-{}-{nanos}", std::process::id()));
        path
    }

    fn write_host_config(root: &Path, contents: &str) {
        let dir = root.join(APP_DIR);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(HOST_CONFIG_FILE), contents).unwrap();
    }

    #[test]
    fn app_config_path_prefers_xdg_config_home() {
        let path = app_config_path(
            APP_DIR,
            "settings.json",
            Some(Path::new("/tmp/config-root")),
            Some(Path::new("/tmp/home")),
        )
        .expect("path should resolve");

        assert_eq!(path, PathBuf::from("/tmp/config-root/themeswitch/settings.json"));
    }

    #[test]
    fn app_config_path_ignores_empty_xdg_config_home() {
        let path = app_config_path(
            APP_DIR,
            "settings.json",
            Some(Path::new("")),
            Some(Path::new("/tmp/home")),
        )
        .expect("path should resolve");

        assert_eq!(path, PathBuf::from("/tmp/home/.config/themeswitch/settings.json"));
    }

    #[test]
    fn app_config_path_errors_when_home_missing_and_xdg_unset() {
        let error = app_config_path(APP_DIR, "settings.json", None, None).unwrap_err();
        assert_eq!(error, ConfigPathError::MissingHomeDirectory);
    }

    #[test]
    fn host_config_defaults_when_missing() {
        let root = fixture_root();
        let config = load_host_config_with(Some(&root), None);
        assert_eq!(config, HostConfig::default());
        assert_eq!(config.color_schemes, ["Default", "Darcula"]);
    }

    #[test]
    fn host_config_parses_partial_file() {
        let root = fixture_root();
        write_host_config(
            &root,
            r#"{
                "color_schemes": ["Light", "Dark", "Solarized"],
                "color_scheme_command": "echo $THEMESWITCH_COLOR_SCHEME"
            }"#,
        );

        let config = load_host_config_with(Some(&root), None);
        assert_eq!(config.color_schemes, ["Light", "Dark", "Solarized"]);
        assert_eq!(config.default_dark_scheme, DEFAULT_DARK_SCHEME);
        assert_eq!(
            config.color_scheme_command.as_deref(),
            Some("echo $THEMESWITCH_COLOR_SCHEME")
        );
        assert!(config.look_and_feel_command.is_none());
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn host_config_falls_back_on_parse_error() {
        let root = fixture_root();
        write_host_config(&root, "not json");
        assert_eq!(load_host_config_with(Some(&root), None), HostConfig::default());
        let _ = fs::remove_dir_all(&root);
    }
}
