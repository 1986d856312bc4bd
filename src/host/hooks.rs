use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use super::{Appearance, HostError, HostResult, ThemeHost};
use crate::config::HostConfig;

const APPEARANCE_ENV: &str = "THEMESWITCH_APPEARANCE";
const COLOR_SCHEME_ENV: &str = "THEMESWITCH_COLOR_SCHEME";

/// What the host last applied, shared with `status` through a state file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedState {
    pub look_and_feel: Option<Appearance>,
    pub color_scheme: Option<String>,
}

/// Standalone desktop host: a catalogue of scheme names plus optional
/// shell hooks that do the actual restyling.
#[derive(Debug)]
pub struct HookHost {
    config: HostConfig,
    applied: Mutex<AppliedState>,
    state_file: Option<PathBuf>,
}

impl HookHost {
    pub fn new(config: HostConfig) -> Self {
        Self {
            config,
            applied: Mutex::new(AppliedState::default()),
            state_file: None,
        }
    }

    /// Records every change in `path`, starting from what it already holds.
    pub fn with_state_file(mut self, path: PathBuf) -> Self {
        let restored = read_state(&path);
        *self.applied.get_mut().unwrap_or_else(PoisonError::into_inner) = restored;
        self.state_file = Some(path);
        self
    }

    pub fn applied(&self) -> AppliedState {
        self.applied
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, change: impl FnOnce(&mut AppliedState)) {
        let mut applied = self.applied.lock().unwrap_or_else(PoisonError::into_inner);
        change(&mut applied);
        if let Some(path) = self.state_file.as_deref() {
            if let Err(err) = write_state(path, &applied) {
                tracing::warn!(%err, ?path, "failed to record applied theme");
            }
        }
    }

    fn knows_scheme(&self, name: &str) -> bool {
        self.config.color_schemes.iter().any(|scheme| scheme == name)
    }
}

fn read_state(path: &Path) -> AppliedState {
    let Ok(contents) = fs::read_to_string(path) else {
        return AppliedState::default();
    };
    serde_json::from_str(&contents).unwrap_or_else(|err| {
        tracing::warn!(%err, ?path, "ignoring unreadable applied state");
        AppliedState::default()
    })
}

fn write_state(path: &Path, state: &AppliedState) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let serialized = serde_json::to_string_pretty(state).map_err(std::io::Error::other)?;
    fs::write(path, serialized)
}

fn run_hook(command: &str, env_key: &str, env_value: &str) -> HostResult<()> {
    tracing::debug!(command, env_key, env_value, "running hook");
    let status = Command::new("sh")
        .arg("-c")
        .arg(command)
        .env(env_key, env_value)
        .status()
        .map_err(|source| HostError::Spawn {
            command: command.to_string(),
            source,
        })?;
    if !status.success() {
        return Err(HostError::Command {
            command: command.to_string(),
            status: status.to_string(),
        });
    }
    Ok(())
}

impl ThemeHost for HookHost {
    fn scheme_names(&self) -> Vec<String> {
        self.config.color_schemes.clone()
    }

    fn default_light_scheme(&self) -> String {
        self.config.default_light_scheme.clone()
    }

    fn default_dark_scheme(&self) -> String {
        self.config.default_dark_scheme.clone()
    }

    fn apply_look_and_feel(&self, appearance: Appearance) -> HostResult<()> {
        if let Some(command) = self.config.look_and_feel_command.as_deref() {
            run_hook(command, APPEARANCE_ENV, appearance.as_str())?;
        }
        self.record(|applied| applied.look_and_feel = Some(appearance));
        Ok(())
    }

    fn set_color_scheme(&self, name: &str) -> HostResult<()> {
        if !self.knows_scheme(name) {
            return Err(HostError::UnknownScheme(name.to_string()));
        }
        if let Some(command) = self.config.color_scheme_command.as_deref() {
            run_hook(command, COLOR_SCHEME_ENV, name)?;
        }
        self.record(|applied| applied.color_scheme = Some(name.to_string()));
        Ok(())
    }
}
