//! Capabilities the switcher consumes from its host environment.

use std::fmt;
use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod hooks;
mod ui_thread;

pub use hooks::{AppliedState, HookHost};
pub use ui_thread::UiThread;

pub type HostResult<T> = std::result::Result<T, HostError>;

/// Look-and-feel family applied to the host chrome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Appearance {
    Light,
    Dark,
}

impl Appearance {
    pub const fn from_dark(use_dark: bool) -> Self {
        if use_dark {
            Self::Dark
        } else {
            Self::Light
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl fmt::Display for Appearance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum HostError {
    #[error("unknown color scheme: {0}")]
    UnknownScheme(String),
    #[error("failed to run hook `{command}`")]
    Spawn { command: String, source: io::Error },
    #[error("hook `{command}` exited with {status}")]
    Command { command: String, status: String },
}

pub trait ThemeHost: Send + Sync {
    fn scheme_names(&self) -> Vec<String>;
    fn default_light_scheme(&self) -> String;
    fn default_dark_scheme(&self) -> String;
    fn apply_look_and_feel(&self, appearance: Appearance) -> HostResult<()>;
    /// Fails with [`HostError::UnknownScheme`] when `name` is not known.
    fn set_color_scheme(&self, name: &str) -> HostResult<()>;
}

pub type UiTask = Box<dyn FnOnce() + Send + 'static>;

/// Runs tasks on the single thread allowed to mutate host visuals. Tasks
/// posted from one thread run in posting order.
pub trait UiDispatcher: Send + Sync {
    fn run_on_ui_thread(&self, task: UiTask);
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) enum HostCall {
        LookAndFeel(Appearance),
        ColorScheme(String),
    }

    #[derive(Debug, Default)]
    pub(crate) struct RecordingHost {
        schemes: Vec<String>,
        calls: Mutex<Vec<HostCall>>,
    }

    impl RecordingHost {
        pub(crate) fn new<I, S>(schemes: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self {
                schemes: schemes.into_iter().map(Into::into).collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn calls(&self) -> Vec<HostCall> {
            self.calls.lock().unwrap().clone()
        }

        pub(crate) fn current_look_and_feel(&self) -> Option<Appearance> {
            self.calls().iter().rev().find_map(|call| match call {
                HostCall::LookAndFeel(appearance) => Some(*appearance),
                HostCall::ColorScheme(_) => None,
            })
        }

        pub(crate) fn current_scheme(&self) -> Option<String> {
            self.calls().iter().rev().find_map(|call| match call {
                HostCall::ColorScheme(name) => Some(name.clone()),
                HostCall::LookAndFeel(_) => None,
            })
        }
    }

    impl ThemeHost for RecordingHost {
        fn scheme_names(&self) -> Vec<String> {
            self.schemes.clone()
        }

        fn default_light_scheme(&self) -> String {
            "Default".to_string()
        }

        fn default_dark_scheme(&self) -> String {
            "Darcula".to_string()
        }

        fn apply_look_and_feel(&self, appearance: Appearance) -> HostResult<()> {
            self.calls
                .lock()
                .unwrap()
                .push(HostCall::LookAndFeel(appearance));
            Ok(())
        }

        fn set_color_scheme(&self, name: &str) -> HostResult<()> {
            if !self.schemes.iter().any(|scheme| scheme == name) {
                return Err(HostError::UnknownScheme(name.to_string()));
            }
            self.calls
                .lock()
                .unwrap()
                .push(HostCall::ColorScheme(name.to_string()));
            Ok(())
        }
    }

    /// Holds posted tasks until the test drains them.
    #[derive(Default)]
    pub(crate) struct QueuedDispatcher {
        queue: Mutex<VecDeque<UiTask>>,
    }

    impl QueuedDispatcher {
        pub(crate) fn pending(&self) -> usize {
            self.queue.lock().unwrap().len()
        }

        /// Runs one task; returns false when the queue was empty.
        pub(crate) fn run_next(&self) -> bool {
            let task = self.queue.lock().unwrap().pop_front();
            match task {
                Some(task) => {
                    task();
                    true
                }
                None => false,
            }
        }

        pub(crate) fn run_all(&self) -> usize {
            let mut ran = 0;
            while self.run_next() {
                ran += 1;
            }
            ran
        }
    }

    impl UiDispatcher for QueuedDispatcher {
        fn run_on_ui_thread(&self, task: UiTask) {
            self.queue.lock().unwrap().push_back(task);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appearance_maps_from_dark_flag() {
        assert_eq!(Appearance::from_dark(true), Appearance::Dark);
        assert_eq!(Appearance::from_dark(false), Appearance::Light);
        assert_eq!(Appearance::Dark.to_string(), "dark");
    }

    #[test]
    fn appearance_serializes_lowercase() {
        let json = serde_json::to_string(&Appearance::Light).unwrap();
        assert_eq!(json, "\"light\"");
    }
}
