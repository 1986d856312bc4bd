//! Operating system dark-mode capability.
//!
//! The capability exists only on platforms where the system preference can
//! be queried. It is probed once at startup and handed to the resolver as
//! `Option<Arc<dyn OsAppearance>>`; callers never branch on the platform.

use std::sync::Arc;

#[cfg(any(
    target_os = "linux",
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "netbsd",
    target_os = "openbsd"
))]
mod freedesktop;
#[cfg(target_os = "macos")]
mod macos;

pub trait OsAppearance: Send + Sync {
    fn is_dark_mode_enabled(&self) -> bool;
}

/// Fixed answer, for hosts that already know the system preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticAppearance(pub bool);

impl OsAppearance for StaticAppearance {
    fn is_dark_mode_enabled(&self) -> bool {
        self.0
    }
}

/// Probes the platform and returns the capability when it is usable.
pub fn capability() -> Option<Arc<dyn OsAppearance>> {
    let capability = platform_capability();
    match &capability {
        Some(_) => tracing::info!("system dark mode query available"),
        None => tracing::info!("system dark mode query unavailable on this platform"),
    }
    capability
}

#[cfg(any(
    target_os = "linux",
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "netbsd",
    target_os = "openbsd"
))]
fn platform_capability() -> Option<Arc<dyn OsAppearance>> {
    freedesktop::GsettingsAppearance::probe().map(|c| Arc::new(c) as Arc<dyn OsAppearance>)
}

#[cfg(target_os = "macos")]
fn platform_capability() -> Option<Arc<dyn OsAppearance>> {
    macos::DefaultsAppearance::probe().map(|c| Arc::new(c) as Arc<dyn OsAppearance>)
}

#[cfg(not(any(
    target_os = "macos",
    target_os = "linux",
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "netbsd",
    target_os = "openbsd"
)))]
fn platform_capability() -> Option<Arc<dyn OsAppearance>> {
    None
}
