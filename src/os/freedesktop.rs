use std::process::Command;

use super::OsAppearance;

const SCHEMA: &str = "org.gnome.desktop.interface";
const COLOR_SCHEME_KEY: &str = "color-scheme";

/// Reads the freedesktop color-scheme preference through `gsettings`.
#[derive(Debug, Clone, Copy)]
pub(super) struct GsettingsAppearance;

impl GsettingsAppearance {
    pub(super) fn probe() -> Option<Self> {
        match query() {
            Some(_) => Some(Self),
            None => {
                tracing::debug!("gsettings color-scheme not readable");
                None
            }
        }
    }
}

impl OsAppearance for GsettingsAppearance {
    fn is_dark_mode_enabled(&self) -> bool {
        query().is_some_and(|scheme| is_dark_scheme(&scheme))
    }
}

fn query() -> Option<String> {
    let output = Command::new("gsettings")
        .args(["get", SCHEMA, COLOR_SCHEME_KEY])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout).ok()
}

fn is_dark_scheme(output: &str) -> bool {
    output.trim().trim_matches('\'') == "prefer-dark"
}
