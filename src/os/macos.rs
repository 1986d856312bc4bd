use std::process::Command;

use super::OsAppearance;

/// Reads `AppleInterfaceStyle` from the global defaults domain. The key is
/// absent (and `defaults` exits non-zero) while the light appearance is on.
#[derive(Debug, Clone, Copy)]
pub(super) struct DefaultsAppearance;

impl DefaultsAppearance {
    pub(super) fn probe() -> Option<Self> {
        match Command::new("defaults").arg("help").output() {
            Ok(_) => Some(Self),
            Err(err) => {
                tracing::debug!(?err, "defaults tool not available");
                None
            }
        }
    }
}

impl OsAppearance for DefaultsAppearance {
    fn is_dark_mode_enabled(&self) -> bool {
        let Ok(output) = Command::new("defaults")
            .args(["read", "-g", "AppleInterfaceStyle"])
            .output()
        else {
            return false;
        };
        output.status.success() && is_dark_style(&String::from_utf8_lossy(&output.stdout))
    }
}

fn is_dark_style(output: &str) -> bool {
    output.trim().eq_ignore_ascii_case("dark")
}
