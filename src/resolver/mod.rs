use chrono::NaiveTime;
use serde::Serialize;

use crate::host::Appearance;
use crate::os::OsAppearance;
use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    TimeWindow,
    OperatingSystem,
}

/// Outcome of one evaluation: which look-and-feel and scheme to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub use_dark: bool,
    pub appearance: Appearance,
    pub light_scheme: String,
    pub dark_scheme: String,
    pub source: DecisionSource,
}

impl Decision {
    pub fn color_scheme(&self) -> &str {
        match self.appearance {
            Appearance::Light => &self.light_scheme,
            Appearance::Dark => &self.dark_scheme,
        }
    }
}

/// The OS preference wins only when following is enabled and the
/// capability exists; otherwise the dark window decides.
pub fn resolve(settings: &Settings, now: NaiveTime, os: Option<&dyn OsAppearance>) -> Decision {
    let (use_dark, source) = match os {
        Some(os) if settings.follow_os_dark_mode => {
            (os.is_dark_mode_enabled(), DecisionSource::OperatingSystem)
        }
        _ => (
            settings.dark_window().contains(now),
            DecisionSource::TimeWindow,
        ),
    };

    Decision {
        use_dark,
        appearance: Appearance::from_dark(use_dark),
        light_scheme: settings.light_scheme.clone(),
        dark_scheme: settings.dark_scheme.clone(),
        source,
    }
}
