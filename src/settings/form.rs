use std::fmt;

use chrono::format::ParseErrorKind;
use chrono::{NaiveTime, Timelike};
use thiserror::Error;

use super::SharedSettings;
use crate::host::ThemeHost;

const TIME_FORMAT: &str = "%H:%M";

pub type FormResult<T> = std::result::Result<T, FormError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeField {
    Start,
    End,
}

impl fmt::Display for TimeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => f.write_str("start"),
            Self::End => f.write_str("end"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("invalid {field} time {text:?}: {reason} (expected HH:mm)")]
    InvalidTime {
        field: TimeField,
        text: String,
        reason: &'static str,
    },
    #[error("following the OS dark mode is not supported on this system")]
    FollowOsUnavailable,
}

/// Parses a strict `HH:mm` value: two digits, a colon, two digits.
pub fn parse_time_field(field: TimeField, text: &str) -> FormResult<NaiveTime> {
    let invalid = |reason| FormError::InvalidTime {
        field,
        text: text.to_string(),
        reason,
    };

    let bytes = text.as_bytes();
    let well_formed = bytes.len() == 5
        && bytes[2] == b':'
        && [0, 1, 3, 4].iter().all(|&i| bytes[i].is_ascii_digit());
    if !well_formed {
        return Err(invalid("malformed time"));
    }

    NaiveTime::parse_from_str(text, TIME_FORMAT).map_err(|err| match err.kind() {
        ParseErrorKind::OutOfRange => invalid("out of range"),
        _ => invalid("malformed time"),
    })
}

/// Editable state of the settings panel, bound to the shared settings.
#[derive(Debug)]
pub struct SettingsForm {
    settings: SharedSettings,
    scheme_names: Vec<String>,
    follow_os_available: bool,
    light_scheme: String,
    dark_scheme: String,
    start_text: String,
    end_text: String,
    follow_os: bool,
    modified: bool,
}

impl SettingsForm {
    pub fn open(settings: SharedSettings, host: &dyn ThemeHost, follow_os_available: bool) -> Self {
        let mut form = Self {
            settings,
            scheme_names: host.scheme_names(),
            follow_os_available,
            light_scheme: String::new(),
            dark_scheme: String::new(),
            start_text: String::new(),
            end_text: String::new(),
            follow_os: false,
            modified: false,
        };
        form.reset();
        form
    }

    pub fn reset(&mut self) {
        let current = self.settings.snapshot();
        self.light_scheme = current.light_scheme.clone();
        self.dark_scheme = current.dark_scheme.clone();
        self.start_text = current.start_time().format(TIME_FORMAT).to_string();
        self.end_text = current.end_time().format(TIME_FORMAT).to_string();
        self.follow_os = current.follow_os_dark_mode;
        self.modified = false;
    }

    pub fn scheme_names(&self) -> &[String] {
        &self.scheme_names
    }

    pub fn follow_os_enabled(&self) -> bool {
        self.follow_os_available
    }

    pub fn time_fields_enabled(&self) -> bool {
        !self.follow_os
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn light_scheme(&self) -> &str {
        &self.light_scheme
    }

    pub fn dark_scheme(&self) -> &str {
        &self.dark_scheme
    }

    pub fn start_text(&self) -> &str {
        &self.start_text
    }

    pub fn end_text(&self) -> &str {
        &self.end_text
    }

    pub fn follow_os(&self) -> bool {
        self.follow_os
    }

    pub fn set_light_scheme(&mut self, name: impl Into<String>) {
        self.light_scheme = name.into();
        self.modified = true;
    }

    pub fn set_dark_scheme(&mut self, name: impl Into<String>) {
        self.dark_scheme = name.into();
        self.modified = true;
    }

    pub fn set_start_text(&mut self, text: impl Into<String>) {
        self.start_text = text.into();
        self.modified = true;
    }

    pub fn set_end_text(&mut self, text: impl Into<String>) {
        self.end_text = text.into();
        self.modified = true;
    }

    pub fn set_follow_os(&mut self, follow: bool) -> FormResult<()> {
        if follow && !self.follow_os_available {
            return Err(FormError::FollowOsUnavailable);
        }
        self.follow_os = follow;
        self.modified = true;
        Ok(())
    }

    /// Validates both time fields and writes the form into the settings.
    /// Nothing is written when validation fails.
    pub fn apply(&mut self) -> FormResult<()> {
        let start = parse_time_field(TimeField::Start, &self.start_text)?;
        let end = parse_time_field(TimeField::End, &self.end_text)?;

        self.settings.update(|settings| {
            settings.light_scheme = self.light_scheme.clone();
            settings.dark_scheme = self.dark_scheme.clone();
            settings.follow_os_dark_mode = self.follow_os;
            settings.start_hour = i64::from(start.hour());
            settings.start_minute = i64::from(start.minute());
            settings.end_hour = i64::from(end.hour());
            settings.end_minute = i64::from(end.minute());
        });
        self.modified = false;
        tracing::info!(
            start = %self.start_text,
            end = %self.end_text,
            light = %self.light_scheme,
            dark = %self.dark_scheme,
            follow_os = self.follow_os,
            "settings applied"
        );
        Ok(())
    }
}
