//! Periodic evaluation and two-pass application of the theme decision.

use std::io;
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{Local, NaiveTime};

use crate::host::{Appearance, HostError, HostResult, ThemeHost, UiDispatcher};
use crate::notification;
use crate::os::OsAppearance;
use crate::resolver::{resolve, Decision};
use crate::settings::{SettingsFile, SharedSettings};

mod scheduler;

pub use scheduler::{RepeatingTask, ScheduleHandle, Scheduler, ThreadScheduler};

pub const UPDATE_INTERVAL: Duration = Duration::from_millis(5_000);

pub struct ThemeSwitcher {
    settings: SharedSettings,
    host: Arc<dyn ThemeHost>,
    ui: Arc<dyn UiDispatcher>,
    os: Option<Arc<dyn OsAppearance>>,
    settings_file: Option<SettingsFile>,
    notify_errors: bool,
}

impl ThemeSwitcher {
    pub fn new(
        settings: SharedSettings,
        host: Arc<dyn ThemeHost>,
        ui: Arc<dyn UiDispatcher>,
        os: Option<Arc<dyn OsAppearance>>,
    ) -> Self {
        Self {
            settings,
            host,
            ui,
            os,
            settings_file: None,
            notify_errors: false,
        }
    }

    /// Picks up edits saved to `file` by other processes before each tick.
    pub fn with_settings_file(mut self, file: SettingsFile) -> Self {
        self.settings_file = Some(file);
        self
    }

    /// Surface configuration errors as desktop notifications too.
    pub fn with_notifications(mut self, enabled: bool) -> Self {
        self.notify_errors = enabled;
        self
    }

    pub fn decide_at(&self, now: NaiveTime) -> Decision {
        resolve(&self.settings.snapshot(), now, self.os.as_deref())
    }

    pub fn tick(&self) -> Decision {
        self.tick_at(Local::now().time())
    }

    /// Resolves against `now` and posts the application to the ui thread.
    pub fn tick_at(&self, now: NaiveTime) -> Decision {
        if let Some(file) = &self.settings_file {
            if let Err(err) = file.refresh(&self.settings) {
                tracing::warn!(%err, path = ?file.path(), "failed to reload settings; keeping current values");
            }
        }

        let decision = self.decide_at(now);
        tracing::debug!(
            use_dark = decision.use_dark,
            scheme = decision.color_scheme(),
            source = ?decision.source,
            "tick"
        );

        let host = Arc::clone(&self.host);
        let ui = Arc::downgrade(&self.ui);
        let notify_errors = self.notify_errors;
        let posted = decision.clone();
        self.ui.run_on_ui_thread(Box::new(move || {
            apply_on_ui_thread(host, ui, &posted, notify_errors);
        }));
        decision
    }

    pub fn start(self: Arc<Self>, scheduler: &dyn Scheduler) -> io::Result<ScheduleHandle> {
        self.start_with(scheduler, UPDATE_INTERVAL, UPDATE_INTERVAL)
    }

    pub fn start_with(
        self: Arc<Self>,
        scheduler: &dyn Scheduler,
        initial_delay: Duration,
        period: Duration,
    ) -> io::Result<ScheduleHandle> {
        tracing::info!(period_ms = period.as_millis() as u64, "theme switcher started");
        scheduler.schedule_repeating(
            Box::new(move || {
                self.tick();
            }),
            initial_delay,
            period,
        )
    }
}

fn apply_on_ui_thread(
    host: Arc<dyn ThemeHost>,
    ui: Weak<dyn UiDispatcher>,
    decision: &Decision,
    notify_errors: bool,
) {
    if let Err(err) = apply_profile(host.as_ref(), decision) {
        report_host_error(&err, notify_errors);
        return;
    }

    // Some surfaces only restyle on a later redraw pass.
    let appearance = decision.appearance;
    if let Some(ui) = ui.upgrade() {
        ui.run_on_ui_thread(Box::new(move || {
            if let Err(err) = host.apply_look_and_feel(appearance) {
                report_host_error(&err, notify_errors);
            }
        }));
    }
}

fn apply_profile(host: &dyn ThemeHost, decision: &Decision) -> HostResult<()> {
    host.apply_look_and_feel(decision.appearance)?;
    host.set_color_scheme(decision.color_scheme())?;
    Ok(())
}

fn report_host_error(err: &HostError, notify_errors: bool) {
    tracing::error!(%err, "failed to apply theme");
    if notify_errors {
        notification::send(format!("Theme switch failed: {err}"));
    }
}

/// Applies a decision synchronously on the calling thread, outside the
/// periodic cadence. Only for hosts without ui-thread affinity.
pub fn apply_now(host: &dyn ThemeHost, decision: &Decision) -> HostResult<Appearance> {
    apply_profile(host, decision)?;
    Ok(decision.appearance)
}
