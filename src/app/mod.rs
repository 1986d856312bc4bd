use std::sync::Arc;

use chrono::Local;

use crate::config::{applied_state_path, load_host_config, HostConfig};
use crate::driver::{ScheduleHandle, ThemeSwitcher, ThreadScheduler};
use crate::error::{AppError, AppResult};
use crate::host::{AppliedState, HookHost, ThemeHost, UiDispatcher, UiThread};
use crate::os::{self, OsAppearance};
use crate::resolver::Decision;
use crate::settings::{
    load_settings, save_settings, Settings, SettingsFile, SettingsForm, SharedSettings,
};

/// Process-wide wiring: one settings instance shared by the driver and the
/// settings form, the host, and the optional OS capability.
pub struct App {
    settings: SharedSettings,
    host: Arc<HookHost>,
    os: Option<Arc<dyn OsAppearance>>,
}

impl App {
    pub fn new(
        host_config: HostConfig,
        settings: Settings,
        os: Option<Arc<dyn OsAppearance>>,
    ) -> Self {
        Self::with_host(HookHost::new(host_config), settings, os)
    }

    fn with_host(host: HookHost, settings: Settings, os: Option<Arc<dyn OsAppearance>>) -> Self {
        Self {
            settings: SharedSettings::new(settings),
            host: Arc::new(host),
            os,
        }
    }

    /// Loads host config and persisted settings; malformed settings fail.
    pub fn load() -> AppResult<Self> {
        let host = load_host();
        let settings = load_settings(default_settings(&host))?;
        Ok(Self::with_host(host, settings, os::capability()))
    }

    /// Like [`App::load`], but keeps defaults when the settings file is bad.
    pub fn load_or_defaults() -> Self {
        let host = load_host();
        let defaults = default_settings(&host);
        let settings = load_settings(defaults.clone()).unwrap_or_else(|err| {
            tracing::warn!(%err, "failed to load settings; using defaults");
            defaults
        });
        Self::with_host(host, settings, os::capability())
    }

    pub fn settings(&self) -> &SharedSettings {
        &self.settings
    }

    pub fn host(&self) -> &HookHost {
        &self.host
    }

    /// Look-and-feel and scheme last applied by any themeswitch process.
    pub fn applied_state(&self) -> AppliedState {
        self.host.applied()
    }

    pub fn follow_os_available(&self) -> bool {
        self.os.is_some()
    }

    pub fn decision_now(&self) -> Decision {
        crate::resolver::resolve(
            &self.settings.snapshot(),
            Local::now().time(),
            self.os.as_deref(),
        )
    }

    pub fn settings_form(&self) -> SettingsForm {
        SettingsForm::open(
            self.settings.clone(),
            self.host.as_ref(),
            self.follow_os_available(),
        )
    }

    pub fn save(&self) -> AppResult<()> {
        save_settings(&self.settings.snapshot())?;
        Ok(())
    }

    /// Starts the ui thread and the periodic driver. Settings saved by other
    /// processes are picked up on the following tick.
    pub fn start(&self) -> AppResult<(Arc<UiThread>, ScheduleHandle)> {
        let ui = Arc::new(UiThread::spawn().map_err(AppError::Thread)?);
        let mut switcher = ThemeSwitcher::new(
            self.settings.clone(),
            Arc::clone(&self.host) as Arc<dyn ThemeHost>,
            Arc::clone(&ui) as Arc<dyn UiDispatcher>,
            self.os.clone(),
        )
        .with_notifications(true);
        match SettingsFile::locate() {
            Ok(file) => switcher = switcher.with_settings_file(file),
            Err(err) => tracing::warn!(%err, "settings file not watched"),
        }
        let handle = Arc::new(switcher)
            .start(&ThreadScheduler)
            .map_err(AppError::Thread)?;
        Ok((ui, handle))
    }

    /// Runs for the rest of the process.
    pub fn run(self) -> AppResult<()> {
        let (_ui, handle) = self.start()?;
        tracing::info!("startup complete");
        handle.join();
        Ok(())
    }
}

fn load_host() -> HookHost {
    let host = HookHost::new(load_host_config());
    match applied_state_path() {
        Ok(path) => host.with_state_file(path),
        Err(_) => {
            tracing::warn!("no config directory; applied theme is not recorded");
            host
        }
    }
}

fn default_settings(host: &dyn ThemeHost) -> Settings {
    Settings::with_schemes(host.default_light_scheme(), host.default_dark_scheme())
}
