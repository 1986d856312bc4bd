pub mod app;
mod config;
pub mod driver;
pub mod error;
pub mod host;
pub mod logging;
pub mod notification;
pub mod os;
pub mod resolver;
pub mod settings;
pub mod window;
pub use config::{load_host_config, HostConfig, DEFAULT_DARK_SCHEME, DEFAULT_LIGHT_SCHEME};
pub use error::{AppError, AppResult};

/// Entrypoint used by higher-level integrations and CLI bindings.
pub fn run() -> AppResult<()> {
    logging::init();
    tracing::info!("starting themeswitch");

    let app = app::App::load_or_defaults();
    app.run()
}
