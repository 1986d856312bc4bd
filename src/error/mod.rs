use std::io;

use crate::host::HostError;
use crate::settings::{FormError, SettingsError};
use thiserror::Error;

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Host(#[from] HostError),
    #[error("failed to start worker thread")]
    Thread(#[source] io::Error),
}
