use crate::autosave::AutosaveError;
use crate::background::BackgroundError;
use crate::config::ConfigError;
use crate::export::ExportError;
use crate::storage::StorageError;
use thiserror::Error;

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Autosave(#[from] AutosaveError),
    #[error(transparent)]
    Background(#[from] BackgroundError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
