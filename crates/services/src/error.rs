//! Shared error types for the services crate.

use thiserror::Error;

use lesson_core::model::{DayNumber, DayPlanError};
use storage::sqlite::SqliteInitError;

/// Errors emitted while loading lesson content.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContentError {
    #[error("failed to read lesson content: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed lesson content: {0}")]
    Json(#[from] serde_json::Error),
    #[error("day {0} is defined more than once")]
    DuplicateDay(DayNumber),
    #[error(transparent)]
    Invalid(#[from] DayPlanError),
}

/// Errors emitted while reading runner configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Content(#[from] ContentError),
}
