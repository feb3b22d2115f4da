#![forbid(unsafe_code)]

pub mod app_services;
pub mod config;
pub mod content;
pub mod error;
pub mod gate;
pub mod progress_store;
pub mod runner;
pub mod seed;
pub mod telemetry;

pub use lesson_core::Clock;

pub use app_services::AppServices;
pub use config::RunnerConfig;
pub use content::{LessonContentProvider, StaticContentProvider};
pub use error::{AppServicesError, ConfigError, ContentError};
pub use gate::{DayGate, DayVerdict};
pub use progress_store::{DEFAULT_PROGRESS_KEY, ProgressStore, ProgressUpdate};
pub use runner::LessonRunner;
