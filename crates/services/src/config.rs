//! Runner configuration from environment variables or a TOML file.
//!
//! Environment variables:
//! - `LESSON_DB_URL`: `SQLite` location (default `sqlite://lessons.sqlite3`)
//! - `LESSON_PROGRESS_KEY`: key holding persisted progress
//! - `LESSON_LANG`: fallback narration language (default `de`)
//! - `LESSON_SPEECH_RATE`, `LESSON_SPEECH_PITCH`: clamped to [0.6, 1.4]
//! - `LESSON_CONTENT_PATH`: JSON file of day plans; built-in lessons otherwise

use std::path::{Path, PathBuf};

use lesson_core::model::{SpeechSettings, SpeechSettingsDraft};
use serde::Deserialize;

use crate::error::ConfigError;
use crate::progress_store::DEFAULT_PROGRESS_KEY;

pub const DEFAULT_DB_URL: &str = "sqlite://lessons.sqlite3";
pub const DEFAULT_LANGUAGE: &str = "de";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub db_url: String,
    pub progress_key: String,
    pub target_language: String,
    pub speech_rate: f32,
    pub speech_pitch: f32,
    pub voice_name: Option<String>,
    pub content_path: Option<PathBuf>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            db_url: DEFAULT_DB_URL.into(),
            progress_key: DEFAULT_PROGRESS_KEY.into(),
            target_language: DEFAULT_LANGUAGE.into(),
            speech_rate: 1.0,
            speech_pitch: 1.0,
            voice_name: None,
            content_path: None,
        }
    }
}

impl RunnerConfig {
    /// Read the process environment; unset or unparsable values keep defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like `from_env`, reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_blank = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let number = |name: &str, fallback: f32| {
            non_blank(name)
                .and_then(|value| value.trim().parse::<f32>().ok())
                .unwrap_or(fallback)
        };

        Self {
            db_url: non_blank("LESSON_DB_URL")
                .map_or(defaults.db_url, normalize_sqlite_url),
            progress_key: non_blank("LESSON_PROGRESS_KEY").unwrap_or(defaults.progress_key),
            target_language: non_blank("LESSON_LANG").unwrap_or(defaults.target_language),
            speech_rate: number("LESSON_SPEECH_RATE", defaults.speech_rate),
            speech_pitch: number("LESSON_SPEECH_PITCH", defaults.speech_pitch),
            voice_name: non_blank("LESSON_VOICE"),
            content_path: non_blank("LESSON_CONTENT_PATH").map(PathBuf::from),
        }
    }

    /// Parse a TOML document; missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Toml` if the document is malformed.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(raw)?;
        config.db_url = normalize_sqlite_url(config.db_url);
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read or parsed.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Validated speech settings built from the configured values.
    #[must_use]
    pub fn speech_settings(&self) -> SpeechSettings {
        SpeechSettingsDraft {
            voice_name: self.voice_name.clone(),
            rate: Some(self.speech_rate),
            pitch: Some(self.speech_pitch),
        }
        .normalize()
    }
}

/// Turn a bare or relative path into an absolute `sqlite://` URL.
#[must_use]
pub fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim();
    let path = Path::new(trimmed.strip_prefix("sqlite:").unwrap_or(trimmed));
    if path.as_os_str().to_string_lossy().starts_with("file:") {
        return format!("sqlite:{}", path.display());
    }
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}
