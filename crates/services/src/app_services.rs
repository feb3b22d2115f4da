use std::sync::Arc;

use lesson_core::speech::{SpeechEngine, SpeechQueueController};
use storage::repository::Storage;

use crate::Clock;
use crate::config::RunnerConfig;
use crate::content::{LessonContentProvider, StaticContentProvider};
use crate::error::AppServicesError;
use crate::gate::DayGate;
use crate::progress_store::ProgressStore;
use crate::runner::LessonRunner;
use crate::seed::seed_days;

/// Assembles the storage, content and gate a `LessonRunner` needs.
#[derive(Clone)]
pub struct AppServices {
    config: RunnerConfig,
    storage: Storage,
    content: Arc<dyn LessonContentProvider>,
    gate: DayGate,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or content loading fails.
    pub async fn new_sqlite(config: RunnerConfig, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(&config.db_url).await?;
        Self::with_storage(config, storage, clock)
    }

    /// Build services over in-memory storage; nothing outlives the process.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if content loading fails.
    pub fn in_memory(config: RunnerConfig, clock: Clock) -> Result<Self, AppServicesError> {
        Self::with_storage(config, Storage::in_memory(), clock)
    }

    fn with_storage(
        config: RunnerConfig,
        storage: Storage,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let content = match &config.content_path {
            Some(path) => {
                tracing::info!(path = %path.display(), "loading lesson content");
                StaticContentProvider::from_json_file(path)?
            }
            None => StaticContentProvider::new(seed_days())?,
        };

        Ok(Self {
            config,
            storage,
            content: Arc::new(content),
            gate: DayGate::new(clock),
        })
    }

    #[must_use]
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    #[must_use]
    pub fn content(&self) -> Arc<dyn LessonContentProvider> {
        Arc::clone(&self.content)
    }

    pub async fn progress_store(&self) -> ProgressStore {
        ProgressStore::open(Arc::clone(&self.storage.kv), self.config.progress_key.clone()).await
    }

    /// Open a runner that narrates through `engine`.
    pub async fn runner<E: SpeechEngine>(&self, engine: E) -> LessonRunner<E> {
        let speech = SpeechQueueController::new(engine, self.config.target_language.clone())
            .with_settings(self.config.speech_settings());
        LessonRunner::open(
            self.progress_store().await,
            self.content(),
            self.gate,
            speech,
        )
    }
}

impl std::fmt::Debug for AppServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppServices")
            .field("config", &self.config)
            .field("days", &self.content.day_count())
            .finish_non_exhaustive()
    }
}
