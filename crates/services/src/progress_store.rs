use std::sync::Arc;

use lesson_core::model::{DayNumber, Mode, Progress};
use storage::repository::KeyValueStore;
use tracing::{debug, error, info, warn};

/// Key under which progress is persisted when none is configured.
pub const DEFAULT_PROGRESS_KEY: &str = "lesson.progress.v1";

/// Single-learner progress persisted as one JSON value.
///
/// Every mutation builds a complete new `Progress` snapshot and writes it in
/// one `put`. Storage failures never escape: a failed read yields the default
/// progress and a failed write is reported as `persisted == false`.
pub struct ProgressStore {
    kv: Arc<dyn KeyValueStore>,
    key: String,
    current: Progress,
}

/// Outcome of a progress mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub progress: Progress,
    pub persisted: bool,
}

impl ProgressStore {
    /// Load persisted progress (or defaults) and keep it as the live snapshot.
    pub async fn open(kv: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let mut store = Self {
            kv,
            key: key.into(),
            current: Progress::default(),
        };
        store.current = store.load().await;
        store
    }

    /// Read persisted progress; absent or corrupt payloads yield the default.
    pub async fn load(&self) -> Progress {
        let raw = match self.kv.get(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %self.key, "no persisted progress; starting at day 1");
                return Progress::default();
            }
            Err(err) => {
                warn!(key = %self.key, error = %err, "progress read failed; using defaults");
                return Progress::default();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|err| {
            warn!(key = %self.key, error = %err, "corrupt persisted progress; using defaults");
            Progress::default()
        })
    }

    /// Make `progress` the live snapshot and overwrite the persisted value.
    pub async fn save(&mut self, progress: Progress) -> ProgressUpdate {
        self.current = progress;
        let persisted = match serde_json::to_string(&progress) {
            Ok(json) => match self.kv.put(&self.key, &json).await {
                Ok(()) => true,
                Err(err) => {
                    error!(key = %self.key, error = %err, "failed to persist progress");
                    false
                }
            },
            Err(err) => {
                error!(key = %self.key, error = %err, "failed to serialize progress");
                false
            }
        };
        ProgressUpdate {
            progress,
            persisted,
        }
    }

    #[must_use]
    pub fn progress(&self) -> Progress {
        self.current
    }

    #[must_use]
    pub fn active_day(&self) -> DayNumber {
        self.current.active_day()
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    pub async fn set_mode(&mut self, mode: Mode) -> ProgressUpdate {
        self.save(self.current.with_mode(mode)).await
    }

    /// Navigate to `day`. Days below 1 or beyond the unlock bound are
    /// rejected with `None` and nothing is written.
    pub async fn go_to_day(&mut self, day: u32) -> Option<ProgressUpdate> {
        let Some(next) = self.current.navigated_to(day) else {
            debug!(day, max = %self.current.max_unlocked_day(), "rejected navigation to locked day");
            return None;
        };
        Some(self.save(next).await)
    }

    /// Unlock and open the day after `day` in a single write.
    pub async fn advance_past(&mut self, day: DayNumber) -> ProgressUpdate {
        let next = self.current.advanced_past(day);
        info!(
            passed = %day,
            max_unlocked = %next.max_unlocked_day(),
            "day passed; next day unlocked"
        );
        self.save(next).await
    }

    /// Clear persisted progress and return to day 1.
    pub async fn reset(&mut self) -> ProgressUpdate {
        self.current = Progress::default();
        let persisted = match self.kv.remove(&self.key).await {
            Ok(()) => true,
            Err(err) => {
                error!(key = %self.key, error = %err, "failed to clear progress");
                false
            }
        };
        info!(key = %self.key, "progress reset");
        ProgressUpdate {
            progress: self.current,
            persisted,
        }
    }
}

impl std::fmt::Debug for ProgressStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressStore")
            .field("key", &self.key)
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}
