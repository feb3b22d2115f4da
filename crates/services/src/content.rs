use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use lesson_core::model::{DayNumber, DayPlan};

use crate::error::ContentError;

/// Day-indexed lesson content.
pub trait LessonContentProvider: Send + Sync {
    fn day_plan(&self, day: DayNumber) -> Option<Arc<DayPlan>>;

    /// Number of authored days.
    fn day_count(&self) -> usize;
}

/// Immutable in-memory content, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct StaticContentProvider {
    days: BTreeMap<DayNumber, Arc<DayPlan>>,
}

impl StaticContentProvider {
    /// Build a provider from validated plans.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::DuplicateDay` if two plans share a day number,
    /// or `ContentError::Invalid` if a plan fails validation.
    pub fn new(plans: Vec<DayPlan>) -> Result<Self, ContentError> {
        let mut days = BTreeMap::new();
        for plan in plans {
            plan.validate()?;
            let day = plan.day;
            if days.insert(day, Arc::new(plan)).is_some() {
                return Err(ContentError::DuplicateDay(day));
            }
        }
        tracing::debug!(days = days.len(), "lesson content loaded");
        Ok(Self { days })
    }

    /// Parse a JSON array of day plans.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` if the JSON is malformed or the plans are invalid.
    pub fn from_json_str(json: &str) -> Result<Self, ContentError> {
        let plans: Vec<DayPlan> = serde_json::from_str(json)?;
        Self::new(plans)
    }

    /// # Errors
    ///
    /// Returns `ContentError` if the file cannot be read or parsed.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ContentError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

impl LessonContentProvider for StaticContentProvider {
    fn day_plan(&self, day: DayNumber) -> Option<Arc<DayPlan>> {
        self.days.get(&day).cloned()
    }

    fn day_count(&self) -> usize {
        self.days.len()
    }
}
